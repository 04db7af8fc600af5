// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Simulated clock registers for host tests.
//!
//! The model follows the silicon closely enough to exercise the engine:
//!
//! + a source is ready when it is enabled and not broken; the SPLL additionally needs a ready
//! reference and a VCO inside its operating range
//! + the system clock mux follows a write to the bank of the current power mode only if the
//! requested source is ready
//! + bank writes are dropped while CKGEN is locked
//!
//! Every write is appended to an event log so tests can assert on ordering. Any moment where the
//! live source is not enabled and ready is counted as a glitch.

use std::cell::{Cell, RefCell};
use std::vec::Vec;

use crate::chip_specific::clock_constants::{spll, HSI_FREQUENCY_HZ};
use crate::ckgen::{
    AsyncDivider, AsyncTap, ClockOutDivider, ClockOutSource, ClockSource, HseMode,
    PeripheralClock, PeripheralClockSource, PeripheralDivider, PeripheralModule, RtcClockSource,
    SpllParameters, SpllPrediv, SpllReference, SysClockBank, SysClockDivider, SystemClockConfig,
    PERIPHERAL_CLOCK_COUNT,
};
use crate::clocks::hardware::ClockHardware;
use crate::rcm::{ClockLossEvents, ClockMonitor, MonitorPolicy};
use crate::spm::PowerMode;

/// Register writes observed by the simulation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    CkgenUnlock,
    CkgenLock,
    FlashUnlock,
    FlashLock,
    FlashClock(u32),
    SysClock(SysClockBank, SystemClockConfig),
    /// Bank write dropped because CKGEN was locked
    SysClockRejected(SysClockBank),
    SourceEnable(ClockSource, bool),
    SpllParameters(SpllParameters),
    Monitor(ClockMonitor, MonitorPolicy),
}

const RESET_SYSTEM_CLOCK: SystemClockConfig = SystemClockConfig {
    source: ClockSource::HSI,
    core_divider: SysClockDivider::DivideBy1,
    bus_divider: SysClockDivider::DivideBy1,
};

fn source_index(source: ClockSource) -> usize {
    source as usize
}

fn bank_index(bank: SysClockBank) -> usize {
    match bank {
        SysClockBank::RUN => 0,
        SysClockBank::VLPR => 1,
    }
}

fn monitor_index(monitor: ClockMonitor) -> usize {
    match monitor {
        ClockMonitor::HSE => 0,
        ClockMonitor::SPLL => 1,
    }
}

pub struct SimulatedHardware {
    power_mode: Cell<Option<PowerMode>>,
    enabled: [Cell<bool>; 4],
    broken: [Cell<bool>; 4],
    dividers: [[Cell<AsyncDivider>; 2]; 4],
    /// Frequency of the signal on EXTAL, used to decide whether the SPLL can lock
    hse_input_hz: Cell<u32>,
    hse_mode: Cell<HseMode>,
    spll: Cell<SpllParameters>,
    monitors: [Cell<MonitorPolicy>; 2],
    loss_events: Cell<ClockLossEvents>,
    ckgen_locked: Cell<bool>,
    flash_locked: Cell<bool>,
    flash_mhz: Cell<u32>,
    banks: [Cell<SystemClockConfig>; 2],
    live: Cell<ClockSource>,
    stuck_mux: Cell<bool>,
    rtc_source: Cell<RtcClockSource>,
    clock_out: Cell<(ClockOutSource, ClockOutDivider)>,
    gates: [Cell<u32>; 3],
    resets: [Cell<u32>; 3],
    peripherals: [Cell<(PeripheralClockSource, PeripheralDivider)>; PERIPHERAL_CLOCK_COUNT],
    events: RefCell<Vec<Event>>,
    glitches: Cell<usize>,
}

impl SimulatedHardware {
    /// Reset state: RUN mode on HSI, VHSI running, HSE and SPLL off, all taps off
    pub fn new() -> Self {
        let hardware = Self {
            power_mode: Cell::new(Some(PowerMode::RUN)),
            enabled: core::array::from_fn(|_| Cell::new(false)),
            broken: core::array::from_fn(|_| Cell::new(false)),
            dividers: core::array::from_fn(|_| {
                core::array::from_fn(|_| Cell::new(AsyncDivider::Off))
            }),
            hse_input_hz: Cell::new(8_000_000),
            hse_mode: Cell::new(HseMode::Crystal),
            spll: Cell::new(SpllParameters {
                reference: SpllReference::HSI,
                prediv: SpllPrediv::DivideBy1,
                fbkdiv: 64,
                posdiv: 4,
            }),
            monitors: core::array::from_fn(|_| Cell::new(MonitorPolicy::Disabled)),
            loss_events: Cell::new(ClockLossEvents::default()),
            ckgen_locked: Cell::new(true),
            flash_locked: Cell::new(true),
            flash_mhz: Cell::new(8),
            banks: core::array::from_fn(|_| Cell::new(RESET_SYSTEM_CLOCK)),
            live: Cell::new(ClockSource::HSI),
            stuck_mux: Cell::new(false),
            rtc_source: Cell::new(RtcClockSource::LSI),
            clock_out: Cell::new((ClockOutSource::Off, ClockOutDivider::DivideBy1)),
            gates: core::array::from_fn(|_| Cell::new(0)),
            // Every module starts held in reset
            resets: core::array::from_fn(|_| Cell::new(0)),
            peripherals: core::array::from_fn(|_| {
                Cell::new((PeripheralClockSource::Off, PeripheralDivider::DivideBy1))
            }),
            events: RefCell::new(Vec::new()),
            glitches: Cell::new(0),
        };
        hardware.enabled[source_index(ClockSource::HSI)].set(true);
        hardware.enabled[source_index(ClockSource::VHSI)].set(true);
        hardware
    }

    /* Test knobs */

    pub fn set_power_mode(&self, mode: Option<PowerMode>) {
        self.power_mode.set(mode);
    }

    /// A broken source never reports ready. Breaking the live source does not move the mux.
    pub fn set_broken(&self, source: ClockSource, broken: bool) {
        self.broken[source_index(source)].set(broken);
    }

    pub fn set_hse_input_hz(&self, frequency_hz: u32) {
        self.hse_input_hz.set(frequency_hz);
    }

    /// Keep the mux on its current source whatever is written
    pub fn set_stuck_mux(&self, stuck: bool) {
        self.stuck_mux.set(stuck);
    }

    /// Put the mux on `source` without going through the lock, as a bootloader would leave it
    pub fn force_live_source(&self, source: ClockSource) {
        let mut config = self.banks[0].get();
        config.source = source;
        self.banks[0].set(config);
        self.live.set(source);
    }

    /// Latch monitor events as the RCM would
    pub fn raise_clock_loss(&self, events: ClockLossEvents) {
        self.loss_events.set(events);
    }

    /* Inspection */

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn glitches(&self) -> usize {
        self.glitches.get()
    }

    pub fn is_ckgen_locked(&self) -> bool {
        self.ckgen_locked.get()
    }

    pub fn is_flash_locked(&self) -> bool {
        self.flash_locked.get()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn check_live_source(&self) {
        let live = self.live.get();
        if !self.enabled[source_index(live)].get() || !self.is_source_ready(live) {
            self.glitches.set(self.glitches.get() + 1);
        }
    }

    fn spll_can_lock(&self) -> bool {
        let parameters = self.spll.get();
        let reference_hz = match parameters.reference {
            SpllReference::HSI if self.is_source_ready(ClockSource::HSI) => HSI_FREQUENCY_HZ,
            SpllReference::HSE if self.is_source_ready(ClockSource::HSE) => {
                self.hse_input_hz.get()
            }
            _ => return false,
        };
        let vco_hz =
            reference_hz as u64 / u32::from(parameters.prediv) as u64 * parameters.fbkdiv as u64;
        vco_hz >= spll::VCO_MIN_HZ && vco_hz <= spll::VCO_MAX_HZ
    }
}

impl ClockHardware for SimulatedHardware {
    fn get_power_mode(&self) -> Option<PowerMode> {
        self.power_mode.get()
    }

    fn is_source_ready(&self, source: ClockSource) -> bool {
        let index = source_index(source);
        if !self.enabled[index].get() || self.broken[index].get() {
            return false;
        }
        source != ClockSource::SPLL || self.spll_can_lock()
    }

    fn is_source_enabled(&self, source: ClockSource) -> bool {
        self.enabled[source_index(source)].get()
    }

    fn set_source_enabled(&self, source: ClockSource, enable: bool) {
        self.record(Event::SourceEnable(source, enable));
        self.enabled[source_index(source)].set(enable);
        self.check_live_source();
    }

    fn set_async_dividers(&self, source: ClockSource, div1: AsyncDivider, div2: AsyncDivider) {
        let taps = &self.dividers[source_index(source)];
        taps[0].set(div1);
        taps[1].set(div2);
    }

    fn get_async_divider(&self, source: ClockSource, tap: AsyncTap) -> AsyncDivider {
        let taps = &self.dividers[source_index(source)];
        match tap {
            AsyncTap::Div1 => taps[0].get(),
            AsyncTap::Div2 => taps[1].get(),
        }
    }

    fn set_hse_mode(&self, mode: HseMode) {
        self.hse_mode.set(mode);
    }

    fn get_hse_mode(&self) -> HseMode {
        self.hse_mode.get()
    }

    fn set_spll_parameters(&self, parameters: &SpllParameters) {
        self.record(Event::SpllParameters(*parameters));
        self.spll.set(*parameters);
        self.check_live_source();
    }

    fn get_spll_parameters(&self) -> SpllParameters {
        self.spll.get()
    }

    fn set_monitor(&self, monitor: ClockMonitor, policy: MonitorPolicy) {
        self.record(Event::Monitor(monitor, policy));
        self.monitors[monitor_index(monitor)].set(policy);
    }

    fn get_monitor(&self, monitor: ClockMonitor) -> MonitorPolicy {
        self.monitors[monitor_index(monitor)].get()
    }

    fn take_clock_loss_events(&self) -> ClockLossEvents {
        self.loss_events.replace(ClockLossEvents::default())
    }

    fn unlock_ckgen(&self) {
        self.record(Event::CkgenUnlock);
        self.ckgen_locked.set(false);
    }

    fn lock_ckgen(&self) {
        self.record(Event::CkgenLock);
        self.ckgen_locked.set(true);
    }

    fn get_sys_clock_config(&self, bank: SysClockBank) -> SystemClockConfig {
        self.banks[bank_index(bank)].get()
    }

    fn set_sys_clock_config(&self, bank: SysClockBank, config: &SystemClockConfig) {
        if self.ckgen_locked.get() {
            self.record(Event::SysClockRejected(bank));
            return;
        }
        self.record(Event::SysClock(bank, *config));
        self.banks[bank_index(bank)].set(*config);

        let current_bank = self.power_mode.get().and_then(PowerMode::sys_clock_bank);
        if current_bank == Some(bank)
            && !self.stuck_mux.get()
            && self.is_source_ready(config.source)
        {
            self.live.set(config.source);
        }
        self.check_live_source();
    }

    fn get_sys_clock_source(&self) -> ClockSource {
        self.live.get()
    }

    fn unlock_flash(&self) {
        self.record(Event::FlashUnlock);
        self.flash_locked.set(false);
    }

    fn lock_flash(&self) {
        self.record(Event::FlashLock);
        self.flash_locked.set(true);
    }

    fn set_flash_clock_frequency_mhz(&self, frequency_mhz: u32) {
        if self.flash_locked.get() {
            return;
        }
        self.record(Event::FlashClock(frequency_mhz));
        self.flash_mhz.set(frequency_mhz);
    }

    fn get_flash_clock_frequency_mhz(&self) -> u32 {
        self.flash_mhz.get()
    }

    fn set_rtc_clock_source(&self, source: RtcClockSource) {
        self.rtc_source.set(source);
    }

    fn get_rtc_clock_source(&self) -> RtcClockSource {
        self.rtc_source.get()
    }

    fn set_clock_out(&self, source: ClockOutSource, divider: ClockOutDivider) {
        self.clock_out.set((source, divider));
    }

    fn get_clock_out(&self) -> (ClockOutSource, ClockOutDivider) {
        self.clock_out.get()
    }

    fn set_module_clock_gate(&self, module: PeripheralModule, enable: bool) {
        let register = &self.gates[module.register_index()];
        if enable {
            register.set(register.get() | module.bit());
        } else {
            register.set(register.get() & !module.bit());
        }
    }

    fn is_module_clock_enabled(&self, module: PeripheralModule) -> bool {
        self.gates[module.register_index()].get() & module.bit() != 0
    }

    fn set_module_in_reset(&self, module: PeripheralModule, in_reset: bool) {
        let register = &self.resets[module.register_index()];
        if in_reset {
            register.set(register.get() & !module.bit());
        } else {
            register.set(register.get() | module.bit());
        }
    }

    fn is_module_in_reset(&self, module: PeripheralModule) -> bool {
        self.resets[module.register_index()].get() & module.bit() == 0
    }

    fn set_peripheral_clock(
        &self,
        clock: PeripheralClock,
        source: PeripheralClockSource,
        divider: PeripheralDivider,
    ) {
        self.peripherals[clock.index()].set((source, divider));
    }

    fn get_peripheral_clock(
        &self,
        clock: PeripheralClock,
    ) -> (PeripheralClockSource, PeripheralDivider) {
        self.peripherals[clock.index()].get()
    }
}
