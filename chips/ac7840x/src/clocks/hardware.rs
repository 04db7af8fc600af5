// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Register-level access used by the clock engine.
//!
//! [ClockHardware] is the only way the engine touches silicon. [Ac7840xClockHardware] forwards
//! each call to the CKGEN, SPM, RCM and flash register blocks. Unit tests plug in a simulated
//! implementation instead.

use crate::ckgen::{
    AsyncDivider, AsyncTap, Ckgen, ClockOutDivider, ClockOutSource, ClockSource, HseMode,
    PeripheralClock, PeripheralClockSource, PeripheralDivider, PeripheralModule, RtcClockSource,
    SpllParameters, SpllReference, SysClockBank, SystemClockConfig,
};
use crate::flash::Flash;
use crate::rcm::{ClockLossEvents, ClockMonitor, MonitorPolicy, Rcm};
use crate::spm::{PowerMode, Spm};
use crate::ErrorCode;

/// Raw clock register operations.
///
/// Implementations perform exactly the requested access and nothing else. Ordering, validation
/// and polling are the job of [crate::clocks::Clocks].
pub trait ClockHardware {
    /* Power state */
    fn get_power_mode(&self) -> Option<PowerMode>;
    fn is_source_ready(&self, source: ClockSource) -> bool;

    /* Clock sources */
    fn is_source_enabled(&self, source: ClockSource) -> bool;
    fn set_source_enabled(&self, source: ClockSource, enable: bool);
    fn set_async_dividers(&self, source: ClockSource, div1: AsyncDivider, div2: AsyncDivider);
    fn get_async_divider(&self, source: ClockSource, tap: AsyncTap) -> AsyncDivider;
    fn set_hse_mode(&self, mode: HseMode);
    fn get_hse_mode(&self) -> HseMode;
    fn set_spll_parameters(&self, parameters: &SpllParameters);
    fn get_spll_parameters(&self) -> SpllParameters;

    /// Arm or disarm a clock monitor, including its reset/interrupt route
    fn set_monitor(&self, monitor: ClockMonitor, policy: MonitorPolicy);
    fn get_monitor(&self, monitor: ClockMonitor) -> MonitorPolicy;
    /// Read and acknowledge the latched monitor events
    fn take_clock_loss_events(&self) -> ClockLossEvents;

    /* System clock */
    fn unlock_ckgen(&self);
    fn lock_ckgen(&self);
    fn get_sys_clock_config(&self, bank: SysClockBank) -> SystemClockConfig;
    fn set_sys_clock_config(&self, bank: SysClockBank, config: &SystemClockConfig);
    /// Source currently feeding the core, as reported by the mux status
    fn get_sys_clock_source(&self) -> ClockSource;

    /* Flash */
    fn unlock_flash(&self);
    fn lock_flash(&self);
    fn set_flash_clock_frequency_mhz(&self, frequency_mhz: u32);
    fn get_flash_clock_frequency_mhz(&self) -> u32;

    /* SIM level clocks */
    fn set_rtc_clock_source(&self, source: RtcClockSource);
    fn get_rtc_clock_source(&self) -> RtcClockSource;
    fn set_clock_out(&self, source: ClockOutSource, divider: ClockOutDivider);
    fn get_clock_out(&self) -> (ClockOutSource, ClockOutDivider);

    /* Peripherals */
    fn set_module_clock_gate(&self, module: PeripheralModule, enable: bool);
    fn is_module_clock_enabled(&self, module: PeripheralModule) -> bool;
    fn set_module_in_reset(&self, module: PeripheralModule, in_reset: bool);
    fn is_module_in_reset(&self, module: PeripheralModule) -> bool;
    fn set_peripheral_clock(
        &self,
        clock: PeripheralClock,
        source: PeripheralClockSource,
        divider: PeripheralDivider,
    );
    fn get_peripheral_clock(
        &self,
        clock: PeripheralClock,
    ) -> (PeripheralClockSource, PeripheralDivider);

    /// Spin until `source` reports ready, at most `timeout` iterations.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::TIMEOUT]\): the ready flag never rose.
    fn wait_until_ready(&self, source: ClockSource, timeout: usize) -> Result<(), ErrorCode> {
        for _ in 0..timeout {
            if self.is_source_ready(source) {
                return Ok(());
            }
        }

        Err(ErrorCode::TIMEOUT)
    }

    /// Whether the core would lose its clock if `source` stopped.
    ///
    /// True when `source` is the live system clock, or when the live system clock is the SPLL and
    /// `source` is its reference.
    fn is_system_clock_dependent_on(&self, source: ClockSource) -> bool {
        let live = self.get_sys_clock_source();
        if live == source {
            return true;
        }
        if live != ClockSource::SPLL {
            return false;
        }
        match (self.get_spll_parameters().reference, source) {
            (SpllReference::HSI, ClockSource::HSI) => true,
            (SpllReference::HSE, ClockSource::HSE) => true,
            _ => false,
        }
    }
}

/// Memory-mapped clock registers of the AC7840x
pub struct Ac7840xClockHardware {
    ckgen: Ckgen,
    spm: Spm,
    rcm: Rcm,
    flash: Flash,
}

impl Ac7840xClockHardware {
    pub const fn new() -> Self {
        Self {
            ckgen: Ckgen::new(),
            spm: Spm::new(),
            rcm: Rcm::new(),
            flash: Flash::new(),
        }
    }
}

impl ClockHardware for Ac7840xClockHardware {
    fn get_power_mode(&self) -> Option<PowerMode> {
        self.spm.get_power_mode()
    }

    fn is_source_ready(&self, source: ClockSource) -> bool {
        self.spm.is_ready(source)
    }

    fn is_source_enabled(&self, source: ClockSource) -> bool {
        self.ckgen.is_enabled(source)
    }

    fn set_source_enabled(&self, source: ClockSource, enable: bool) {
        self.ckgen.set_enabled(source, enable);
    }

    fn set_async_dividers(&self, source: ClockSource, div1: AsyncDivider, div2: AsyncDivider) {
        self.ckgen.set_async_dividers(source, div1, div2);
    }

    fn get_async_divider(&self, source: ClockSource, tap: AsyncTap) -> AsyncDivider {
        self.ckgen.get_async_divider(source, tap)
    }

    fn set_hse_mode(&self, mode: HseMode) {
        self.ckgen.set_hse_mode(mode);
    }

    fn get_hse_mode(&self) -> HseMode {
        self.ckgen.get_hse_mode()
    }

    fn set_spll_parameters(&self, parameters: &SpllParameters) {
        self.ckgen.set_spll_parameters(parameters);
    }

    fn get_spll_parameters(&self) -> SpllParameters {
        self.ckgen.get_spll_parameters()
    }

    // The route is set up before the monitor is enabled and torn down after it is disabled, so
    // a monitor is never live without a defined reaction.
    fn set_monitor(&self, monitor: ClockMonitor, policy: MonitorPolicy) {
        let enable = policy != MonitorPolicy::Disabled;
        if enable {
            self.rcm.set_monitor_route(monitor, policy);
        }
        match monitor {
            ClockMonitor::HSE => self.ckgen.set_hse_monitor(enable),
            ClockMonitor::SPLL => self.ckgen.set_spll_monitor(enable),
        }
        if !enable {
            self.rcm.set_monitor_route(monitor, policy);
        }
    }

    fn get_monitor(&self, monitor: ClockMonitor) -> MonitorPolicy {
        let enabled = match monitor {
            ClockMonitor::HSE => self.ckgen.is_hse_monitor_enabled(),
            ClockMonitor::SPLL => self.ckgen.is_spll_monitor_enabled(),
        };
        if enabled {
            self.rcm.get_monitor_route(monitor)
        } else {
            MonitorPolicy::Disabled
        }
    }

    fn take_clock_loss_events(&self) -> ClockLossEvents {
        self.rcm.take_clock_loss_events()
    }

    fn unlock_ckgen(&self) {
        self.ckgen.unlock();
    }

    fn lock_ckgen(&self) {
        self.ckgen.lock();
    }

    fn get_sys_clock_config(&self, bank: SysClockBank) -> SystemClockConfig {
        self.ckgen.get_sys_clock_config(bank)
    }

    fn set_sys_clock_config(&self, bank: SysClockBank, config: &SystemClockConfig) {
        self.ckgen.set_sys_clock_config(bank, config);
    }

    fn get_sys_clock_source(&self) -> ClockSource {
        self.ckgen.get_sys_clock_source()
    }

    fn unlock_flash(&self) {
        self.flash.unlock();
    }

    fn lock_flash(&self) {
        self.flash.lock();
    }

    fn set_flash_clock_frequency_mhz(&self, frequency_mhz: u32) {
        self.flash.set_clock_frequency_mhz(frequency_mhz);
    }

    fn get_flash_clock_frequency_mhz(&self) -> u32 {
        self.flash.get_clock_frequency_mhz()
    }

    fn set_rtc_clock_source(&self, source: RtcClockSource) {
        self.ckgen.set_rtc_clock_source(source);
    }

    fn get_rtc_clock_source(&self) -> RtcClockSource {
        self.ckgen.get_rtc_clock_source()
    }

    fn set_clock_out(&self, source: ClockOutSource, divider: ClockOutDivider) {
        self.ckgen.set_clock_out(source, divider);
    }

    fn get_clock_out(&self) -> (ClockOutSource, ClockOutDivider) {
        self.ckgen.get_clock_out()
    }

    fn set_module_clock_gate(&self, module: PeripheralModule, enable: bool) {
        self.ckgen.set_module_clock_gate(module, enable);
    }

    fn is_module_clock_enabled(&self, module: PeripheralModule) -> bool {
        self.ckgen.is_module_clock_enabled(module)
    }

    fn set_module_in_reset(&self, module: PeripheralModule, in_reset: bool) {
        self.ckgen.set_module_in_reset(module, in_reset);
    }

    fn is_module_in_reset(&self, module: PeripheralModule) -> bool {
        self.ckgen.is_module_in_reset(module)
    }

    fn set_peripheral_clock(
        &self,
        clock: PeripheralClock,
        source: PeripheralClockSource,
        divider: PeripheralDivider,
    ) {
        self.ckgen.set_peripheral_clock(clock, source, divider);
    }

    fn get_peripheral_clock(
        &self,
        clock: PeripheralClock,
    ) -> (PeripheralClockSource, PeripheralDivider) {
        self.ckgen.get_peripheral_clock(clock)
    }
}
