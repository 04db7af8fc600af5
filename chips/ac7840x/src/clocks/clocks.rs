// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! AC7840x clock driver
//!
//! This module owns the four clock sources (HSI, VHSI, HSE and SPLL) and switches the system
//! clock between them. For the source-level details, check their documentation.
//!
//! # Features
//!
//! - [x] Core and bus frequency limits verification for RUN and VLPR modes
//! - [x] Flash clock kept in step with the core clock
//! - [x] Glitch-free reconfiguration through a temporary VHSI system clock
//! - [x] SPLL divider computation for a target frequency
//! - [x] Recovery from HSE loss and SPLL unlock events
//! - [x] Peripheral gates, soft resets and functional clock muxes
//!
//! # Usage
//!
//! All operations go through the [crate::clocks::Clocks] owned by the chip peripherals:
//!
//! ```rust,ignore
//! let clocks = &peripherals.clocks;
//! ```
//!
//! ## Retrieve the core frequency:
//!
//! ```rust,ignore
//! let core_frequency = clocks.get_freq(ClockName::Core);
//! debug!("Current core frequency is {:?}Hz", core_frequency);
//! ```
//!
//! ## Run the core at 120MHz out of an 8MHz crystal:
//!
//! ```rust,ignore
//! clocks.hse.configure(true, Some(&HseConfig::DEFAULT));
//! clocks.set_sys_clock_to_spll(SpllReference::HSE, 120);
//! ```
//!
//! The bus clock is halved automatically above 60MHz.
//!
//! ## Switch to a source with explicit dividers:
//!
//! ```rust,ignore
//! clocks.transition_system_clock(&SystemClockConfig {
//!     source: ClockSource::HSE,
//!     core_divider: SysClockDivider::DivideBy1,
//!     bus_divider: SysClockDivider::DivideBy2,
//! });
//! ```
//!
//! The request is rejected with [ErrorCode::FAIL] before anything is written if the core or bus
//! frequency would exceed the limits of the current power mode.
//!
//! ## Apply a complete configuration:
//!
//! ```rust,ignore
//! clocks.set_configuration(&BOARD_CLOCK_CONFIG);
//! ```
//!
//! Most boards go through [crate::clocks::ClockManager] instead, which also notifies the drivers
//! depending on the clock tree.
//!
//! The snippets ignore the returned [Result]s.

use core::cell::Cell;

use crate::chip_specific::clock_constants::{self, spll, timeouts, TCLK_COUNT};
use crate::ckgen::{
    AsyncTap, ClockSource, SpllReference, SysClockBank, SysClockDivider, SystemClockConfig,
};
use crate::clocks::config::{
    CkgenConfig, ClockConfig, ClockFeatures, SimConfig, SpllConfig,
};
use crate::clocks::hardware::ClockHardware;
use crate::clocks::hse::Hse;
use crate::clocks::hsi::Hsi;
use crate::clocks::spll::{compute_parameters, Spll};
use crate::clocks::vhsi::Vhsi;
use crate::rcm::{ClockMonitor, MonitorPolicy};
use crate::spm::PowerMode;
use crate::ErrorCode;

use log::{debug, error, warn};

/// System clock used while the other sources are reprogrammed
pub const TEMPORARY_SYSTEM_CLOCK: SystemClockConfig = SystemClockConfig {
    source: ClockSource::VHSI,
    core_divider: SysClockDivider::DivideBy1,
    bus_divider: SysClockDivider::DivideBy2,
};

/// Sources tried, in order, when VHSI itself has to be reprogrammed
const STEPPING_STONES: [ClockSource; 3] = [ClockSource::SPLL, ClockSource::HSE, ClockSource::HSI];

/// Clock engine of the chip: the four sources and the system clock mux.
pub struct Clocks<'a, H: ClockHardware> {
    pub(in crate::clocks) hw: &'a H,
    features: ClockFeatures,
    /// 8MHz RC oscillator
    pub hsi: Hsi<'a, H>,
    /// Very high speed internal clock
    pub vhsi: Vhsi<'a, H>,
    /// Crystal or external clock input
    pub hse: Hse<'a, H>,
    /// System phase-locked loop
    pub spll: Spll<'a, H>,
    pub(in crate::clocks) rtc_clkin_frequency_hz: Cell<u32>,
    pub(in crate::clocks) tclk_frequencies_hz: [Cell<u32>; TCLK_COUNT],
}

impl<'a, H: ClockHardware> Clocks<'a, H> {
    // Created once, together with the chip peripherals
    pub fn new(hw: &'a H, features: ClockFeatures) -> Self {
        Self {
            hw,
            features,
            hsi: Hsi::new(hw),
            vhsi: Vhsi::new(hw),
            hse: Hse::new(hw),
            spll: Spll::new(hw),
            rtc_clkin_frequency_hz: Cell::new(0),
            tclk_frequencies_hz: [Cell::new(0), Cell::new(0), Cell::new(0)],
        }
    }

    /// Current power mode, [None] if SPM reports a reserved value
    pub fn get_power_mode(&self) -> Option<PowerMode> {
        self.hw.get_power_mode()
    }

    /// Source currently feeding the core, as reported by the hardware
    pub fn get_system_clock_source(&self) -> ClockSource {
        self.hw.get_sys_clock_source()
    }

    /// Programmed system clock configuration of `mode`, [None] for the stop modes
    pub fn get_system_clock_config(&self, mode: PowerMode) -> Option<SystemClockConfig> {
        mode.sys_clock_bank()
            .map(|bank| self.hw.get_sys_clock_config(bank))
    }

    /// Frequency of `source` in Hz, 0 if it is not ready
    pub fn get_source_frequency_hz(&self, source: ClockSource) -> u32 {
        match source {
            ClockSource::HSI => self.hsi.get_frequency_hz(),
            ClockSource::VHSI => self.vhsi.get_frequency_hz(),
            ClockSource::HSE => self.hse.get_frequency_hz(),
            ClockSource::SPLL => self.get_spll_frequency_hz(),
        }
    }

    fn get_reference_frequency_hz(&self, reference: SpllReference) -> u32 {
        match reference {
            SpllReference::HSI => self.hsi.get_frequency_hz(),
            SpllReference::HSE => self.hse.get_frequency_hz(),
        }
    }

    /// SPLL frequency in Hz recomputed from the registers, 0 if the loop is not locked
    pub fn get_spll_frequency_hz(&self) -> u32 {
        let reference = self.hw.get_spll_parameters().reference;
        self.spll
            .get_frequency_hz(self.get_reference_frequency_hz(reference))
    }

    /// Core clock frequency in Hz: live source divided by the core divider of the current mode
    pub fn get_core_frequency_hz(&self) -> u32 {
        let bank = match self.get_power_mode().and_then(PowerMode::sys_clock_bank) {
            Some(bank) => bank,
            None => return 0,
        };
        let divider = self.hw.get_sys_clock_config(bank).core_divider;
        self.get_source_frequency_hz(self.hw.get_sys_clock_source()) / u32::from(divider)
    }

    /// Start or stop the SPLL, looking up the frequency of its reference.
    ///
    /// See [Spll::configure] for the errors.
    pub fn configure_spll(&self, enable: bool, config: Option<&SpllConfig>) -> Result<(), ErrorCode> {
        let config = config.unwrap_or(&SpllConfig::DEFAULT);
        let reference = self.spll.effective_reference(config.reference);
        self.spll.configure(
            enable,
            Some(config),
            self.get_reference_frequency_hz(reference),
        )
    }

    /// Start or stop a source with its default configuration.
    pub fn set_clock_source(&self, source: ClockSource, enable: bool) -> Result<(), ErrorCode> {
        match source {
            ClockSource::HSI => self.hsi.configure(enable, None),
            ClockSource::VHSI => self.vhsi.configure(enable, None),
            ClockSource::HSE => self.hse.configure(enable, None),
            ClockSource::SPLL => self.configure_spll(enable, None),
        }
    }

    /// Program the system clock configuration of `mode`.
    ///
    /// The resulting core and bus frequencies are checked against the limits of `mode` before
    /// anything is written. For the current mode, the flash clock is reprogrammed around the
    /// write. The bank of the other mode is written as is. This does not wait for the mux, see
    /// [Clocks::transition_system_clock].
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::FAIL]\): if `mode` has no system clock, if a source other than HSI is
    /// requested for VLPR, if a frequency limit would be exceeded, or if the source is not ready
    /// while `mode` is the current mode
    pub fn set_system_clock_config(
        &self,
        mode: PowerMode,
        config: &SystemClockConfig,
    ) -> Result<(), ErrorCode> {
        let bank = mode.sys_clock_bank().ok_or(ErrorCode::FAIL)?;
        if mode == PowerMode::VLPR && config.source != ClockSource::HSI {
            return Err(ErrorCode::FAIL);
        }
        let limits =
            clock_constants::max_frequencies(mode, config.source).ok_or(ErrorCode::FAIL)?;

        let source_hz = self.get_source_frequency_hz(config.source);
        let core_hz = source_hz / u32::from(config.core_divider);
        let bus_hz = core_hz / u32::from(config.bus_divider);
        if core_hz > limits.core_hz || bus_hz > limits.bus_hz {
            debug!(
                "{:?}: core {}Hz / bus {}Hz over the {:?} limits",
                config.source, core_hz, bus_hz, mode
            );
            return Err(ErrorCode::FAIL);
        }

        if self.get_power_mode() == Some(mode) {
            if source_hz == 0 {
                return Err(ErrorCode::FAIL);
            }
            self.write_system_clock_config(bank, config, core_hz);
        } else {
            self.hw.unlock_ckgen();
            self.hw.set_sys_clock_config(bank, config);
            self.hw.lock_ckgen();
        }

        Ok(())
    }

    fn write_system_clock_config(
        &self,
        bank: SysClockBank,
        config: &SystemClockConfig,
        core_hz: u32,
    ) {
        let current_core_hz = self.get_core_frequency_hz();
        let flash_mhz = core_hz.div_ceil(1_000_000);

        self.hw.unlock_ckgen();
        self.hw.unlock_flash();
        // The flash must already be set for the faster clock before the core speeds up, and
        // must keep the slower setting until the core has slowed down.
        if core_hz > current_core_hz {
            self.hw.set_flash_clock_frequency_mhz(flash_mhz);
        }
        self.hw.set_sys_clock_config(bank, config);
        if core_hz <= current_core_hz {
            self.hw.set_flash_clock_frequency_mhz(flash_mhz);
        }
        self.hw.lock_ckgen();
        self.hw.lock_flash();
    }

    /// Switch the system clock of the current power mode to `target` and wait for the mux.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::FAIL]\): if the power mode is unknown or has no system clock, or the
    /// configuration was rejected, see [Clocks::set_system_clock_config]
    /// + [Err]\([ErrorCode::TIMEOUT]\): if the mux did not report the new source in time
    pub fn transition_system_clock(&self, target: &SystemClockConfig) -> Result<(), ErrorCode> {
        let mode = self.get_power_mode().ok_or(ErrorCode::FAIL)?;
        self.set_system_clock_config(mode, target)?;

        for _ in 0..timeouts::SYS_CLOCK_SWITCH {
            if self.hw.get_sys_clock_source() == target.source {
                debug!("System clock running from {:?}", target.source);
                return Ok(());
            }
        }

        warn!("System clock did not switch to {:?}", target.source);
        Err(ErrorCode::TIMEOUT)
    }

    /// Make VHSI the system clock, starting it with its defaults if needed.
    ///
    /// Does nothing when VHSI already drives the core.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::FAIL]\): if not in RUN mode
    /// + [Err]\([ErrorCode::TIMEOUT]\): if VHSI or the mux did not settle
    pub fn configure_temporary_system_clock(&self) -> Result<(), ErrorCode> {
        if self.hw.get_sys_clock_source() == ClockSource::VHSI {
            return Ok(());
        }

        if self.vhsi.get_frequency_hz() == 0 {
            self.vhsi.configure(true, None)?;
        }

        self.transition_system_clock(&TEMPORARY_SYSTEM_CLOCK)
    }

    // Largest configuration of `source` fitting the limits of `mode`
    fn fitting_config(
        mode: PowerMode,
        source: ClockSource,
        source_hz: u32,
    ) -> Option<SystemClockConfig> {
        let limits = clock_constants::max_frequencies(mode, source)?;
        if limits.core_hz == 0 || limits.bus_hz == 0 {
            return None;
        }

        let core_divider = source_hz.div_ceil(limits.core_hz).max(1);
        let bus_divider = (source_hz / core_divider).div_ceil(limits.bus_hz).max(1);
        if core_divider > 16 || bus_divider > 16 {
            return None;
        }

        Some(SystemClockConfig {
            source,
            core_divider: SysClockDivider::from_field(core_divider - 1),
            bus_divider: SysClockDivider::from_field(bus_divider - 1),
        })
    }

    fn find_stepping_stone(&self, mode: PowerMode) -> Option<SystemClockConfig> {
        STEPPING_STONES.iter().find_map(|&source| {
            match self.get_source_frequency_hz(source) {
                0 => None,
                source_hz => Self::fitting_config(mode, source, source_hz),
            }
        })
    }

    /// Bring every source to `config` and end on the system clock it requests for the current
    /// power mode.
    ///
    /// VHSI must be the system clock when this is called, see
    /// [Clocks::configure_temporary_system_clock]. When the target system clock is VHSI itself,
    /// the core is parked on the first running source among SPLL, HSE and HSI while VHSI is
    /// reprogrammed.
    ///
    /// A running SPLL has its loss-of-lock monitor disarmed before its reference is touched. The
    /// monitor is armed again by the SPLL configuration once the loop has locked.
    ///
    /// If HSE times out, its requested frequency equals the HSI frequency and
    /// [ClockFeatures::auto_select_hsi] is set, the SPLL is switched to HSI for the rest of the
    /// session and configuration goes on.
    ///
    /// # Errors
    ///
    /// + any error of the source controllers
    /// + [Err]\([ErrorCode::FAIL]\): if the power mode has no system clock, or VHSI has to be
    /// reprogrammed and no other source is running
    /// + [Err]\([ErrorCode::TIMEOUT]\): if the mux did not follow
    pub fn configure_modules(&self, config: &CkgenConfig) -> Result<(), ErrorCode> {
        // Stopping the reference unlocks the loop
        if self.spll.is_enabled() && !self.hw.is_system_clock_dependent_on(ClockSource::SPLL) {
            self.hw.set_monitor(ClockMonitor::SPLL, MonitorPolicy::Disabled);
        }

        self.hsi.configure(config.hsi.enable, Some(&config.hsi))?;

        match self.hse.configure(config.hse.enable, Some(&config.hse)) {
            Ok(()) => {}
            Err(ErrorCode::TIMEOUT)
                if self.features.auto_select_hsi
                    && config.hse.frequency_hz == clock_constants::HSI_FREQUENCY_HZ =>
            {
                warn!("HSE did not start, SPLL uses HSI from now on");
                self.spll.substitute_hsi_for_hse();
            }
            Err(error) => return Err(error),
        }

        self.configure_spll(config.spll.enable, Some(&config.spll))?;

        let mode = self.get_power_mode().ok_or(ErrorCode::FAIL)?;
        let next = match mode {
            PowerMode::RUN => config.run,
            PowerMode::VLPR => config.vlpr,
            PowerMode::STOP | PowerMode::VLPS => return Err(ErrorCode::FAIL),
        };

        if next.source != ClockSource::VHSI {
            self.transition_system_clock(&next)?;
            self.vhsi.configure(config.vhsi.enable, Some(&config.vhsi))?;
        } else {
            let stepping_stone = self.find_stepping_stone(mode).ok_or(ErrorCode::FAIL)?;
            self.transition_system_clock(&stepping_stone)?;
            self.vhsi.configure(config.vhsi.enable, Some(&config.vhsi))?;
            self.transition_system_clock(&next)?;
        }

        Ok(())
    }

    /// Program the RTC source, CLKOUT and the frequencies of the external clock pins.
    pub fn configure_sim(&self, config: &SimConfig) {
        self.rtc_clkin_frequency_hz
            .set(config.rtc_clkin_frequency_hz);
        for (tclk, frequency_hz) in self
            .tclk_frequencies_hz
            .iter()
            .zip(config.tclk_frequencies_hz)
        {
            tclk.set(frequency_hz);
        }
        self.hw.set_rtc_clock_source(config.rtc_source);
        self.hw
            .set_clock_out(config.clock_out, config.clock_out_divider);
    }

    /// Apply a complete clock configuration.
    ///
    /// The system clock is first parked on VHSI, then the sources and the system clock are
    /// configured, the VLPR bank is programmed for a later power mode change and finally the
    /// SIM level clocks and the peripheral clocks are set up.
    ///
    /// # Errors
    ///
    /// See [Clocks::configure_modules] and [Clocks::set_system_clock_config].
    pub fn set_configuration(&self, config: &ClockConfig) -> Result<(), ErrorCode> {
        self.configure_temporary_system_clock()?;
        self.configure_modules(&config.ckgen)?;
        self.set_system_clock_config(PowerMode::VLPR, &config.ckgen.vlpr)?;
        self.configure_sim(&config.sim);

        for peripheral in config.peripherals {
            self.set_module_clock(peripheral.clock, &peripheral.module_clock);
            self.enable_module(peripheral.clock.module(), peripheral.gate);
        }

        debug!(
            "Clock configuration applied, core {}Hz",
            self.get_core_frequency_hz()
        );
        Ok(())
    }

    /// Run the core from the SPLL at `frequency_mhz`.
    ///
    /// The frequency is clamped to 16MHz..=120MHz. The core divider is 1 and the bus divider is
    /// 2 above 60MHz, 1 otherwise. The SPLL taps and loss-of-lock policy are kept.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): if the reference is not running or no divider set fits
    /// + any error of [Clocks::configure_temporary_system_clock], [Spll::configure] and
    /// [Clocks::transition_system_clock]
    pub fn set_sys_clock_to_spll(
        &self,
        reference: SpllReference,
        frequency_mhz: u32,
    ) -> Result<(), ErrorCode> {
        let frequency_mhz = frequency_mhz.clamp(spll::OUTPUT_MIN_MHZ, spll::OUTPUT_MAX_MHZ);
        let reference = self.spll.effective_reference(reference);
        let parameters = compute_parameters(
            reference,
            self.get_reference_frequency_hz(reference),
            frequency_mhz,
        )?;

        self.configure_temporary_system_clock()?;

        let config = SpllConfig {
            enable: true,
            reference: parameters.reference,
            prediv: parameters.prediv,
            fbkdiv: parameters.fbkdiv,
            posdiv: parameters.posdiv,
            div1: self.hw.get_async_divider(ClockSource::SPLL, AsyncTap::Div1),
            div2: self.hw.get_async_divider(ClockSource::SPLL, AsyncTap::Div2),
            monitor: self.hw.get_monitor(ClockMonitor::SPLL),
        };
        self.configure_spll(true, Some(&config))?;

        let bus_divider = if frequency_mhz > spll::BUS_HALF_SPEED_ABOVE_MHZ {
            SysClockDivider::DivideBy2
        } else {
            SysClockDivider::DivideBy1
        };
        self.transition_system_clock(&SystemClockConfig {
            source: ClockSource::SPLL,
            core_divider: SysClockDivider::DivideBy1,
            bus_divider,
        })
    }

    /// Clock monitor interrupt handler.
    ///
    /// Acknowledges the latched HSE loss and SPLL unlock events. If the core depends on the lost
    /// clock, it is moved to VHSI right away, without any validation or notification.
    pub fn handle_interrupt(&self) {
        let events = self.hw.take_clock_loss_events();

        if events.hse_loss {
            warn!("HSE clock lost");
            if self.hw.is_system_clock_dependent_on(ClockSource::HSE) {
                self.fall_back_to_vhsi();
            }
        }

        if events.spll_unlock {
            warn!("SPLL lost lock");
            if self.hw.get_sys_clock_source() == ClockSource::SPLL {
                self.fall_back_to_vhsi();
            }
        }
    }

    fn fall_back_to_vhsi(&self) {
        if self.hw.get_sys_clock_source() == ClockSource::VHSI {
            return;
        }
        let bank = match self.get_power_mode().and_then(PowerMode::sys_clock_bank) {
            Some(bank) => bank,
            None => return,
        };

        if !self.hw.is_source_enabled(ClockSource::VHSI) {
            self.hw.set_source_enabled(ClockSource::VHSI, true);
        }
        if self
            .hw
            .wait_until_ready(ClockSource::VHSI, timeouts::VHSI)
            .is_err()
        {
            error!("VHSI not ready, system clock left on the failed source");
            return;
        }

        let core_hz = clock_constants::VHSI_FREQUENCY_HZ
            / u32::from(TEMPORARY_SYSTEM_CLOCK.core_divider);
        self.write_system_clock_config(bank, &TEMPORARY_SYSTEM_CLOCK, core_hz);
        warn!("System clock moved to VHSI");
    }
}

/// On-target checks of the clock engine
///
/// The suite walks the system clock across the sources and checks the frequency limits.
///
/// # Usage
///
/// Import [crate::clocks] in the board's main file:
///
/// ```rust,ignore
/// use ac7840x::clocks;
/// ```
/// To run all the available tests, add this line before the kernel main loop:
///
/// ```rust,ignore
/// clocks::tests::run(&peripherals.clocks);
/// ```
///
/// A passing run logs:
///
/// ```text
/// ===============================================
/// Testing clocks...
///
/// ===============================================
/// Testing HSI...
/// HSI checks passed
/// ===============================================
///
/// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
/// Testing frequency limits...
/// Frequency limit checks passed
/// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
///
/// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
/// Testing system clock transitions...
/// System clock transition checks passed
/// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
///
/// Clock checks passed
/// ===============================================
/// ```
///
/// The checks expect the reset state: RUN mode on HSI with VHSI
/// running.
pub mod tests {
    use super::*;
    use crate::clocks::freq::ClockName;
    use crate::clocks::hsi;
    use log::info;

    const BOOT_CONFIG: SystemClockConfig = SystemClockConfig {
        source: ClockSource::HSI,
        core_divider: SysClockDivider::DivideBy1,
        bus_divider: SysClockDivider::DivideBy1,
    };

    // This macro ensures that the system clock goes back to the boot configuration before
    // panicking, so the console keeps its baud rate.
    macro_rules! check_and_panic {
        ($left:expr, $right:expr, $clocks: ident) => {
            match (&$left, &$right) {
                (left_val, right_val) => {
                    if *left_val != *right_val {
                        let _ = $clocks.transition_system_clock(&BOOT_CONFIG);
                        assert_eq!($left, $right);
                    }
                }
            };
        };
    }

    /// Test the RUN and VLPR frequency limits
    pub fn test_frequency_limits<H: ClockHardware>(clocks: &Clocks<H>) {
        info!("");
        info!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        info!("Testing frequency limits...");

        // VHSI can't run the bus at full speed in VLPR, nor anything other than HSI
        for source in [ClockSource::VHSI, ClockSource::HSE, ClockSource::SPLL] {
            check_and_panic!(
                Err(ErrorCode::FAIL),
                clocks.set_system_clock_config(
                    PowerMode::VLPR,
                    &SystemClockConfig {
                        source,
                        ..BOOT_CONFIG
                    }
                ),
                clocks
            );
        }

        // HSI fits both modes undivided
        check_and_panic!(
            Ok(()),
            clocks.set_system_clock_config(PowerMode::VLPR, &BOOT_CONFIG),
            clocks
        );

        // 120MHz SPLL with an undivided bus breaks the 60MHz bus limit
        check_and_panic!(Ok(()), clocks.set_sys_clock_to_spll(SpllReference::HSI, 120), clocks);
        check_and_panic!(
            Err(ErrorCode::FAIL),
            clocks.set_system_clock_config(
                PowerMode::RUN,
                &SystemClockConfig {
                    source: ClockSource::SPLL,
                    core_divider: SysClockDivider::DivideBy1,
                    bus_divider: SysClockDivider::DivideBy1,
                }
            ),
            clocks
        );
        check_and_panic!(Ok(()), clocks.transition_system_clock(&BOOT_CONFIG), clocks);

        info!("Frequency limit checks passed");
        info!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        info!("");
    }

    /// Test switching the system clock between sources
    pub fn test_transitions<H: ClockHardware>(clocks: &Clocks<H>) {
        info!("");
        info!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        info!("Testing system clock transitions...");

        check_and_panic!(Ok(()), clocks.configure_temporary_system_clock(), clocks);
        check_and_panic!(ClockSource::VHSI, clocks.get_system_clock_source(), clocks);
        check_and_panic!(Ok(48_000_000), clocks.get_freq(ClockName::Core), clocks);
        check_and_panic!(Ok(24_000_000), clocks.get_freq(ClockName::Bus), clocks);

        // The live source can't be stopped
        check_and_panic!(Err(ErrorCode::BUSY), clocks.vhsi.configure(false, None), clocks);

        check_and_panic!(Ok(()), clocks.set_sys_clock_to_spll(SpllReference::HSI, 64), clocks);
        check_and_panic!(ClockSource::SPLL, clocks.get_system_clock_source(), clocks);
        check_and_panic!(Ok(64_000_000), clocks.get_freq(ClockName::Core), clocks);
        check_and_panic!(Ok(32_000_000), clocks.get_freq(ClockName::Bus), clocks);

        // HSI is the SPLL reference
        check_and_panic!(Err(ErrorCode::BUSY), clocks.hsi.configure(false, None), clocks);

        check_and_panic!(Ok(()), clocks.transition_system_clock(&BOOT_CONFIG), clocks);
        check_and_panic!(Ok(()), clocks.configure_spll(false, None), clocks);
        check_and_panic!(Ok(8_000_000), clocks.get_freq(ClockName::Core), clocks);

        info!("System clock transition checks passed");
        info!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        info!("");
    }

    /// Run every check, HSI first.
    pub fn run<H: ClockHardware>(clocks: &Clocks<H>) {
        info!("");
        info!("===============================================");
        info!("Testing clocks...");

        hsi::tests::run(&clocks.hsi);
        test_frequency_limits(clocks);
        test_transitions(clocks);

        info!("Clock checks passed");
        info!("===============================================");
        info!("");
    }
}
