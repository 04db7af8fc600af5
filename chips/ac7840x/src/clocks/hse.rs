// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! HSE (high-speed external) clock driver for the AC7840x.
//!
//! The HSE block runs either a crystal on XTAL/EXTAL or takes a square wave on EXTAL (bypass).
//! The hardware cannot measure the frequency, so the value given at configuration time is
//! recorded and reported back while the oscillator is ready.
//!
//! # Usage
//!
//! ```rust,ignore
//! let hse = &peripherals.clocks.hse;
//!
//! // 16MHz crystal, reset the chip if it stops
//! hse.configure(true, Some(&HseConfig {
//!     frequency_hz: 16_000_000,
//!     monitor: MonitorPolicy::Reset,
//!     ..HseConfig::DEFAULT
//! }));
//!
//! let hse_frequency_hz = hse.get_frequency_hz();
//! ```
//!
//! A crystal may take a long time to start. When [Hse::configure] returns
//! [ErrorCode::TIMEOUT] the recorded frequency is provisional: it is reported as soon as the
//! oscillator becomes ready.

use core::cell::Cell;

use crate::chip_specific::clock_constants::{timeouts, HSE_SUPPORTED_FREQUENCIES_HZ};
use crate::ckgen::ClockSource;
use crate::clocks::config::HseConfig;
use crate::clocks::hardware::ClockHardware;
use crate::rcm::{ClockMonitor, MonitorPolicy};
use crate::ErrorCode;

/// Main HSE clock structure
pub struct Hse<'a, H: ClockHardware> {
    hw: &'a H,
    frequency_hz: Cell<u32>,
}

impl<'a, H: ClockHardware> Hse<'a, H> {
    pub(in crate::clocks) fn new(hw: &'a H) -> Self {
        Self {
            hw,
            frequency_hz: Cell::new(0),
        }
    }

    /// Start or stop the HSE clock.
    ///
    /// Starting always goes through a full stop first, since neither the input mode nor the
    /// crystal can change while the oscillator runs. The crystal-loss monitor is armed only once
    /// the oscillator reports ready, and disarmed before it is stopped.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the system clock depends on HSE, directly or through the
    /// SPLL. Nothing is written in that case.
    /// + [Err]\([ErrorCode::TIMEOUT]\): if the oscillator did not become ready in time. HSE is
    /// left enabled with its monitor disarmed.
    pub fn configure(&self, enable: bool, config: Option<&HseConfig>) -> Result<(), ErrorCode> {
        let config = config.unwrap_or(&HseConfig::DEFAULT);

        if self.hw.is_system_clock_dependent_on(ClockSource::HSE) {
            return Err(ErrorCode::BUSY);
        }

        self.hw.set_monitor(ClockMonitor::HSE, MonitorPolicy::Disabled);
        self.hw.set_source_enabled(ClockSource::HSE, false);
        if !enable {
            return Ok(());
        }

        debug_assert!(
            HSE_SUPPORTED_FREQUENCIES_HZ.contains(&config.frequency_hz),
            "unsupported HSE frequency {}",
            config.frequency_hz
        );

        self.hw.set_hse_mode(config.mode);
        self.hw
            .set_async_dividers(ClockSource::HSE, config.div1, config.div2);
        self.frequency_hz.set(config.frequency_hz);
        self.hw.set_source_enabled(ClockSource::HSE, true);

        self.hw.wait_until_ready(ClockSource::HSE, timeouts::HSE)?;

        self.hw.set_monitor(ClockMonitor::HSE, config.monitor);
        Ok(())
    }

    /// Check whether the HSE clock is enabled or not.
    pub fn is_enabled(&self) -> bool {
        self.hw.is_source_enabled(ClockSource::HSE)
    }

    /// Get the frequency in Hz of the HSE clock.
    ///
    /// # Returns
    ///
    /// + the configured frequency if the oscillator is ready
    /// + 0 otherwise
    pub fn get_frequency_hz(&self) -> u32 {
        if self.hw.is_source_ready(ClockSource::HSE) {
            self.frequency_hz.get()
        } else {
            0
        }
    }

    /// Frequency recorded by the last [Hse::configure], whether or not the oscillator started
    pub fn get_configured_frequency_hz(&self) -> u32 {
        self.frequency_hz.get()
    }
}
