// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! HSI (high-speed internal) clock driver for the AC7840x.
//!
//! HSI is an 8MHz RC oscillator. It is the only source allowed in VLPR mode and one of the two
//! possible SPLL references.
//!
//! # Usage
//!
//! The snippets below drop the returned [Result]s. Board code should look at them.
//!
//! The controller lives in [crate::clocks::Clocks]:
//! ```rust,ignore
//! let hsi = &peripherals.clocks.hsi;
//! ```
//!
//! ## Start the clock with its default taps
//!
//! ```rust,ignore
//! hsi.configure(true, None);
//! ```
//!
//! ## Start the clock with custom taps
//!
//! ```rust,ignore
//! hsi.configure(true, Some(&HsiConfig {
//!     enable: true,
//!     div1: AsyncDivider::DivideBy1,
//!     div2: AsyncDivider::DivideBy4,
//! }));
//! ```
//!
//! ## Stop the clock
//!
//! ```rust,ignore
//! hsi.configure(false, None);
//! ```
//!
//! ## Read the frequency
//!
//! ```rust,ignore
//! let hsi_frequency_hz = hsi.get_frequency_hz();
//! ```

use crate::chip_specific::clock_constants::{timeouts, HSI_FREQUENCY_HZ};
use crate::ckgen::{AsyncDivider, ClockSource};
use crate::clocks::config::HsiConfig;
use crate::clocks::hardware::ClockHardware;
use crate::ErrorCode;

// Shared by the two RC oscillators. A source feeding the core is left untouched, its taps
// included.
pub(in crate::clocks) fn configure_rc_oscillator<H: ClockHardware>(
    hw: &H,
    source: ClockSource,
    enable: bool,
    div1: AsyncDivider,
    div2: AsyncDivider,
    timeout: usize,
) -> Result<(), ErrorCode> {
    if hw.is_system_clock_dependent_on(source) {
        return Err(ErrorCode::BUSY);
    }

    if !enable {
        hw.set_source_enabled(source, false);
        return Ok(());
    }

    hw.set_async_dividers(source, div1, div2);
    if !hw.is_source_enabled(source) {
        hw.set_source_enabled(source, true);
    }

    hw.wait_until_ready(source, timeout)
}

/// Controller of the 8MHz RC oscillator
pub struct Hsi<'a, H: ClockHardware> {
    hw: &'a H,
}

impl<'a, H: ClockHardware> Hsi<'a, H> {
    /// # Parameters
    ///
    /// + hw: register access to the clock blocks
    pub(in crate::clocks) fn new(hw: &'a H) -> Self {
        Self { hw }
    }

    /// Start, stop or re-tap the HSI clock.
    ///
    /// When `config` is [None], [HsiConfig::DEFAULT] is used. Only the taps of `config` are
    /// used, `enable` decides whether the oscillator runs.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if HSI drives the system clock, directly or as the SPLL
    /// reference. Neither the enable bit nor the taps are written.
    /// + [Err]\([ErrorCode::TIMEOUT]\): if HSI did not report ready in time. The oscillator is
    /// left enabled and a later call polls it again.
    pub fn configure(&self, enable: bool, config: Option<&HsiConfig>) -> Result<(), ErrorCode> {
        let config = config.unwrap_or(&HsiConfig::DEFAULT);
        configure_rc_oscillator(
            self.hw,
            ClockSource::HSI,
            enable,
            config.div1,
            config.div2,
            timeouts::HSI,
        )
    }

    /// Whether the oscillator enable bit is set. The oscillator may still be settling.
    pub fn is_enabled(&self) -> bool {
        self.hw.is_source_enabled(ClockSource::HSI)
    }

    /// Get the frequency in Hz of the HSI clock, 0 if it is not ready.
    pub fn get_frequency_hz(&self) -> u32 {
        if self.hw.is_source_ready(ClockSource::HSI) {
            HSI_FREQUENCY_HZ
        } else {
            0
        }
    }
}

/// On-target checks of the HSI controller
///
/// # Usage
///
/// Import the module in the board's main file:
///
/// ```rust,ignore
/// use ac7840x::clocks::hsi;
/// ```
///
/// and call the suite before the kernel main loop:
///
/// ```rust,ignore
/// hsi::tests::run(&peripherals.clocks.hsi);
/// ```
///
/// A passing run logs:
///
/// ```text
/// ===============================================
/// Testing HSI...
/// HSI checks passed
/// ===============================================
/// ```
///
/// The checks expect the reset state: HSI running and driving the core.
pub mod tests {
    use super::*;
    use log::info;

    /// Run every check.
    pub fn run<H: ClockHardware>(hsi: &Hsi<H>) {
        info!("");
        info!("===============================================");
        info!("Testing HSI...");

        // Running out of reset
        assert!(hsi.is_enabled());

        // HSI frequency is 8MHz
        assert_eq!(HSI_FREQUENCY_HZ, hsi.get_frequency_hz());

        // HSI drives the core, so it can be neither stopped nor re-tapped
        assert_eq!(Err(ErrorCode::BUSY), hsi.configure(false, None));
        assert_eq!(Err(ErrorCode::BUSY), hsi.configure(true, None));
        assert!(hsi.is_enabled());

        info!("HSI checks passed");
        info!("===============================================");
        info!("");
    }
}
