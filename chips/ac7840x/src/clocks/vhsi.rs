// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! VHSI (very high-speed internal) clock driver.
//!
//! The 48MHz RC oscillator needs no external part and settles quickly, which makes it the
//! temporary system clock used while the other sources are reprogrammed. Usage is the same as
//! for [crate::clocks::hsi::Hsi].

use crate::chip_specific::clock_constants::{timeouts, VHSI_FREQUENCY_HZ};
use crate::ckgen::ClockSource;
use crate::clocks::config::VhsiConfig;
use crate::clocks::hardware::ClockHardware;
use crate::clocks::hsi::configure_rc_oscillator;
use crate::ErrorCode;

pub struct Vhsi<'a, H: ClockHardware> {
    hw: &'a H,
}

impl<'a, H: ClockHardware> Vhsi<'a, H> {
    pub(in crate::clocks) fn new(hw: &'a H) -> Self {
        Self { hw }
    }

    /// Start, stop or re-tap the VHSI clock. [VhsiConfig::DEFAULT] is used when `config` is
    /// [None].
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if VHSI is the system clock. Nothing is written.
    /// + [Err]\([ErrorCode::TIMEOUT]\): if VHSI did not report ready in time
    pub fn configure(&self, enable: bool, config: Option<&VhsiConfig>) -> Result<(), ErrorCode> {
        let config = config.unwrap_or(&VhsiConfig::DEFAULT);
        configure_rc_oscillator(
            self.hw,
            ClockSource::VHSI,
            enable,
            config.div1,
            config.div2,
            timeouts::VHSI,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.hw.is_source_enabled(ClockSource::VHSI)
    }

    /// Frequency in Hz, 0 if VHSI is not ready
    pub fn get_frequency_hz(&self) -> u32 {
        if self.hw.is_source_ready(ClockSource::VHSI) {
            VHSI_FREQUENCY_HZ
        } else {
            0
        }
    }
}
