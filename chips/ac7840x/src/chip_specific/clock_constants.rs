// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Clock-related constants of the AC7840x

use crate::ckgen::ClockSource;
use crate::spm::PowerMode;

/// HSI frequency in Hz
pub const HSI_FREQUENCY_HZ: u32 = 8_000_000;
/// VHSI frequency in Hz
pub const VHSI_FREQUENCY_HZ: u32 = 48_000_000;
/// LSI frequency in Hz
pub const LSI_FREQUENCY_HZ: u32 = 32_000;
/// Frequency of the LSI 1kHz tap in Hz
pub const LSI_1K_FREQUENCY_HZ: u32 = 1_000;

/// Crystal and bypass frequencies supported by the HSE oscillator
pub const HSE_SUPPORTED_FREQUENCIES_HZ: [u32; 5] =
    [4_000_000, 8_000_000, 12_000_000, 16_000_000, 30_000_000];

/// Number of TCLK input pins
pub const TCLK_COUNT: usize = 3;

/// Iteration bounds of the ready-flag polls
pub mod timeouts {
    pub const HSI: usize = 100;
    pub const VHSI: usize = 100;
    /// Crystal startup is several orders of magnitude slower than the RC oscillators.
    pub const HSE: usize = 100_000;
    pub const SPLL: usize = 10_000;
    /// Wait for the system clock mux to report the requested source
    pub const SYS_CLOCK_SWITCH: usize = 100;
}

/// SPLL operating range
pub mod spll {
    pub const VCO_MIN_HZ: u64 = 500_000_000;
    pub const VCO_MAX_HZ: u64 = 1_500_000_000;
    /// Maximum phase detector input
    pub const PFD_MAX_HZ: u32 = 8_000_000;
    pub const FBKDIV_MIN: u8 = 5;
    pub const FBKDIV_MAX: u8 = 255;
    pub const POSDIV_MIN: u8 = 1;
    pub const POSDIV_MAX: u8 = 31;
    /// Output range accepted by [crate::clocks::Clocks::set_sys_clock_to_spll]
    pub const OUTPUT_MIN_MHZ: u32 = 16;
    pub const OUTPUT_MAX_MHZ: u32 = 120;
    /// Above this core frequency the bus runs at half speed
    pub const BUS_HALF_SPEED_ABOVE_MHZ: u32 = 60;
}

/// Core and bus frequency caps for one system clock source
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrequencyLimits {
    pub core_hz: u32,
    pub bus_hz: u32,
}

const fn limits(core_mhz: u32, bus_mhz: u32) -> FrequencyLimits {
    FrequencyLimits {
        core_hz: core_mhz * 1_000_000,
        bus_hz: bus_mhz * 1_000_000,
    }
}

/// RUN mode caps, indexed by [ClockSource]
pub const MAX_FREQUENCIES_RUN_MODE: [FrequencyLimits; 4] = [
    // HSI
    limits(8, 8),
    // VHSI
    limits(48, 48),
    // HSE
    limits(30, 30),
    // SPLL
    limits(120, 60),
];

/// VLPR mode caps, indexed by [ClockSource]. Only HSI may run in VLPR.
pub const MAX_FREQUENCIES_VLPR_MODE: [FrequencyLimits; 4] =
    [limits(8, 8), limits(0, 0), limits(0, 0), limits(0, 0)];

/// Caps of `source` in `mode`, [None] if the mode has no system clock
pub fn max_frequencies(mode: PowerMode, source: ClockSource) -> Option<FrequencyLimits> {
    match mode {
        PowerMode::RUN => Some(MAX_FREQUENCIES_RUN_MODE[source as usize]),
        PowerMode::VLPR => Some(MAX_FREQUENCIES_VLPR_MODE[source as usize]),
        PowerMode::STOP | PowerMode::VLPS => None,
    }
}
