// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Board clock configuration tables.
//!
//! A board describes each clock setup it wants to run in as a [ClockConfig] and hands the table
//! to [crate::clocks::ClockManager]. Index 0 is applied by [crate::clocks::ClockManager::start].
//!
//! ```rust,ignore
//! const PERIPHERALS: [PeripheralClockConfig; 1] = [PeripheralClockConfig {
//!     clock: PeripheralClock::UART0,
//!     gate: true,
//!     module_clock: ModuleClockConfig {
//!         source: PeripheralClockSource::HsiDiv2,
//!         divider: PeripheralDivider::DivideBy1,
//!     },
//! }];
//!
//! const RUN_ON_SPLL: ClockConfig = ClockConfig {
//!     ckgen: CkgenConfig {
//!         run: SystemClockConfig {
//!             source: ClockSource::SPLL,
//!             core_divider: SysClockDivider::DivideBy1,
//!             bus_divider: SysClockDivider::DivideBy2,
//!         },
//!         ..CkgenConfig::DEFAULT
//!     },
//!     sim: SimConfig::DEFAULT,
//!     peripherals: &PERIPHERALS,
//! };
//! ```

use crate::chip_specific::clock_constants::TCLK_COUNT;
use crate::ckgen::{
    AsyncDivider, ClockOutDivider, ClockOutSource, ClockSource, HseMode, PeripheralClock,
    PeripheralClockSource, PeripheralDivider, RtcClockSource, SpllPrediv, SpllReference,
    SysClockDivider, SystemClockConfig,
};
use crate::rcm::MonitorPolicy;

/// HSI settings
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HsiConfig {
    /// Used by [crate::clocks::Clocks::configure_modules]
    pub enable: bool,
    pub div1: AsyncDivider,
    pub div2: AsyncDivider,
}

impl HsiConfig {
    pub const DEFAULT: Self = Self {
        enable: true,
        div1: AsyncDivider::DivideBy1,
        div2: AsyncDivider::DivideBy1,
    };
}

/// VHSI settings
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VhsiConfig {
    pub enable: bool,
    pub div1: AsyncDivider,
    pub div2: AsyncDivider,
}

impl VhsiConfig {
    pub const DEFAULT: Self = Self {
        enable: true,
        div1: AsyncDivider::DivideBy1,
        div2: AsyncDivider::DivideBy1,
    };
}

/// HSE settings
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HseConfig {
    pub enable: bool,
    /// Frequency of the crystal or of the bypass clock. Must be one of
    /// [crate::chip_specific::clock_constants::HSE_SUPPORTED_FREQUENCIES_HZ].
    pub frequency_hz: u32,
    pub mode: HseMode,
    pub div1: AsyncDivider,
    pub div2: AsyncDivider,
    /// Reaction to a crystal loss
    pub monitor: MonitorPolicy,
}

impl HseConfig {
    pub const DEFAULT: Self = Self {
        enable: true,
        frequency_hz: 8_000_000,
        mode: HseMode::Crystal,
        div1: AsyncDivider::DivideBy1,
        div2: AsyncDivider::DivideBy1,
        monitor: MonitorPolicy::Disabled,
    };
}

/// SPLL settings
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpllConfig {
    pub enable: bool,
    pub reference: SpllReference,
    pub prediv: SpllPrediv,
    pub fbkdiv: u8,
    pub posdiv: u8,
    pub div1: AsyncDivider,
    pub div2: AsyncDivider,
    /// Reaction to a loss of lock
    pub monitor: MonitorPolicy,
}

impl SpllConfig {
    /// 64MHz out of HSI: 8MHz * 64 = 512MHz VCO, / (2 * 4)
    pub const DEFAULT: Self = Self {
        enable: true,
        reference: SpllReference::HSI,
        prediv: SpllPrediv::DivideBy1,
        fbkdiv: 64,
        posdiv: 4,
        div1: AsyncDivider::DivideBy1,
        div2: AsyncDivider::DivideBy2,
        monitor: MonitorPolicy::Disabled,
    };
}

/// Everything CKGEN needs to bring up the clock tree
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CkgenConfig {
    pub hsi: HsiConfig,
    pub vhsi: VhsiConfig,
    pub hse: HseConfig,
    pub spll: SpllConfig,
    /// System clock used in RUN mode
    pub run: SystemClockConfig,
    /// System clock used in VLPR mode, HSI only
    pub vlpr: SystemClockConfig,
}

impl CkgenConfig {
    /// All sources running, RUN mode on VHSI
    pub const DEFAULT: Self = Self {
        hsi: HsiConfig::DEFAULT,
        vhsi: VhsiConfig::DEFAULT,
        hse: HseConfig::DEFAULT,
        spll: SpllConfig::DEFAULT,
        run: SystemClockConfig {
            source: ClockSource::VHSI,
            core_divider: SysClockDivider::DivideBy1,
            bus_divider: SysClockDivider::DivideBy1,
        },
        vlpr: SystemClockConfig {
            source: ClockSource::HSI,
            core_divider: SysClockDivider::DivideBy1,
            bus_divider: SysClockDivider::DivideBy1,
        },
    };
}

/// RTC, CLKOUT and external clock inputs
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    pub rtc_source: RtcClockSource,
    pub clock_out: ClockOutSource,
    pub clock_out_divider: ClockOutDivider,
    /// Frequency of the RTC_CLKIN pin, 0 if unconnected
    pub rtc_clkin_frequency_hz: u32,
    /// Frequencies of the TCLK pins, 0 if unconnected
    pub tclk_frequencies_hz: [u32; TCLK_COUNT],
}

impl SimConfig {
    pub const DEFAULT: Self = Self {
        rtc_source: RtcClockSource::LSI,
        clock_out: ClockOutSource::Off,
        clock_out_divider: ClockOutDivider::DivideBy1,
        rtc_clkin_frequency_hz: 0,
        tclk_frequencies_hz: [0; TCLK_COUNT],
    };
}

/// Functional clock mux of a peripheral
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModuleClockConfig {
    pub source: PeripheralClockSource,
    pub divider: PeripheralDivider,
}

impl ModuleClockConfig {
    pub const OFF: Self = Self {
        source: PeripheralClockSource::Off,
        divider: PeripheralDivider::DivideBy1,
    };
}

/// Functional clock and bus gate of one peripheral
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PeripheralClockConfig {
    pub clock: PeripheralClock,
    /// Bus clock gate of the matching module
    pub gate: bool,
    pub module_clock: ModuleClockConfig,
}

/// A complete clock setup, one entry of the [crate::clocks::ClockManager] table
#[derive(Copy, Clone, Debug)]
pub struct ClockConfig<'a> {
    pub ckgen: CkgenConfig,
    pub sim: SimConfig,
    pub peripherals: &'a [PeripheralClockConfig],
}

/// Board-level policies of the clock engine
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClockFeatures {
    /// Let the SPLL fall back to HSI for the rest of the session when an HSE requested at the
    /// HSI frequency fails to start
    pub auto_select_hsi: bool,
}
