// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! SPLL (system phase-locked loop) clock driver.
//!
//! The SPLL multiplies HSI or HSE:
//!
//! ```text
//! VCO      = reference / prediv * fbkdiv        (500MHz to 1500MHz)
//! SPLL_CLK = VCO / (2 * posdiv)
//! ```
//!
//! # Usage
//!
//! The reference frequency is not known to the SPLL itself, so the driver is normally used
//! through [crate::clocks::Clocks], which looks it up:
//!
//! ```rust,ignore
//! let clocks = &peripherals.clocks;
//!
//! // 120MHz out of an 8MHz crystal
//! let parameters = spll::compute_parameters(
//!     SpllReference::HSE,
//!     8_000_000,
//!     120,
//! )?;
//! clocks.configure_spll(true, Some(&SpllConfig {
//!     reference: parameters.reference,
//!     prediv: parameters.prediv,
//!     fbkdiv: parameters.fbkdiv,
//!     posdiv: parameters.posdiv,
//!     ..SpllConfig::DEFAULT
//! }));
//!
//! let spll_frequency_hz = clocks.get_spll_frequency_hz();
//! ```
//!
//! # HSI fallback
//!
//! With [crate::clocks::ClockFeatures::auto_select_hsi], a board whose HSE crystal does not start
//! keeps running on HSI: the SPLL replaces an HSE reference with HSI for the rest of the session.
//! The substitution is latched and only a reset clears it.

use core::cell::Cell;

use crate::chip_specific::clock_constants::{spll, timeouts};
use crate::ckgen::{ClockSource, SpllParameters, SpllPrediv, SpllReference};
use crate::clocks::config::SpllConfig;
use crate::clocks::hardware::ClockHardware;
use crate::rcm::{ClockMonitor, MonitorPolicy};
use crate::ErrorCode;

/// VCO frequency in Hz for a reference, pre-divider and feedback divider
pub fn vco_frequency_hz(reference_hz: u32, prediv: SpllPrediv, fbkdiv: u8) -> u64 {
    reference_hz as u64 / u32::from(prediv) as u64 * fbkdiv as u64
}

/// SPLL output frequency in Hz, 0 for a zero post-divider
pub fn output_frequency_hz(reference_hz: u32, parameters: &SpllParameters) -> u32 {
    if parameters.posdiv == 0 {
        return 0;
    }
    let vco_hz = vco_frequency_hz(reference_hz, parameters.prediv, parameters.fbkdiv);
    (vco_hz / (2 * parameters.posdiv as u64)) as u32
}

/// Check the divider ranges and the VCO operating range.
///
/// # Errors
///
/// + [Err]\([ErrorCode::INVAL]\): a divider is out of range or the VCO would run outside
/// 500MHz to 1500MHz
pub fn check_parameters(
    reference_hz: u32,
    parameters: &SpllParameters,
) -> Result<(), ErrorCode> {
    if parameters.fbkdiv < spll::FBKDIV_MIN
        || parameters.posdiv < spll::POSDIV_MIN
        || parameters.posdiv > spll::POSDIV_MAX
    {
        return Err(ErrorCode::INVAL);
    }

    let vco_hz = vco_frequency_hz(reference_hz, parameters.prediv, parameters.fbkdiv);
    if vco_hz < spll::VCO_MIN_HZ || vco_hz > spll::VCO_MAX_HZ {
        return Err(ErrorCode::INVAL);
    }

    Ok(())
}

/// Find dividers giving `frequency_mhz` out of `reference_hz`.
///
/// The request is clamped to 16MHz..=120MHz. The pre-divider keeps the phase detector input
/// at or below 8MHz, the post-divider is the smallest one bringing the VCO to at least 500MHz,
/// and the feedback divider is rounded up if truncation would drop the VCO below that floor.
/// The output is exact when the phase detector frequency divides the target VCO.
///
/// # Errors
///
/// + [Err]\([ErrorCode::INVAL]\): no valid divider set exists for this reference
pub fn compute_parameters(
    reference: SpllReference,
    reference_hz: u32,
    frequency_mhz: u32,
) -> Result<SpllParameters, ErrorCode> {
    let frequency_mhz = frequency_mhz.clamp(spll::OUTPUT_MIN_MHZ, spll::OUTPUT_MAX_MHZ);

    let prediv = if reference_hz <= spll::PFD_MAX_HZ {
        SpllPrediv::DivideBy1
    } else if reference_hz <= 2 * spll::PFD_MAX_HZ {
        SpllPrediv::DivideBy2
    } else {
        SpllPrediv::DivideBy4
    };
    let pfd_hz = (reference_hz / u32::from(prediv)) as u64;
    if pfd_hz == 0 {
        return Err(ErrorCode::INVAL);
    }

    let output_hz = frequency_mhz as u64 * 1_000_000;
    let posdiv = (spll::POSDIV_MIN..=spll::POSDIV_MAX)
        .find(|posdiv| output_hz * 2 * *posdiv as u64 >= spll::VCO_MIN_HZ)
        .ok_or(ErrorCode::INVAL)?;

    let vco_hz = output_hz * 2 * posdiv as u64;
    let mut fbkdiv = vco_hz / pfd_hz;
    if pfd_hz * fbkdiv < spll::VCO_MIN_HZ {
        fbkdiv += 1;
    }
    if fbkdiv > spll::FBKDIV_MAX as u64 {
        return Err(ErrorCode::INVAL);
    }

    let parameters = SpllParameters {
        reference,
        prediv,
        fbkdiv: fbkdiv as u8,
        posdiv,
    };
    check_parameters(reference_hz, &parameters)?;
    Ok(parameters)
}

pub struct Spll<'a, H: ClockHardware> {
    hw: &'a H,
    hsi_substituted: Cell<bool>,
}

impl<'a, H: ClockHardware> Spll<'a, H> {
    pub(in crate::clocks) fn new(hw: &'a H) -> Self {
        Self {
            hw,
            hsi_substituted: Cell::new(false),
        }
    }

    /// Reference actually used when `requested` is asked for
    pub fn effective_reference(&self, requested: SpllReference) -> SpllReference {
        if requested == SpllReference::HSE && self.hsi_substituted.get() {
            SpllReference::HSI
        } else {
            requested
        }
    }

    pub(in crate::clocks) fn substitute_hsi_for_hse(&self) {
        self.hsi_substituted.set(true);
    }

    /// Whether an HSE reference is being replaced with HSI
    pub fn is_hsi_substituted(&self) -> bool {
        self.hsi_substituted.get()
    }

    /// Start or stop the SPLL.
    ///
    /// `reference_hz` is the frequency of the reference selected by `config`, after HSI
    /// substitution (see [Spll::effective_reference]). The parameters are validated before any
    /// register is written. The loop is stopped before the new dividers are programmed and the
    /// loss-of-lock monitor is only armed once the loop has locked.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the SPLL is the system clock
    /// + [Err]\([ErrorCode::INVAL]\): if the dividers are out of range or the VCO would leave its
    /// operating range, including when the reference is not running
    /// + [Err]\([ErrorCode::TIMEOUT]\): if the loop did not lock in time
    pub fn configure(
        &self,
        enable: bool,
        config: Option<&SpllConfig>,
        reference_hz: u32,
    ) -> Result<(), ErrorCode> {
        let config = config.unwrap_or(&SpllConfig::DEFAULT);

        if self.hw.is_system_clock_dependent_on(ClockSource::SPLL) {
            return Err(ErrorCode::BUSY);
        }

        let parameters = SpllParameters {
            reference: self.effective_reference(config.reference),
            prediv: config.prediv,
            fbkdiv: config.fbkdiv,
            posdiv: config.posdiv,
        };
        if enable {
            check_parameters(reference_hz, &parameters)?;
        }

        self.hw.set_monitor(ClockMonitor::SPLL, MonitorPolicy::Disabled);
        self.hw.set_source_enabled(ClockSource::SPLL, false);
        if !enable {
            return Ok(());
        }

        self.hw.set_spll_parameters(&parameters);
        self.hw
            .set_async_dividers(ClockSource::SPLL, config.div1, config.div2);
        self.hw.set_source_enabled(ClockSource::SPLL, true);

        self.hw.wait_until_ready(ClockSource::SPLL, timeouts::SPLL)?;

        self.hw.set_monitor(ClockMonitor::SPLL, config.monitor);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.hw.is_source_enabled(ClockSource::SPLL)
    }

    /// Frequency in Hz recomputed from the divider registers, 0 if the loop is not locked.
    ///
    /// `reference_hz` is the frequency of the reference currently selected in the registers.
    pub fn get_frequency_hz(&self, reference_hz: u32) -> u32 {
        if !self.hw.is_source_ready(ClockSource::SPLL) {
            return 0;
        }
        output_frequency_hz(reference_hz, &self.hw.get_spll_parameters())
    }
}
