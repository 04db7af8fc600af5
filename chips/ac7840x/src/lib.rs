// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Clock engine for the AutoChips AC7840x family.
//!
//! The crate drives CKGEN (clock generation), SPM (power mode and oscillator status), RCM (clock
//! monitor reset/interrupt routing) and the flash controller's clock field. All the policy lives
//! in [clocks]; the register blocks only expose raw accessors.

#![crate_name = "ac7840x"]
#![crate_type = "rlib"]
#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod chip_specific;
pub mod ckgen;
pub mod clocks;
pub mod errorcode;
pub mod flash;
pub mod rcm;
pub mod spm;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
