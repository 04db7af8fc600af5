// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

pub mod clocks;
pub mod config;
pub mod freq;
pub mod hardware;
pub mod hse;
pub mod hsi;
pub mod manager;
pub mod phclk;
pub mod spll;
pub mod vhsi;

#[cfg(test)]
pub(crate) mod sim;

pub use crate::clocks::clocks::tests;
pub use crate::clocks::clocks::Clocks;
pub use crate::clocks::config::{
    CkgenConfig, ClockConfig, ClockFeatures, HseConfig, HsiConfig, ModuleClockConfig,
    PeripheralClockConfig, SimConfig, SpllConfig, VhsiConfig,
};
pub use crate::clocks::freq::ClockName;
pub use crate::clocks::hardware::{Ac7840xClockHardware, ClockHardware};
pub use crate::clocks::manager::{
    CallbackType, ClockCallback, ClockManager, ClockNotification, ClockNotifyClient,
    ClockPolicy, ManagerState, NotifyType,
};
pub use crate::clocks::phclk::{ClockInterface, ModuleClock};
