// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Peripheral bus gates, soft resets and functional clocks.
//!
//! Each [PeripheralModule] has a bus clock gate and a soft-reset line. Peripherals listed in
//! [PeripheralClock] also have a functional clock mux fed by the DIV2 tap of one of the sources.
//!
//! Drivers usually hold a [ModuleClock] and go through [ClockInterface]:
//!
//! ```rust,ignore
//! let uart_clock = ModuleClock::new(PeripheralModule::UART0, &peripherals.clocks);
//! uart_clock.enable();
//! peripherals.clocks.soft_reset_module(PeripheralModule::UART0, false);
//! ```

use crate::ckgen::{PeripheralClock, PeripheralModule};
use crate::clocks::clocks::Clocks;
use crate::clocks::config::ModuleClockConfig;
use crate::clocks::freq::ClockName;
use crate::clocks::hardware::ClockHardware;

/// Generic operations on a clock gate
pub trait ClockInterface {
    fn is_enabled(&self) -> bool;
    fn enable(&self);
    fn disable(&self);
}

/// Bus clock gate of one module
pub struct ModuleClock<'a, H: ClockHardware> {
    pub module: PeripheralModule,
    clocks: &'a Clocks<'a, H>,
}

impl<'a, H: ClockHardware> ModuleClock<'a, H> {
    pub const fn new(module: PeripheralModule, clocks: &'a Clocks<'a, H>) -> Self {
        Self { module, clocks }
    }

    /// Bus frequency in Hz seen by the module, 0 while gated off
    pub fn get_frequency(&self) -> u32 {
        self.clocks
            .get_freq(ClockName::Module(self.module))
            .unwrap_or(0)
    }
}

impl<H: ClockHardware> ClockInterface for ModuleClock<'_, H> {
    fn is_enabled(&self) -> bool {
        self.clocks.is_module_enabled(self.module)
    }

    fn enable(&self) {
        self.clocks.enable_module(self.module, true);
    }

    fn disable(&self) {
        self.clocks.enable_module(self.module, false);
    }
}

impl<H: ClockHardware> Clocks<'_, H> {
    /// Open or close the bus clock gate of `module`
    pub fn enable_module(&self, module: PeripheralModule, enable: bool) {
        self.hw.set_module_clock_gate(module, enable);
    }

    pub fn is_module_enabled(&self, module: PeripheralModule) -> bool {
        self.hw.is_module_clock_enabled(module)
    }

    /// Hold `module` in reset (`true`) or release it (`false`)
    pub fn soft_reset_module(&self, module: PeripheralModule, in_reset: bool) {
        self.hw.set_module_in_reset(module, in_reset);
    }

    pub fn is_module_in_reset(&self, module: PeripheralModule) -> bool {
        self.hw.is_module_in_reset(module)
    }

    /// Route the functional clock of `clock`.
    ///
    /// The route is independent of the system clock and of the source state, see
    /// [Clocks::get_freq] for the resulting frequency.
    pub fn set_module_clock(&self, clock: PeripheralClock, config: &ModuleClockConfig) {
        self.hw
            .set_peripheral_clock(clock, config.source, config.divider);
    }

    pub fn get_module_clock(&self, clock: PeripheralClock) -> ModuleClockConfig {
        let (source, divider) = self.hw.get_peripheral_clock(clock);
        ModuleClockConfig { source, divider }
    }
}
