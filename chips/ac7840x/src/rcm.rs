// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! RCM (reset control): routing of the HSE loss and SPLL unlock monitors.
//!
//! The monitors themselves are enabled in CKGEN. RCM decides whether a detected event resets
//! the chip or raises the clock interrupt, and latches the event flags.

use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    RcmRegisters {
        (0x000 => _reserved0),
        /// Reset enables of the clock monitors
        (0x010 => rst_en: ReadWrite<u32, MONITOR::Register>),
        /// Interrupt enables of the clock monitors
        (0x014 => irq_en: ReadWrite<u32, MONITOR::Register>),
        /// Latched monitor events, write 1 to clear
        (0x018 => flags: ReadWrite<u32, MONITOR::Register>),
        (0x01C => @END),
    }
}

register_bitfields![u32,
    MONITOR [
        XOSC_LOSS OFFSET(0) NUMBITS(1) [],
        SPLL_UNLOCK OFFSET(1) NUMBITS(1) []
    ]
];

const RCM_BASE: StaticRef<RcmRegisters> =
    unsafe { StaticRef::new(0x4004_8000 as *const RcmRegisters) };

/// Clock monitors with a reset/interrupt route
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockMonitor {
    /// HSE crystal loss
    HSE,
    /// SPLL loss of lock
    SPLL,
}

/// Reaction to a clock monitor event
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MonitorPolicy {
    Disabled,
    /// Raise the clock interrupt, see [crate::clocks::Clocks::handle_interrupt]
    Interrupt,
    /// Reset the chip
    Reset,
}

/// Monitor events latched since the last acknowledge
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClockLossEvents {
    pub hse_loss: bool,
    pub spll_unlock: bool,
}

pub struct Rcm {
    registers: StaticRef<RcmRegisters>,
}

impl Rcm {
    pub const fn new() -> Self {
        Self {
            registers: RCM_BASE,
        }
    }

    fn field(monitor: ClockMonitor) -> tock_registers::fields::Field<u32, MONITOR::Register> {
        match monitor {
            ClockMonitor::HSE => MONITOR::XOSC_LOSS,
            ClockMonitor::SPLL => MONITOR::SPLL_UNLOCK,
        }
    }

    pub(crate) fn set_monitor_route(&self, monitor: ClockMonitor, policy: MonitorPolicy) {
        let field = Self::field(monitor);
        let (reset, interrupt) = match policy {
            MonitorPolicy::Disabled => (0, 0),
            MonitorPolicy::Interrupt => (0, 1),
            MonitorPolicy::Reset => (1, 0),
        };
        self.registers.rst_en.modify(field.val(reset));
        self.registers.irq_en.modify(field.val(interrupt));
    }

    pub(crate) fn get_monitor_route(&self, monitor: ClockMonitor) -> MonitorPolicy {
        let field = Self::field(monitor);
        if self.registers.rst_en.is_set(field) {
            MonitorPolicy::Reset
        } else if self.registers.irq_en.is_set(field) {
            MonitorPolicy::Interrupt
        } else {
            MonitorPolicy::Disabled
        }
    }

    /// Read the latched events and clear them
    pub(crate) fn take_clock_loss_events(&self) -> ClockLossEvents {
        let flags = self.registers.flags.extract();
        let events = ClockLossEvents {
            hse_loss: flags.is_set(MONITOR::XOSC_LOSS),
            spll_unlock: flags.is_set(MONITOR::SPLL_UNLOCK),
        };
        self.registers.flags.set(flags.get());
        events
    }
}
