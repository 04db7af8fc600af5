// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! SPM (system power management): current power mode and clock source status flags.

use crate::ckgen::{ClockSource, SysClockBank};
use crate::utilities::StaticRef;
use tock_registers::interfaces::Readable;
use tock_registers::registers::ReadOnly;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    SpmRegisters {
        (0x000 => _reserved0),
        /// Power mode status
        (0x008 => pwr_status: ReadOnly<u32, PWR_STATUS::Register>),
        (0x00C => _reserved1),
        /// Clock source ready flags
        (0x010 => clk_status: ReadOnly<u32, CLK_STATUS::Register>),
        (0x014 => @END),
    }
}

register_bitfields![u32,
    PWR_STATUS [
        MODE OFFSET(0) NUMBITS(3) [
            RUN = 0,
            VLPR = 1,
            STOP = 2,
            VLPS = 3
        ]
    ],
    CLK_STATUS [
        HSI_RDY OFFSET(0) NUMBITS(1) [],
        VHSI_RDY OFFSET(1) NUMBITS(1) [],
        HSE_RDY OFFSET(2) NUMBITS(1) [],
        SPLL_LOCK OFFSET(3) NUMBITS(1) []
    ]
];

const SPM_BASE: StaticRef<SpmRegisters> =
    unsafe { StaticRef::new(0x4000_8000 as *const SpmRegisters) };

/// Power mode of the chip
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowerMode {
    RUN,
    /// Very low power run
    VLPR,
    STOP,
    /// Very low power stop
    VLPS,
}

impl PowerMode {
    /// CKGEN bank holding the system clock configuration used in this mode.
    ///
    /// Stop modes gate the system clock and have no bank.
    pub fn sys_clock_bank(self) -> Option<SysClockBank> {
        match self {
            PowerMode::RUN => Some(SysClockBank::RUN),
            PowerMode::VLPR => Some(SysClockBank::VLPR),
            PowerMode::STOP | PowerMode::VLPS => None,
        }
    }
}

pub struct Spm {
    registers: StaticRef<SpmRegisters>,
}

impl Spm {
    pub const fn new() -> Self {
        Self {
            registers: SPM_BASE,
        }
    }

    /// Current power mode, [None] if the status field holds a reserved value
    pub(crate) fn get_power_mode(&self) -> Option<PowerMode> {
        match self.registers.pwr_status.read_as_enum(PWR_STATUS::MODE) {
            Some(PWR_STATUS::MODE::Value::RUN) => Some(PowerMode::RUN),
            Some(PWR_STATUS::MODE::Value::VLPR) => Some(PowerMode::VLPR),
            Some(PWR_STATUS::MODE::Value::STOP) => Some(PowerMode::STOP),
            Some(PWR_STATUS::MODE::Value::VLPS) => Some(PowerMode::VLPS),
            None => None,
        }
    }

    pub(crate) fn is_ready(&self, source: ClockSource) -> bool {
        match source {
            ClockSource::HSI => self.registers.clk_status.is_set(CLK_STATUS::HSI_RDY),
            ClockSource::VHSI => self.registers.clk_status.is_set(CLK_STATUS::VHSI_RDY),
            ClockSource::HSE => self.registers.clk_status.is_set(CLK_STATUS::HSE_RDY),
            ClockSource::SPLL => self.registers.clk_status.is_set(CLK_STATUS::SPLL_LOCK),
        }
    }
}
