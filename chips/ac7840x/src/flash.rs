// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Flash controller clock setting.
//!
//! The flash controller derives its read wait states from the core clock frequency programmed
//! in `CNFG.CLK_FREQ`. The configuration register only accepts writes after the two-key unlock
//! sequence.

use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    FlashRegisters {
        /// Unlock key
        (0x000 => key: WriteOnly<u32>),
        (0x004 => ctrl: ReadWrite<u32, CTRL::Register>),
        (0x008 => cnfg: ReadWrite<u32, CNFG::Register>),
        (0x00C => @END),
    }
}

register_bitfields![u32,
    CTRL [
        LOCK OFFSET(31) NUMBITS(1) []
    ],
    CNFG [
        /// Core clock frequency in MHz
        CLK_FREQ OFFSET(0) NUMBITS(8) []
    ]
];

const FLASH_BASE: StaticRef<FlashRegisters> =
    unsafe { StaticRef::new(0x4000_2000 as *const FlashRegisters) };

/// First key of the unlock sequence
pub const FLASH_UNLOCK_KEY1: u32 = 0x00AC_7840;
/// Second key of the unlock sequence
pub const FLASH_UNLOCK_KEY2: u32 = 0x0123_4567;

pub struct Flash {
    registers: StaticRef<FlashRegisters>,
}

impl Flash {
    pub const fn new() -> Self {
        Self {
            registers: FLASH_BASE,
        }
    }

    // Both keys must be written back to back.
    pub(crate) fn unlock(&self) {
        self.registers.key.set(FLASH_UNLOCK_KEY1);
        self.registers.key.set(FLASH_UNLOCK_KEY2);
    }

    pub(crate) fn lock(&self) {
        self.registers.ctrl.modify(CTRL::LOCK::SET);
    }

    pub(crate) fn set_clock_frequency_mhz(&self, frequency_mhz: u32) {
        self.registers
            .cnfg
            .modify(CNFG::CLK_FREQ.val(frequency_mhz));
    }

    pub(crate) fn get_clock_frequency_mhz(&self) -> u32 {
        self.registers.cnfg.read(CNFG::CLK_FREQ)
    }
}
