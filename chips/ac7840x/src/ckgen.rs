// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! CKGEN (clock generation) register block.
//!
//! CKGEN holds the system clock mux of both power-mode banks, the four clock sources, the
//! peripheral gate, soft-reset and mux registers, plus the RTC and clock-out selectors. Writes to
//! the two bank registers are only accepted while the lock is released.
//!
//! Nothing in this module enforces a policy. Sequencing lives in [crate::clocks].

use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Clock generation
    CkgenRegisters {
        /// RUN mode system clock configuration
        (0x000 => run_ctrl: ReadWrite<u32, SYSCLK::Register>),
        /// VLPR mode system clock configuration
        (0x004 => vlpr_ctrl: ReadWrite<u32, SYSCLK::Register>),
        /// Source actually feeding the system clock
        (0x008 => sysclk_status: ReadOnly<u32, SYSCLK_STATUS::Register>),
        /// Write lock of the clock control registers
        (0x00C => lock: ReadWrite<u32, LOCK::Register>),
        (0x010 => hsi_ctrl: ReadWrite<u32, RC_CTRL::Register>),
        (0x014 => vhsi_ctrl: ReadWrite<u32, RC_CTRL::Register>),
        (0x018 => hse_ctrl: ReadWrite<u32, HSE_CTRL::Register>),
        (0x01C => spll_ctrl0: ReadWrite<u32, SPLL_CTRL0::Register>),
        (0x020 => spll_ctrl1: ReadWrite<u32, SPLL_CTRL1::Register>),
        (0x024 => rtc_ctrl: ReadWrite<u32, RTC_CTRL::Register>),
        (0x028 => clkout_ctrl: ReadWrite<u32, CLKOUT_CTRL::Register>),
        (0x02C => _reserved0),
        /// Peripheral bus clock gates, one bit per module
        (0x030 => peri_clk_en: [ReadWrite<u32>; 3]),
        (0x03C => _reserved1),
        /// Peripheral soft resets, one active-low bit per module
        (0x040 => peri_sft_rst: [ReadWrite<u32>; 3]),
        (0x04C => _reserved2),
        /// Peripheral functional clock mux and divider
        (0x050 => peri_clk_sel: [ReadWrite<u32, PERI_CLK_SEL::Register>; 32]),
        (0x0D0 => @END),
    }
}

register_bitfields![u32,
    SYSCLK [
        /// System clock source
        SRC OFFSET(0) NUMBITS(2) [],
        /// Core clock divider, value + 1
        CORE_DIV OFFSET(4) NUMBITS(4) [],
        /// Bus clock divider, value + 1
        BUS_DIV OFFSET(8) NUMBITS(4) []
    ],
    SYSCLK_STATUS [
        SRC OFFSET(0) NUMBITS(2) []
    ],
    LOCK [
        LOCK OFFSET(0) NUMBITS(1) []
    ],
    RC_CTRL [
        EN OFFSET(0) NUMBITS(1) [],
        DIV1 OFFSET(8) NUMBITS(3) [],
        DIV2 OFFSET(12) NUMBITS(3) []
    ],
    HSE_CTRL [
        EN OFFSET(0) NUMBITS(1) [],
        /// External clock on EXTAL instead of a crystal
        BYPASS OFFSET(1) NUMBITS(1) [],
        /// Crystal loss monitor
        MON_EN OFFSET(2) NUMBITS(1) [],
        DIV1 OFFSET(8) NUMBITS(3) [],
        DIV2 OFFSET(12) NUMBITS(3) []
    ],
    SPLL_CTRL0 [
        EN OFFSET(0) NUMBITS(1) [],
        REF_SEL OFFSET(1) NUMBITS(1) [
            HSI = 0,
            HSE = 1
        ],
        /// Loss-of-lock monitor
        MON_EN OFFSET(2) NUMBITS(1) [],
        DIV1 OFFSET(8) NUMBITS(3) [],
        DIV2 OFFSET(12) NUMBITS(3) []
    ],
    SPLL_CTRL1 [
        PREDIV OFFSET(0) NUMBITS(2) [],
        FBKDIV OFFSET(8) NUMBITS(8) [],
        POSDIV OFFSET(16) NUMBITS(5) []
    ],
    RTC_CTRL [
        SRC OFFSET(0) NUMBITS(2) []
    ],
    CLKOUT_CTRL [
        SRC OFFSET(0) NUMBITS(4) [],
        DIV OFFSET(8) NUMBITS(3) []
    ],
    PERI_CLK_SEL [
        SRC OFFSET(0) NUMBITS(3) [],
        DIV OFFSET(4) NUMBITS(3) []
    ]
];

const CKGEN_BASE: StaticRef<CkgenRegisters> =
    unsafe { StaticRef::new(0x4006_3000 as *const CkgenRegisters) };

/// Clock sources able to drive the system clock
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockSource {
    /// 8MHz internal RC oscillator
    HSI = 0b00,
    /// 48MHz internal RC oscillator
    VHSI = 0b01,
    /// External crystal or clock input
    HSE = 0b10,
    /// System phase-locked loop
    SPLL = 0b11,
}

impl ClockSource {
    fn from_field(value: u32) -> Self {
        match value {
            0b00 => ClockSource::HSI,
            0b01 => ClockSource::VHSI,
            0b10 => ClockSource::HSE,
            _ => ClockSource::SPLL,
        }
    }
}

/// Register bank holding the system clock configuration for a power mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SysClockBank {
    RUN,
    VLPR,
}

/// Core and bus clock divider (1 to 16)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SysClockDivider {
    DivideBy1 = 0,
    DivideBy2 = 1,
    DivideBy3 = 2,
    DivideBy4 = 3,
    DivideBy5 = 4,
    DivideBy6 = 5,
    DivideBy7 = 6,
    DivideBy8 = 7,
    DivideBy9 = 8,
    DivideBy10 = 9,
    DivideBy11 = 10,
    DivideBy12 = 11,
    DivideBy13 = 12,
    DivideBy14 = 13,
    DivideBy15 = 14,
    DivideBy16 = 15,
}

impl SysClockDivider {
    /// Decode the 4-bit register field. Only the low four bits are considered.
    pub fn from_field(value: u32) -> Self {
        match value & 0xF {
            0 => SysClockDivider::DivideBy1,
            1 => SysClockDivider::DivideBy2,
            2 => SysClockDivider::DivideBy3,
            3 => SysClockDivider::DivideBy4,
            4 => SysClockDivider::DivideBy5,
            5 => SysClockDivider::DivideBy6,
            6 => SysClockDivider::DivideBy7,
            7 => SysClockDivider::DivideBy8,
            8 => SysClockDivider::DivideBy9,
            9 => SysClockDivider::DivideBy10,
            10 => SysClockDivider::DivideBy11,
            11 => SysClockDivider::DivideBy12,
            12 => SysClockDivider::DivideBy13,
            13 => SysClockDivider::DivideBy14,
            14 => SysClockDivider::DivideBy15,
            _ => SysClockDivider::DivideBy16,
        }
    }
}

impl From<SysClockDivider> for u32 {
    fn from(item: SysClockDivider) -> u32 {
        item as u32 + 1
    }
}

/// Source and dividers of the system clock for one power mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SystemClockConfig {
    pub source: ClockSource,
    /// CORE_CLK = source / core_divider
    pub core_divider: SysClockDivider,
    /// BUS_CLK = CORE_CLK / bus_divider
    pub bus_divider: SysClockDivider,
}

/// Asynchronous output divider of a clock source (DIV1 and DIV2 taps)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AsyncDivider {
    /// Tap disabled
    Off = 0,
    DivideBy1 = 1,
    DivideBy2 = 2,
    DivideBy4 = 3,
    DivideBy8 = 4,
    DivideBy16 = 5,
    DivideBy32 = 6,
    DivideBy64 = 7,
}

impl AsyncDivider {
    fn from_field(value: u32) -> Self {
        match value {
            1 => AsyncDivider::DivideBy1,
            2 => AsyncDivider::DivideBy2,
            3 => AsyncDivider::DivideBy4,
            4 => AsyncDivider::DivideBy8,
            5 => AsyncDivider::DivideBy16,
            6 => AsyncDivider::DivideBy32,
            7 => AsyncDivider::DivideBy64,
            _ => AsyncDivider::Off,
        }
    }

    /// Divisor of the tap, [None] when the tap is off
    pub fn divisor(self) -> Option<u32> {
        match self {
            AsyncDivider::Off => None,
            divider => Some(1 << (divider as u32 - 1)),
        }
    }
}

/// Selects one of the two asynchronous taps of a clock source
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AsyncTap {
    Div1,
    Div2,
}

/// HSE input circuit
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HseMode {
    /// Crystal on XTAL/EXTAL driven by the internal oscillator
    Crystal,
    /// External square wave on EXTAL
    Bypass,
}

/// SPLL reference clock
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpllReference {
    HSI,
    HSE,
}

/// SPLL reference pre-divider. The field value 2 is reserved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpllPrediv {
    DivideBy1 = 0,
    DivideBy2 = 1,
    DivideBy4 = 3,
}

impl From<SpllPrediv> for u32 {
    fn from(item: SpllPrediv) -> u32 {
        match item {
            SpllPrediv::DivideBy1 => 1,
            SpllPrediv::DivideBy2 => 2,
            SpllPrediv::DivideBy4 => 4,
        }
    }
}

/// Multiplier setting of the SPLL
///
/// VCO = reference / prediv * fbkdiv, SPLL_CLK = VCO / (2 * posdiv)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpllParameters {
    pub reference: SpllReference,
    pub prediv: SpllPrediv,
    /// Feedback divider
    pub fbkdiv: u8,
    /// Post divider
    pub posdiv: u8,
}

/// RTC clock source
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RtcClockSource {
    /// 32kHz internal low speed oscillator
    LSI = 0,
    /// RTC_CLKIN pin
    RtcClkIn = 1,
    /// HSE DIV2 tap
    HseDiv2 = 2,
}

/// Source of the CLKOUT pin
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockOutSource {
    Off = 0,
    Core = 1,
    Bus = 2,
    HSI = 3,
    VHSI = 4,
    HSE = 5,
    SPLL = 6,
    LSI = 7,
    RTC = 8,
}

/// CLKOUT divider, 1 to 8
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockOutDivider {
    DivideBy1 = 0,
    DivideBy2 = 1,
    DivideBy3 = 2,
    DivideBy4 = 3,
    DivideBy5 = 4,
    DivideBy6 = 5,
    DivideBy7 = 6,
    DivideBy8 = 7,
}

impl From<ClockOutDivider> for u32 {
    fn from(item: ClockOutDivider) -> u32 {
        item as u32 + 1
    }
}

/// Module with a bus clock gate and a soft reset line.
///
/// The discriminant is the module id: register `id / 32`, bit `id % 32` of both the gate and
/// the soft-reset arrays.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeripheralModule {
    UART0 = 0,
    UART1 = 1,
    UART2 = 2,
    UART3 = 3,
    UART4 = 4,
    UART5 = 5,
    SPI0 = 6,
    SPI1 = 7,
    SPI2 = 8,
    SPI3 = 9,
    I2C0 = 10,
    I2C1 = 11,
    CAN0 = 12,
    CAN1 = 13,
    CAN2 = 14,
    CAN3 = 15,
    PWM0 = 16,
    PWM1 = 17,
    PWM2 = 18,
    PWM3 = 19,
    PWM4 = 20,
    PWM5 = 21,
    ADC0 = 22,
    ADC1 = 23,
    TIMER = 24,
    PCT = 25,
    EIO = 26,
    RTC = 27,
    DMA0 = 28,
    CRC = 29,
    ACMP0 = 30,
    PDT0 = 31,
    PDT1 = 32,
    GPIO = 33,
    WDG = 34,
    EWDG = 35,
    MPU = 36,
    SMU = 37,
    AES = 64,
    TRNG = 65,
}

impl PeripheralModule {
    pub fn id(self) -> usize {
        self as usize
    }

    /// Index of the gate/reset register holding this module
    pub fn register_index(self) -> usize {
        self.id() / 32
    }

    pub fn bit(self) -> u32 {
        1 << (self.id() % 32)
    }
}

/// Peripheral with a functional clock mux.
///
/// The discriminant indexes the mux register array and equals the id of the module gated by the
/// same clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeripheralClock {
    UART0 = 0,
    UART1 = 1,
    UART2 = 2,
    UART3 = 3,
    UART4 = 4,
    UART5 = 5,
    SPI0 = 6,
    SPI1 = 7,
    SPI2 = 8,
    SPI3 = 9,
    I2C0 = 10,
    I2C1 = 11,
    CAN0 = 12,
    CAN1 = 13,
    CAN2 = 14,
    CAN3 = 15,
    PWM0 = 16,
    PWM1 = 17,
    PWM2 = 18,
    PWM3 = 19,
    PWM4 = 20,
    PWM5 = 21,
    ADC0 = 22,
    ADC1 = 23,
    TIMER = 24,
    PCT = 25,
    EIO = 26,
}

/// Number of functional clock muxes in use
pub const PERIPHERAL_CLOCK_COUNT: usize = 27;

impl PeripheralClock {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Module whose bus gate and reset belong to this functional clock
    pub fn module(self) -> PeripheralModule {
        match self {
            PeripheralClock::UART0 => PeripheralModule::UART0,
            PeripheralClock::UART1 => PeripheralModule::UART1,
            PeripheralClock::UART2 => PeripheralModule::UART2,
            PeripheralClock::UART3 => PeripheralModule::UART3,
            PeripheralClock::UART4 => PeripheralModule::UART4,
            PeripheralClock::UART5 => PeripheralModule::UART5,
            PeripheralClock::SPI0 => PeripheralModule::SPI0,
            PeripheralClock::SPI1 => PeripheralModule::SPI1,
            PeripheralClock::SPI2 => PeripheralModule::SPI2,
            PeripheralClock::SPI3 => PeripheralModule::SPI3,
            PeripheralClock::I2C0 => PeripheralModule::I2C0,
            PeripheralClock::I2C1 => PeripheralModule::I2C1,
            PeripheralClock::CAN0 => PeripheralModule::CAN0,
            PeripheralClock::CAN1 => PeripheralModule::CAN1,
            PeripheralClock::CAN2 => PeripheralModule::CAN2,
            PeripheralClock::CAN3 => PeripheralModule::CAN3,
            PeripheralClock::PWM0 => PeripheralModule::PWM0,
            PeripheralClock::PWM1 => PeripheralModule::PWM1,
            PeripheralClock::PWM2 => PeripheralModule::PWM2,
            PeripheralClock::PWM3 => PeripheralModule::PWM3,
            PeripheralClock::PWM4 => PeripheralModule::PWM4,
            PeripheralClock::PWM5 => PeripheralModule::PWM5,
            PeripheralClock::ADC0 => PeripheralModule::ADC0,
            PeripheralClock::ADC1 => PeripheralModule::ADC1,
            PeripheralClock::TIMER => PeripheralModule::TIMER,
            PeripheralClock::PCT => PeripheralModule::PCT,
            PeripheralClock::EIO => PeripheralModule::EIO,
        }
    }
}

/// Functional clock source of a peripheral
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeripheralClockSource {
    Off = 0,
    HsiDiv2 = 1,
    VhsiDiv2 = 2,
    HseDiv2 = 3,
    SpllDiv2 = 4,
}

/// Functional clock divider of a peripheral, 1 to 8
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeripheralDivider {
    DivideBy1 = 0,
    DivideBy2 = 1,
    DivideBy3 = 2,
    DivideBy4 = 3,
    DivideBy5 = 4,
    DivideBy6 = 5,
    DivideBy7 = 6,
    DivideBy8 = 7,
}

impl From<PeripheralDivider> for u32 {
    fn from(item: PeripheralDivider) -> u32 {
        item as u32 + 1
    }
}

fn divider_field_1_to_8(value: u32) -> u32 {
    value & 0b111
}

pub struct Ckgen {
    registers: StaticRef<CkgenRegisters>,
}

impl Ckgen {
    pub const fn new() -> Self {
        Self {
            registers: CKGEN_BASE,
        }
    }

    /* Lock */
    pub(crate) fn unlock(&self) {
        self.registers.lock.write(LOCK::LOCK::CLEAR);
    }

    pub(crate) fn lock(&self) {
        self.registers.lock.write(LOCK::LOCK::SET);
    }

    /* System clock */
    fn bank(&self, bank: SysClockBank) -> &ReadWrite<u32, SYSCLK::Register> {
        match bank {
            SysClockBank::RUN => &self.registers.run_ctrl,
            SysClockBank::VLPR => &self.registers.vlpr_ctrl,
        }
    }

    pub(crate) fn get_sys_clock_config(&self, bank: SysClockBank) -> SystemClockConfig {
        let register = self.bank(bank);
        SystemClockConfig {
            source: ClockSource::from_field(register.read(SYSCLK::SRC)),
            core_divider: SysClockDivider::from_field(register.read(SYSCLK::CORE_DIV)),
            bus_divider: SysClockDivider::from_field(register.read(SYSCLK::BUS_DIV)),
        }
    }

    // Dividers and source are written in a single access so the mux never sees a mixed
    // configuration.
    pub(crate) fn set_sys_clock_config(&self, bank: SysClockBank, config: &SystemClockConfig) {
        self.bank(bank).write(
            SYSCLK::SRC.val(config.source as u32)
                + SYSCLK::CORE_DIV.val(config.core_divider as u32)
                + SYSCLK::BUS_DIV.val(config.bus_divider as u32),
        );
    }

    pub(crate) fn get_sys_clock_source(&self) -> ClockSource {
        ClockSource::from_field(self.registers.sysclk_status.read(SYSCLK_STATUS::SRC))
    }

    /* Clock sources */
    pub(crate) fn is_enabled(&self, source: ClockSource) -> bool {
        match source {
            ClockSource::HSI => self.registers.hsi_ctrl.is_set(RC_CTRL::EN),
            ClockSource::VHSI => self.registers.vhsi_ctrl.is_set(RC_CTRL::EN),
            ClockSource::HSE => self.registers.hse_ctrl.is_set(HSE_CTRL::EN),
            ClockSource::SPLL => self.registers.spll_ctrl0.is_set(SPLL_CTRL0::EN),
        }
    }

    pub(crate) fn set_enabled(&self, source: ClockSource, enable: bool) {
        let value = enable as u32;
        match source {
            ClockSource::HSI => self.registers.hsi_ctrl.modify(RC_CTRL::EN.val(value)),
            ClockSource::VHSI => self.registers.vhsi_ctrl.modify(RC_CTRL::EN.val(value)),
            ClockSource::HSE => self.registers.hse_ctrl.modify(HSE_CTRL::EN.val(value)),
            ClockSource::SPLL => self.registers.spll_ctrl0.modify(SPLL_CTRL0::EN.val(value)),
        }
    }

    pub(crate) fn set_async_dividers(
        &self,
        source: ClockSource,
        div1: AsyncDivider,
        div2: AsyncDivider,
    ) {
        let (div1, div2) = (div1 as u32, div2 as u32);
        match source {
            ClockSource::HSI => self
                .registers
                .hsi_ctrl
                .modify(RC_CTRL::DIV1.val(div1) + RC_CTRL::DIV2.val(div2)),
            ClockSource::VHSI => self
                .registers
                .vhsi_ctrl
                .modify(RC_CTRL::DIV1.val(div1) + RC_CTRL::DIV2.val(div2)),
            ClockSource::HSE => self
                .registers
                .hse_ctrl
                .modify(HSE_CTRL::DIV1.val(div1) + HSE_CTRL::DIV2.val(div2)),
            ClockSource::SPLL => self
                .registers
                .spll_ctrl0
                .modify(SPLL_CTRL0::DIV1.val(div1) + SPLL_CTRL0::DIV2.val(div2)),
        }
    }

    pub(crate) fn get_async_divider(&self, source: ClockSource, tap: AsyncTap) -> AsyncDivider {
        let value = match (source, tap) {
            (ClockSource::HSI, AsyncTap::Div1) => self.registers.hsi_ctrl.read(RC_CTRL::DIV1),
            (ClockSource::HSI, AsyncTap::Div2) => self.registers.hsi_ctrl.read(RC_CTRL::DIV2),
            (ClockSource::VHSI, AsyncTap::Div1) => self.registers.vhsi_ctrl.read(RC_CTRL::DIV1),
            (ClockSource::VHSI, AsyncTap::Div2) => self.registers.vhsi_ctrl.read(RC_CTRL::DIV2),
            (ClockSource::HSE, AsyncTap::Div1) => self.registers.hse_ctrl.read(HSE_CTRL::DIV1),
            (ClockSource::HSE, AsyncTap::Div2) => self.registers.hse_ctrl.read(HSE_CTRL::DIV2),
            (ClockSource::SPLL, AsyncTap::Div1) => {
                self.registers.spll_ctrl0.read(SPLL_CTRL0::DIV1)
            }
            (ClockSource::SPLL, AsyncTap::Div2) => {
                self.registers.spll_ctrl0.read(SPLL_CTRL0::DIV2)
            }
        };
        AsyncDivider::from_field(value)
    }

    /* HSE */
    pub(crate) fn set_hse_mode(&self, mode: HseMode) {
        match mode {
            HseMode::Crystal => self.registers.hse_ctrl.modify(HSE_CTRL::BYPASS::CLEAR),
            HseMode::Bypass => self.registers.hse_ctrl.modify(HSE_CTRL::BYPASS::SET),
        }
    }

    pub(crate) fn get_hse_mode(&self) -> HseMode {
        if self.registers.hse_ctrl.is_set(HSE_CTRL::BYPASS) {
            HseMode::Bypass
        } else {
            HseMode::Crystal
        }
    }

    pub(crate) fn set_hse_monitor(&self, enable: bool) {
        self.registers
            .hse_ctrl
            .modify(HSE_CTRL::MON_EN.val(enable as u32));
    }

    pub(crate) fn is_hse_monitor_enabled(&self) -> bool {
        self.registers.hse_ctrl.is_set(HSE_CTRL::MON_EN)
    }

    /* SPLL */
    pub(crate) fn set_spll_monitor(&self, enable: bool) {
        self.registers
            .spll_ctrl0
            .modify(SPLL_CTRL0::MON_EN.val(enable as u32));
    }

    pub(crate) fn is_spll_monitor_enabled(&self) -> bool {
        self.registers.spll_ctrl0.is_set(SPLL_CTRL0::MON_EN)
    }

    pub(crate) fn set_spll_parameters(&self, parameters: &SpllParameters) {
        match parameters.reference {
            SpllReference::HSI => self.registers.spll_ctrl0.modify(SPLL_CTRL0::REF_SEL::HSI),
            SpllReference::HSE => self.registers.spll_ctrl0.modify(SPLL_CTRL0::REF_SEL::HSE),
        }
        self.registers.spll_ctrl1.write(
            SPLL_CTRL1::PREDIV.val(parameters.prediv as u32)
                + SPLL_CTRL1::FBKDIV.val(parameters.fbkdiv as u32)
                + SPLL_CTRL1::POSDIV.val(parameters.posdiv as u32),
        );
    }

    pub(crate) fn get_spll_parameters(&self) -> SpllParameters {
        let reference = match self.registers.spll_ctrl0.read_as_enum(SPLL_CTRL0::REF_SEL) {
            Some(SPLL_CTRL0::REF_SEL::Value::HSE) => SpllReference::HSE,
            _ => SpllReference::HSI,
        };
        let prediv = match self.registers.spll_ctrl1.read(SPLL_CTRL1::PREDIV) {
            0 => SpllPrediv::DivideBy1,
            1 => SpllPrediv::DivideBy2,
            _ => SpllPrediv::DivideBy4,
        };
        SpllParameters {
            reference,
            prediv,
            fbkdiv: self.registers.spll_ctrl1.read(SPLL_CTRL1::FBKDIV) as u8,
            posdiv: self.registers.spll_ctrl1.read(SPLL_CTRL1::POSDIV) as u8,
        }
    }

    /* RTC and CLKOUT */
    pub(crate) fn set_rtc_clock_source(&self, source: RtcClockSource) {
        self.registers.rtc_ctrl.write(RTC_CTRL::SRC.val(source as u32));
    }

    pub(crate) fn get_rtc_clock_source(&self) -> RtcClockSource {
        match self.registers.rtc_ctrl.read(RTC_CTRL::SRC) {
            1 => RtcClockSource::RtcClkIn,
            2 => RtcClockSource::HseDiv2,
            _ => RtcClockSource::LSI,
        }
    }

    pub(crate) fn set_clock_out(&self, source: ClockOutSource, divider: ClockOutDivider) {
        self.registers.clkout_ctrl.write(
            CLKOUT_CTRL::SRC.val(source as u32) + CLKOUT_CTRL::DIV.val(divider as u32),
        );
    }

    pub(crate) fn get_clock_out(&self) -> (ClockOutSource, ClockOutDivider) {
        let source = match self.registers.clkout_ctrl.read(CLKOUT_CTRL::SRC) {
            1 => ClockOutSource::Core,
            2 => ClockOutSource::Bus,
            3 => ClockOutSource::HSI,
            4 => ClockOutSource::VHSI,
            5 => ClockOutSource::HSE,
            6 => ClockOutSource::SPLL,
            7 => ClockOutSource::LSI,
            8 => ClockOutSource::RTC,
            _ => ClockOutSource::Off,
        };
        let divider = match divider_field_1_to_8(self.registers.clkout_ctrl.read(CLKOUT_CTRL::DIV))
        {
            0 => ClockOutDivider::DivideBy1,
            1 => ClockOutDivider::DivideBy2,
            2 => ClockOutDivider::DivideBy3,
            3 => ClockOutDivider::DivideBy4,
            4 => ClockOutDivider::DivideBy5,
            5 => ClockOutDivider::DivideBy6,
            6 => ClockOutDivider::DivideBy7,
            _ => ClockOutDivider::DivideBy8,
        };
        (source, divider)
    }

    /* Peripherals */
    pub(crate) fn set_module_clock_gate(&self, module: PeripheralModule, enable: bool) {
        let register = &self.registers.peri_clk_en[module.register_index()];
        if enable {
            register.set(register.get() | module.bit());
        } else {
            register.set(register.get() & !module.bit());
        }
    }

    pub(crate) fn is_module_clock_enabled(&self, module: PeripheralModule) -> bool {
        self.registers.peri_clk_en[module.register_index()].get() & module.bit() != 0
    }

    // A cleared bit holds the module in reset.
    pub(crate) fn set_module_in_reset(&self, module: PeripheralModule, in_reset: bool) {
        let register = &self.registers.peri_sft_rst[module.register_index()];
        if in_reset {
            register.set(register.get() & !module.bit());
        } else {
            register.set(register.get() | module.bit());
        }
    }

    pub(crate) fn is_module_in_reset(&self, module: PeripheralModule) -> bool {
        self.registers.peri_sft_rst[module.register_index()].get() & module.bit() == 0
    }

    pub(crate) fn set_peripheral_clock(
        &self,
        clock: PeripheralClock,
        source: PeripheralClockSource,
        divider: PeripheralDivider,
    ) {
        self.registers.peri_clk_sel[clock.index()].write(
            PERI_CLK_SEL::SRC.val(source as u32) + PERI_CLK_SEL::DIV.val(divider as u32),
        );
    }

    pub(crate) fn get_peripheral_clock(
        &self,
        clock: PeripheralClock,
    ) -> (PeripheralClockSource, PeripheralDivider) {
        let register = &self.registers.peri_clk_sel[clock.index()];
        let source = match register.read(PERI_CLK_SEL::SRC) {
            1 => PeripheralClockSource::HsiDiv2,
            2 => PeripheralClockSource::VhsiDiv2,
            3 => PeripheralClockSource::HseDiv2,
            4 => PeripheralClockSource::SpllDiv2,
            _ => PeripheralClockSource::Off,
        };
        let divider = match divider_field_1_to_8(register.read(PERI_CLK_SEL::DIV)) {
            0 => PeripheralDivider::DivideBy1,
            1 => PeripheralDivider::DivideBy2,
            2 => PeripheralDivider::DivideBy3,
            3 => PeripheralDivider::DivideBy4,
            4 => PeripheralDivider::DivideBy5,
            5 => PeripheralDivider::DivideBy6,
            6 => PeripheralDivider::DivideBy7,
            _ => PeripheralDivider::DivideBy8,
        };
        (source, divider)
    }
}
