// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Frequency of any clock of the tree.
//!
//! Drivers compute their prescalers from [Clocks::get_freq]:
//!
//! ```rust,ignore
//! let uart_clock_hz = clocks.get_freq(ClockName::Peripheral(PeripheralClock::UART0))?;
//! let divisor = uart_clock_hz / (16 * baud_rate);
//! ```
//!
//! Every query walks the live mux and divider registers, so the answer always follows the last
//! reconfiguration. A stopped source resolves to 0 rather than to an error, since drivers of
//! idle peripherals may still ask for their nominal route.

use crate::chip_specific::clock_constants::{LSI_1K_FREQUENCY_HZ, LSI_FREQUENCY_HZ};
use crate::ckgen::{
    AsyncTap, ClockOutSource, ClockSource, PeripheralClock, PeripheralClockSource,
    PeripheralModule, RtcClockSource,
};
use crate::clocks::clocks::Clocks;
use crate::clocks::hardware::ClockHardware;
use crate::spm::PowerMode;
use crate::ErrorCode;

/// Clocks whose frequency can be queried
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockName {
    /// Core clock
    Core,
    /// Bus clock, derived from the core clock
    Bus,
    Hsi,
    Vhsi,
    Hse,
    Spll,
    HsiDiv1,
    HsiDiv2,
    VhsiDiv1,
    VhsiDiv2,
    HseDiv1,
    HseDiv2,
    SpllDiv1,
    SpllDiv2,
    /// 32kHz low speed internal oscillator
    Lsi,
    /// 1kHz tap of the LSI
    Lsi1k,
    Rtc,
    /// Signal on the CLKOUT pin
    ClkOut,
    Tclk0,
    Tclk1,
    Tclk2,
    /// Functional clock of a peripheral
    Peripheral(PeripheralClock),
    /// Bus clock seen by a module, 0 while its gate is closed
    Module(PeripheralModule),
}

impl<H: ClockHardware> Clocks<'_, H> {
    /// Get the frequency in Hz of `name`.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::FAIL]\): if the power mode has no system clock and `name` depends on
    /// it
    /// + [Err]\([ErrorCode::NOSUPPORT]\): if `name` is not routed to anything: a peripheral mux
    /// or the CLKOUT pin switched off
    pub fn get_freq(&self, name: ClockName) -> Result<u32, ErrorCode> {
        match name {
            ClockName::Core => self.core_frequency_hz(),
            ClockName::Bus => self.bus_frequency_hz(),
            ClockName::Hsi => Ok(self.get_source_frequency_hz(ClockSource::HSI)),
            ClockName::Vhsi => Ok(self.get_source_frequency_hz(ClockSource::VHSI)),
            ClockName::Hse => Ok(self.get_source_frequency_hz(ClockSource::HSE)),
            ClockName::Spll => Ok(self.get_source_frequency_hz(ClockSource::SPLL)),
            ClockName::HsiDiv1 => Ok(self.tap_frequency_hz(ClockSource::HSI, AsyncTap::Div1)),
            ClockName::HsiDiv2 => Ok(self.tap_frequency_hz(ClockSource::HSI, AsyncTap::Div2)),
            ClockName::VhsiDiv1 => Ok(self.tap_frequency_hz(ClockSource::VHSI, AsyncTap::Div1)),
            ClockName::VhsiDiv2 => Ok(self.tap_frequency_hz(ClockSource::VHSI, AsyncTap::Div2)),
            ClockName::HseDiv1 => Ok(self.tap_frequency_hz(ClockSource::HSE, AsyncTap::Div1)),
            ClockName::HseDiv2 => Ok(self.tap_frequency_hz(ClockSource::HSE, AsyncTap::Div2)),
            ClockName::SpllDiv1 => Ok(self.tap_frequency_hz(ClockSource::SPLL, AsyncTap::Div1)),
            ClockName::SpllDiv2 => Ok(self.tap_frequency_hz(ClockSource::SPLL, AsyncTap::Div2)),
            ClockName::Lsi => Ok(LSI_FREQUENCY_HZ),
            ClockName::Lsi1k => Ok(LSI_1K_FREQUENCY_HZ),
            ClockName::Rtc => Ok(self.rtc_frequency_hz()),
            ClockName::ClkOut => self.clock_out_frequency_hz(),
            ClockName::Tclk0 => Ok(self.tclk_frequencies_hz[0].get()),
            ClockName::Tclk1 => Ok(self.tclk_frequencies_hz[1].get()),
            ClockName::Tclk2 => Ok(self.tclk_frequencies_hz[2].get()),
            ClockName::Peripheral(clock) => self.peripheral_frequency_hz(clock),
            ClockName::Module(module) => {
                if self.hw.is_module_clock_enabled(module) {
                    self.bus_frequency_hz()
                } else {
                    Ok(0)
                }
            }
        }
    }

    fn core_frequency_hz(&self) -> Result<u32, ErrorCode> {
        self.get_power_mode()
            .and_then(PowerMode::sys_clock_bank)
            .ok_or(ErrorCode::FAIL)?;
        Ok(self.get_core_frequency_hz())
    }

    fn bus_frequency_hz(&self) -> Result<u32, ErrorCode> {
        let bank = self
            .get_power_mode()
            .and_then(PowerMode::sys_clock_bank)
            .ok_or(ErrorCode::FAIL)?;
        let divider = self.hw.get_sys_clock_config(bank).bus_divider;
        Ok(self.get_core_frequency_hz() / u32::from(divider))
    }

    fn tap_frequency_hz(&self, source: ClockSource, tap: AsyncTap) -> u32 {
        match self.hw.get_async_divider(source, tap).divisor() {
            Some(divisor) => self.get_source_frequency_hz(source) / divisor,
            None => 0,
        }
    }

    fn rtc_frequency_hz(&self) -> u32 {
        match self.hw.get_rtc_clock_source() {
            RtcClockSource::LSI => LSI_FREQUENCY_HZ,
            RtcClockSource::RtcClkIn => self.rtc_clkin_frequency_hz.get(),
            RtcClockSource::HseDiv2 => self.tap_frequency_hz(ClockSource::HSE, AsyncTap::Div2),
        }
    }

    fn clock_out_frequency_hz(&self) -> Result<u32, ErrorCode> {
        let (source, divider) = self.hw.get_clock_out();
        let source_hz = match source {
            ClockOutSource::Off => return Err(ErrorCode::NOSUPPORT),
            ClockOutSource::Core => self.core_frequency_hz()?,
            ClockOutSource::Bus => self.bus_frequency_hz()?,
            ClockOutSource::HSI => self.get_source_frequency_hz(ClockSource::HSI),
            ClockOutSource::VHSI => self.get_source_frequency_hz(ClockSource::VHSI),
            ClockOutSource::HSE => self.get_source_frequency_hz(ClockSource::HSE),
            ClockOutSource::SPLL => self.get_source_frequency_hz(ClockSource::SPLL),
            ClockOutSource::LSI => LSI_FREQUENCY_HZ,
            ClockOutSource::RTC => self.rtc_frequency_hz(),
        };
        Ok(source_hz / u32::from(divider))
    }

    fn peripheral_frequency_hz(&self, clock: PeripheralClock) -> Result<u32, ErrorCode> {
        let (source, divider) = self.hw.get_peripheral_clock(clock);
        let tap_hz = match source {
            PeripheralClockSource::Off => return Err(ErrorCode::NOSUPPORT),
            PeripheralClockSource::HsiDiv2 => {
                self.tap_frequency_hz(ClockSource::HSI, AsyncTap::Div2)
            }
            PeripheralClockSource::VhsiDiv2 => {
                self.tap_frequency_hz(ClockSource::VHSI, AsyncTap::Div2)
            }
            PeripheralClockSource::HseDiv2 => {
                self.tap_frequency_hz(ClockSource::HSE, AsyncTap::Div2)
            }
            PeripheralClockSource::SpllDiv2 => {
                self.tap_frequency_hz(ClockSource::SPLL, AsyncTap::Div2)
            }
        };
        Ok(tap_hz / u32::from(divider))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ckgen::{
        AsyncDivider, ClockOutDivider, PeripheralDivider, SpllReference, SysClockDivider,
        SystemClockConfig,
    };
    use crate::clocks::config::{
        ClockFeatures, HseConfig, HsiConfig, ModuleClockConfig, SimConfig, SpllConfig,
    };
    use crate::clocks::sim::SimulatedHardware;

    #[test]
    fn boot_core_and_bus_run_from_hsi() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());

        assert_eq!(Ok(8_000_000), clocks.get_freq(ClockName::Core));
        assert_eq!(Ok(8_000_000), clocks.get_freq(ClockName::Bus));
        assert_eq!(Ok(48_000_000), clocks.get_freq(ClockName::Vhsi));
        assert_eq!(Ok(0), clocks.get_freq(ClockName::Hse));
        assert_eq!(Ok(0), clocks.get_freq(ClockName::Spll));
    }

    #[test]
    fn dividers_of_current_mode_apply() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let config = SystemClockConfig {
            source: ClockSource::VHSI,
            core_divider: SysClockDivider::DivideBy2,
            bus_divider: SysClockDivider::DivideBy3,
        };

        assert_eq!(Ok(()), clocks.transition_system_clock(&config));
        assert_eq!(Ok(24_000_000), clocks.get_freq(ClockName::Core));
        assert_eq!(Ok(8_000_000), clocks.get_freq(ClockName::Bus));
    }

    #[test]
    fn stop_mode_has_no_core_clock() {
        let hw = SimulatedHardware::new();
        hw.set_power_mode(Some(PowerMode::VLPS));
        let clocks = Clocks::new(&hw, ClockFeatures::default());

        assert_eq!(Err(ErrorCode::FAIL), clocks.get_freq(ClockName::Core));
        assert_eq!(Err(ErrorCode::FAIL), clocks.get_freq(ClockName::Bus));
        assert_eq!(Ok(8_000_000), clocks.get_freq(ClockName::Hsi));
    }

    #[test]
    fn async_taps_follow_source_and_divider() {
        let hw = SimulatedHardware::new();
        hw.force_live_source(ClockSource::VHSI);
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let config = HsiConfig {
            enable: true,
            div1: AsyncDivider::DivideBy2,
            div2: AsyncDivider::Off,
        };
        assert_eq!(Ok(()), clocks.hsi.configure(true, Some(&config)));

        assert_eq!(Ok(4_000_000), clocks.get_freq(ClockName::HsiDiv1));
        assert_eq!(Ok(0), clocks.get_freq(ClockName::HsiDiv2));

        assert_eq!(Ok(()), clocks.configure_spll(true, None));
        assert_eq!(Ok(64_000_000), clocks.get_freq(ClockName::SpllDiv1));
        assert_eq!(Ok(32_000_000), clocks.get_freq(ClockName::SpllDiv2));
    }

    #[test]
    fn stopped_source_reads_zero_on_every_tap() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        assert_eq!(Ok(()), clocks.configure_spll(true, None));
        assert_eq!(Ok(()), clocks.configure_spll(false, None));

        assert_eq!(Ok(0), clocks.get_freq(ClockName::Spll));
        assert_eq!(Ok(0), clocks.get_freq(ClockName::SpllDiv1));
        assert_eq!(Ok(0), clocks.get_freq(ClockName::SpllDiv2));
    }

    #[test]
    fn peripheral_clock_resolves_through_tap() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let config = HseConfig {
            div2: AsyncDivider::DivideBy2,
            ..HseConfig::DEFAULT
        };
        assert_eq!(Ok(()), clocks.hse.configure(true, Some(&config)));

        let uart = ClockName::Peripheral(PeripheralClock::UART1);
        assert_eq!(Err(ErrorCode::NOSUPPORT), clocks.get_freq(uart));

        clocks.set_module_clock(
            PeripheralClock::UART1,
            &ModuleClockConfig {
                source: PeripheralClockSource::HseDiv2,
                divider: PeripheralDivider::DivideBy4,
            },
        );
        assert_eq!(Ok(1_000_000), clocks.get_freq(uart));

        // The route survives the source being stopped
        assert_eq!(Ok(()), clocks.hse.configure(false, None));
        assert_eq!(Ok(0), clocks.get_freq(uart));
    }

    #[test]
    fn module_sees_bus_clock_when_gated_on() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let dma = ClockName::Module(PeripheralModule::DMA0);

        assert_eq!(Ok(0), clocks.get_freq(dma));
        clocks.enable_module(PeripheralModule::DMA0, true);
        assert_eq!(Ok(8_000_000), clocks.get_freq(dma));
    }

    #[test]
    fn sim_taps_follow_configuration() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());

        assert_eq!(Ok(32_000), clocks.get_freq(ClockName::Lsi));
        assert_eq!(Ok(1_000), clocks.get_freq(ClockName::Lsi1k));
        assert_eq!(Ok(32_000), clocks.get_freq(ClockName::Rtc));
        assert_eq!(Err(ErrorCode::NOSUPPORT), clocks.get_freq(ClockName::ClkOut));

        clocks.configure_sim(&SimConfig {
            rtc_source: RtcClockSource::RtcClkIn,
            clock_out: ClockOutSource::Core,
            clock_out_divider: ClockOutDivider::DivideBy4,
            rtc_clkin_frequency_hz: 32_768,
            tclk_frequencies_hz: [1_000_000, 0, 20_000_000],
        });

        assert_eq!(Ok(32_768), clocks.get_freq(ClockName::Rtc));
        assert_eq!(Ok(2_000_000), clocks.get_freq(ClockName::ClkOut));
        assert_eq!(Ok(1_000_000), clocks.get_freq(ClockName::Tclk0));
        assert_eq!(Ok(0), clocks.get_freq(ClockName::Tclk1));
        assert_eq!(Ok(20_000_000), clocks.get_freq(ClockName::Tclk2));
    }

    #[test]
    fn rtc_from_hse_tap() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let config = HseConfig {
            frequency_hz: 16_000_000,
            div2: AsyncDivider::DivideBy64,
            ..HseConfig::DEFAULT
        };
        assert_eq!(Ok(()), clocks.hse.configure(true, Some(&config)));
        clocks.configure_sim(&SimConfig {
            rtc_source: RtcClockSource::HseDiv2,
            clock_out: ClockOutSource::RTC,
            ..SimConfig::DEFAULT
        });

        assert_eq!(Ok(250_000), clocks.get_freq(ClockName::Rtc));
        assert_eq!(Ok(250_000), clocks.get_freq(ClockName::ClkOut));
    }

    #[test]
    fn spll_frequency_follows_reference() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        assert_eq!(Ok(()), clocks.hse.configure(true, Some(&HseConfig::DEFAULT)));
        let config = SpllConfig {
            reference: SpllReference::HSE,
            fbkdiv: 90,
            posdiv: 3,
            ..SpllConfig::DEFAULT
        };
        assert_eq!(Ok(()), clocks.configure_spll(true, Some(&config)));

        assert_eq!(Ok(120_000_000), clocks.get_freq(ClockName::Spll));
    }
}
