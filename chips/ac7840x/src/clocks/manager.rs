// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Clock configuration manager.
//!
//! The manager owns the board table of [ClockConfig]s and a list of drivers that want to hear
//! about clock changes. Switching to another configuration is a two-phase exchange:
//!
//! 1. every interested driver receives a [NotifyType::Before] notification and may refuse the
//!    change, for example because a transfer is in flight
//! 2. the clock tree is reconfigured
//! 3. every interested driver receives a [NotifyType::After] notification so it can recompute
//!    its prescalers
//!
//! If the reconfiguration fails, drivers receive [NotifyType::Recover] instead, in reverse
//! registration order, and are expected to restore the settings matching the old clocks.
//!
//! # Usage
//!
//! ```rust,ignore
//! static CALLBACKS: [ClockCallback; 1] = [ClockCallback {
//!     client: &UART_DRIVER,
//!     kind: CallbackType::BeforeAfter,
//! }];
//!
//! let manager = ClockManager::new(&peripherals.clocks, &BOARD_CONFIGS, &CALLBACKS);
//! manager.start()?;
//!
//! // Later, drop to the low power configuration unless a driver objects
//! match manager.update_configuration(1, ClockPolicy::Agreement) {
//!     Err(ErrorCode::NOTIFY_BEFORE) => debug!("vetoed by {:?}", manager.get_error_callback()),
//!     result => result?,
//! }
//! ```
//!
//! The whole exchange runs inside a critical section.

use core::cell::Cell;

use crate::clocks::clocks::Clocks;
use crate::clocks::config::ClockConfig;
use crate::clocks::hardware::ClockHardware;
use crate::ErrorCode;

use log::{debug, warn};

/// How driver refusals are handled
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockPolicy {
    /// The first refusal cancels the switch
    Agreement,
    /// Refusals are recorded, the switch happens anyway
    Forcible,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotifyType {
    /// The clocks are about to change
    Before,
    /// The clocks changed
    After,
    /// The switch was cancelled or failed, the previous clocks are still in use
    Recover,
}

/// Notifications a callback subscribes to. [NotifyType::Recover] is delivered to every callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallbackType {
    Before,
    After,
    BeforeAfter,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClockNotification {
    /// Index of the configuration being switched to
    pub target_config_index: usize,
    pub policy: ClockPolicy,
    pub notify_type: NotifyType,
}

/// Implemented by drivers that depend on the clock tree
pub trait ClockNotifyClient {
    /// Returning an error from a [NotifyType::Before] notification refuses the change under
    /// [ClockPolicy::Agreement]. Errors from [NotifyType::Recover] are ignored.
    fn clock_notify(&self, notification: &ClockNotification) -> Result<(), ErrorCode>;
}

#[derive(Copy, Clone)]
pub struct ClockCallback<'a> {
    pub client: &'a dyn ClockNotifyClient,
    pub kind: CallbackType,
}

impl ClockCallback<'_> {
    fn wants_before(&self) -> bool {
        self.kind != CallbackType::After
    }

    fn wants_after(&self) -> bool {
        self.kind != CallbackType::Before
    }
}

/// Phase of [ClockManager::update_configuration]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ManagerState {
    Idle,
    NotifyingBefore,
    Switching,
    NotifyingAfter,
    Recovering,
}

pub struct ClockManager<'a, H: ClockHardware> {
    clocks: &'a Clocks<'a, H>,
    configs: &'a [ClockConfig<'a>],
    callbacks: &'a [ClockCallback<'a>],
    current_config: Cell<Option<usize>>,
    error_callback: Cell<Option<usize>>,
    state: Cell<ManagerState>,
}

impl<'a, H: ClockHardware> ClockManager<'a, H> {
    pub fn new(
        clocks: &'a Clocks<'a, H>,
        configs: &'a [ClockConfig<'a>],
        callbacks: &'a [ClockCallback<'a>],
    ) -> Self {
        debug_assert!(!configs.is_empty(), "empty clock configuration table");
        Self {
            clocks,
            configs,
            callbacks,
            current_config: Cell::new(None),
            error_callback: Cell::new(None),
            state: Cell::new(ManagerState::Idle),
        }
    }

    /// Apply the first configuration of the table
    pub fn start(&self) -> Result<(), ErrorCode> {
        self.update_configuration(0, ClockPolicy::Agreement)
    }

    /// Index of the last configuration switched to, [None] before the first switch
    pub fn get_current_configuration(&self) -> Option<usize> {
        self.current_config.get()
    }

    /// Index in the callback table of the last callback that failed during the last switch
    pub fn get_error_callback(&self) -> Option<usize> {
        self.error_callback.get()
    }

    pub fn get_state(&self) -> ManagerState {
        self.state.get()
    }

    /// Switch the clock tree to configuration `index`.
    ///
    /// The target is recorded as the current configuration once the hardware switch has been
    /// attempted, whatever its outcome.
    ///
    /// When a callback refuses under [ClockPolicy::Agreement], [NotifyType::Recover] goes in
    /// reverse order to the callbacks that accepted [NotifyType::Before] ahead of it. The refusing
    /// callback and the [CallbackType::After] ones are not notified.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): if `index` is not in the table
    /// + [Err]\([ErrorCode::NOTIFY_BEFORE]\): a callback refused the change under
    /// [ClockPolicy::Agreement]. The clocks were not touched.
    /// + [Err]\([ErrorCode::NOTIFY_AFTER]\): a callback failed to adapt to the new clocks under
    /// [ClockPolicy::Agreement]. The remaining callbacks were not notified.
    /// + any error of [Clocks::set_configuration]. Every callback was sent
    /// [NotifyType::Recover].
    pub fn update_configuration(&self, index: usize, policy: ClockPolicy) -> Result<(), ErrorCode> {
        let config = self.configs.get(index).ok_or(ErrorCode::INVAL)?;

        critical_section::with(|_| {
            let result = self.run_update(index, config, policy);
            self.state.set(ManagerState::Idle);
            result
        })
    }

    fn notify(&self, position: usize, notification: &ClockNotification) -> Result<(), ErrorCode> {
        let result = self.callbacks[position].client.clock_notify(notification);
        if result.is_err() {
            self.error_callback.set(Some(position));
        }
        result
    }

    fn run_update(
        &self,
        index: usize,
        config: &ClockConfig,
        policy: ClockPolicy,
    ) -> Result<(), ErrorCode> {
        let mut notification = ClockNotification {
            target_config_index: index,
            policy,
            notify_type: NotifyType::Before,
        };
        self.error_callback.set(None);

        self.state.set(ManagerState::NotifyingBefore);
        for (position, callback) in self.callbacks.iter().enumerate() {
            if !callback.wants_before() {
                continue;
            }
            if self.notify(position, &notification).is_err() && policy == ClockPolicy::Agreement
            {
                warn!("Clock configuration {} refused by callback {}", index, position);
                self.state.set(ManagerState::Recovering);
                notification.notify_type = NotifyType::Recover;
                for callback in self.callbacks[..position]
                    .iter()
                    .rev()
                    .filter(|callback| callback.wants_before())
                {
                    let _ = callback.client.clock_notify(&notification);
                }
                return Err(ErrorCode::NOTIFY_BEFORE);
            }
        }

        self.state.set(ManagerState::Switching);
        let switched = self.clocks.set_configuration(config);
        self.current_config.set(Some(index));

        if let Err(error) = switched {
            warn!("Clock configuration {} failed: {:?}", index, error);
            self.state.set(ManagerState::Recovering);
            notification.notify_type = NotifyType::Recover;
            for callback in self.callbacks.iter().rev() {
                let _ = callback.client.clock_notify(&notification);
            }
            return Err(error);
        }

        self.state.set(ManagerState::NotifyingAfter);
        notification.notify_type = NotifyType::After;
        for (position, callback) in self.callbacks.iter().enumerate() {
            if !callback.wants_after() {
                continue;
            }
            if self.notify(position, &notification).is_err() && policy == ClockPolicy::Agreement
            {
                warn!("Callback {} failed after clock configuration {}", position, index);
                return Err(ErrorCode::NOTIFY_AFTER);
            }
        }

        debug!("Clock configuration {} active", index);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ckgen::{ClockSource, SysClockDivider, SystemClockConfig};
    use crate::clocks::config::{CkgenConfig, ClockFeatures, SimConfig};
    use crate::clocks::freq::ClockName;
    use crate::clocks::sim::SimulatedHardware;
    use core::cell::RefCell;
    use proptest::prelude::*;
    use std::vec::Vec;

    struct Recorder<'a> {
        id: usize,
        fail_on: Option<NotifyType>,
        log: &'a RefCell<Vec<(usize, NotifyType)>>,
    }

    impl ClockNotifyClient for Recorder<'_> {
        fn clock_notify(&self, notification: &ClockNotification) -> Result<(), ErrorCode> {
            self.log
                .borrow_mut()
                .push((self.id, notification.notify_type));
            if self.fail_on == Some(notification.notify_type) {
                Err(ErrorCode::BUSY)
            } else {
                Ok(())
            }
        }
    }

    fn make_recorders<'a>(
        count: usize,
        failing: &[usize],
        fail_on: NotifyType,
        log: &'a RefCell<Vec<(usize, NotifyType)>>,
    ) -> Vec<Recorder<'a>> {
        (0..count)
            .map(|id| Recorder {
                id,
                fail_on: failing.contains(&id).then_some(fail_on),
                log,
            })
            .collect()
    }

    fn subscribe<'a>(recorders: &'a [Recorder<'a>], kind: CallbackType) -> Vec<ClockCallback<'a>> {
        recorders
            .iter()
            .map(|recorder| ClockCallback {
                client: recorder,
                kind,
            })
            .collect()
    }

    const ON_VHSI: ClockConfig = ClockConfig {
        ckgen: CkgenConfig::DEFAULT,
        sim: SimConfig::DEFAULT,
        peripherals: &[],
    };

    const ON_SPLL: ClockConfig = ClockConfig {
        ckgen: CkgenConfig {
            run: SystemClockConfig {
                source: ClockSource::SPLL,
                core_divider: SysClockDivider::DivideBy1,
                bus_divider: SysClockDivider::DivideBy2,
            },
            ..CkgenConfig::DEFAULT
        },
        sim: SimConfig::DEFAULT,
        peripherals: &[],
    };

    // 64MHz bus, over the 60MHz limit
    const OVERCLOCKED: ClockConfig = ClockConfig {
        ckgen: CkgenConfig {
            run: SystemClockConfig {
                source: ClockSource::SPLL,
                core_divider: SysClockDivider::DivideBy1,
                bus_divider: SysClockDivider::DivideBy1,
            },
            ..CkgenConfig::DEFAULT
        },
        sim: SimConfig::DEFAULT,
        peripherals: &[],
    };

    const CONFIGS: [ClockConfig; 3] = [ON_VHSI, ON_SPLL, OVERCLOCKED];

    #[test]
    fn start_applies_first_configuration() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let log = RefCell::new(Vec::new());
        let recorders = make_recorders(2, &[], NotifyType::Before, &log);
        let callbacks = subscribe(&recorders, CallbackType::BeforeAfter);
        let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);
        assert_eq!(None, manager.get_current_configuration());

        assert_eq!(Ok(()), manager.start());
        assert_eq!(Some(0), manager.get_current_configuration());
        assert_eq!(None, manager.get_error_callback());
        assert_eq!(ManagerState::Idle, manager.get_state());
        assert_eq!(ClockSource::VHSI, clocks.get_system_clock_source());
        assert_eq!(
            *log.borrow(),
            vec![
                (0, NotifyType::Before),
                (1, NotifyType::Before),
                (0, NotifyType::After),
                (1, NotifyType::After),
            ]
        );
    }

    #[test]
    fn unknown_index_is_rejected() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let manager = ClockManager::new(&clocks, &CONFIGS, &[]);

        assert_eq!(
            Err(ErrorCode::INVAL),
            manager.update_configuration(3, ClockPolicy::Forcible)
        );
        assert!(hw.events().is_empty());
        assert_eq!(None, manager.get_current_configuration());
    }

    #[test]
    fn callback_kinds_filter_notifications() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let log = RefCell::new(Vec::new());
        let recorders = make_recorders(3, &[], NotifyType::Before, &log);
        let callbacks = [
            ClockCallback {
                client: &recorders[0],
                kind: CallbackType::Before,
            },
            ClockCallback {
                client: &recorders[1],
                kind: CallbackType::After,
            },
            ClockCallback {
                client: &recorders[2],
                kind: CallbackType::BeforeAfter,
            },
        ];
        let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

        assert_eq!(Ok(()), manager.update_configuration(1, ClockPolicy::Agreement));
        assert_eq!(
            *log.borrow(),
            vec![
                (0, NotifyType::Before),
                (2, NotifyType::Before),
                (1, NotifyType::After),
                (2, NotifyType::After),
            ]
        );
        assert_eq!(Ok(64_000_000), clocks.get_freq(ClockName::Core));
    }

    #[test]
    fn refusal_recovers_earlier_callbacks_only() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let log = RefCell::new(Vec::new());
        let recorders = make_recorders(4, &[2], NotifyType::Before, &log);
        let callbacks = subscribe(&recorders, CallbackType::BeforeAfter);
        let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

        assert_eq!(
            Err(ErrorCode::NOTIFY_BEFORE),
            manager.update_configuration(1, ClockPolicy::Agreement)
        );
        assert_eq!(
            *log.borrow(),
            vec![
                (0, NotifyType::Before),
                (1, NotifyType::Before),
                (2, NotifyType::Before),
                (1, NotifyType::Recover),
                (0, NotifyType::Recover),
            ]
        );
        assert_eq!(Some(2), manager.get_error_callback());
        assert_eq!(None, manager.get_current_configuration());
        assert_eq!(ManagerState::Idle, manager.get_state());
        assert!(hw.events().is_empty());
    }

    #[test]
    fn after_failure_stops_notifications_under_agreement() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let log = RefCell::new(Vec::new());
        let recorders = make_recorders(3, &[1], NotifyType::After, &log);
        let callbacks = subscribe(&recorders, CallbackType::BeforeAfter);
        let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

        assert_eq!(
            Err(ErrorCode::NOTIFY_AFTER),
            manager.update_configuration(1, ClockPolicy::Agreement)
        );
        assert_eq!(
            *log.borrow(),
            vec![
                (0, NotifyType::Before),
                (1, NotifyType::Before),
                (2, NotifyType::Before),
                (0, NotifyType::After),
                (1, NotifyType::After),
            ]
        );
        assert_eq!(Some(1), manager.get_error_callback());
        // The switch itself went through
        assert_eq!(Some(1), manager.get_current_configuration());
        assert_eq!(ClockSource::SPLL, clocks.get_system_clock_source());
    }

    #[test]
    fn failed_switch_recovers_every_callback_in_reverse() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let log = RefCell::new(Vec::new());
        let recorders = make_recorders(3, &[0], NotifyType::Recover, &log);
        let callbacks = [
            ClockCallback {
                client: &recorders[0],
                kind: CallbackType::BeforeAfter,
            },
            ClockCallback {
                client: &recorders[1],
                kind: CallbackType::After,
            },
            ClockCallback {
                client: &recorders[2],
                kind: CallbackType::Before,
            },
        ];
        let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

        assert_eq!(
            Err(ErrorCode::FAIL),
            manager.update_configuration(2, ClockPolicy::Agreement)
        );
        assert_eq!(
            *log.borrow(),
            vec![
                (0, NotifyType::Before),
                (2, NotifyType::Before),
                (2, NotifyType::Recover),
                (1, NotifyType::Recover),
                (0, NotifyType::Recover),
            ]
        );
        // Recorded whatever the outcome
        assert_eq!(Some(2), manager.get_current_configuration());
        assert_eq!(None, manager.get_error_callback());
        assert_eq!(ManagerState::Idle, manager.get_state());
    }

    #[test]
    fn forcible_switch_reports_last_refusal() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let log = RefCell::new(Vec::new());
        let recorders = make_recorders(4, &[0, 2], NotifyType::Before, &log);
        let callbacks = subscribe(&recorders, CallbackType::BeforeAfter);
        let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

        assert_eq!(Ok(()), manager.update_configuration(1, ClockPolicy::Forcible));
        assert_eq!(Some(2), manager.get_error_callback());
        assert_eq!(Some(1), manager.get_current_configuration());
        assert_eq!(ClockSource::SPLL, clocks.get_system_clock_source());
    }

    #[test]
    fn forcible_after_failure_notifies_everyone() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let log = RefCell::new(Vec::new());
        let recorders = make_recorders(3, &[0, 1], NotifyType::After, &log);
        let callbacks = subscribe(&recorders, CallbackType::BeforeAfter);
        let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

        assert_eq!(Ok(()), manager.update_configuration(1, ClockPolicy::Forcible));
        assert_eq!(
            *log.borrow(),
            vec![
                (0, NotifyType::Before),
                (1, NotifyType::Before),
                (2, NotifyType::Before),
                (0, NotifyType::After),
                (1, NotifyType::After),
                (2, NotifyType::After),
            ]
        );
        assert_eq!(Some(1), manager.get_error_callback());
        assert_eq!(Some(1), manager.get_current_configuration());
        assert_eq!(ManagerState::Idle, manager.get_state());
        assert_eq!(ClockSource::SPLL, clocks.get_system_clock_source());
    }

    #[test]
    fn forcible_failed_switch_recovers_everyone() {
        let hw = SimulatedHardware::new();
        let clocks = Clocks::new(&hw, ClockFeatures::default());
        let log = RefCell::new(Vec::new());
        let recorders = make_recorders(3, &[1], NotifyType::Before, &log);
        let callbacks = subscribe(&recorders, CallbackType::BeforeAfter);
        let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

        assert_eq!(
            Err(ErrorCode::FAIL),
            manager.update_configuration(2, ClockPolicy::Forcible)
        );
        assert_eq!(
            *log.borrow(),
            vec![
                (0, NotifyType::Before),
                (1, NotifyType::Before),
                (2, NotifyType::Before),
                (2, NotifyType::Recover),
                (1, NotifyType::Recover),
                (0, NotifyType::Recover),
            ]
        );
        assert_eq!(Some(1), manager.get_error_callback());
        assert_eq!(Some(2), manager.get_current_configuration());
        assert_eq!(ManagerState::Idle, manager.get_state());
    }

    proptest! {
        #[test]
        fn agreement_stops_at_first_refusal(count in 1usize..6, refusing in 0usize..6) {
            let refusing = refusing % count;
            let hw = SimulatedHardware::new();
            let clocks = Clocks::new(&hw, ClockFeatures::default());
            let log = RefCell::new(Vec::new());
            let recorders = make_recorders(count, &[refusing], NotifyType::Before, &log);
            let callbacks = subscribe(&recorders, CallbackType::BeforeAfter);
            let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

            prop_assert_eq!(
                Err(ErrorCode::NOTIFY_BEFORE),
                manager.update_configuration(1, ClockPolicy::Agreement)
            );
            let before: Vec<usize> = log
                .borrow()
                .iter()
                .filter(|(_, kind)| *kind == NotifyType::Before)
                .map(|(id, _)| *id)
                .collect();
            prop_assert_eq!(before, (0..=refusing).collect::<Vec<_>>());
            prop_assert!(log.borrow().iter().all(|(id, _)| *id <= refusing));
            prop_assert_eq!(Some(refusing), manager.get_error_callback());
            prop_assert_eq!(None, manager.get_current_configuration());
            prop_assert!(hw.events().is_empty());
        }

        #[test]
        fn forcible_notifies_everyone(count in 1usize..6, refusals in proptest::collection::vec(any::<bool>(), 6)) {
            let failing: Vec<usize> = (0..count).filter(|id| refusals[*id]).collect();
            let hw = SimulatedHardware::new();
            let clocks = Clocks::new(&hw, ClockFeatures::default());
            let log = RefCell::new(Vec::new());
            let recorders = make_recorders(count, &failing, NotifyType::Before, &log);
            let callbacks = subscribe(&recorders, CallbackType::BeforeAfter);
            let manager = ClockManager::new(&clocks, &CONFIGS, &callbacks);

            prop_assert_eq!(Ok(()), manager.update_configuration(1, ClockPolicy::Forcible));
            let expected: Vec<(usize, NotifyType)> = (0..count)
                .map(|id| (id, NotifyType::Before))
                .chain((0..count).map(|id| (id, NotifyType::After)))
                .collect();
            prop_assert_eq!(&*log.borrow(), &expected);
            prop_assert_eq!(failing.last().copied(), manager.get_error_callback());
            prop_assert_eq!(ClockSource::SPLL, clocks.get_system_clock_source());
        }
    }
}
