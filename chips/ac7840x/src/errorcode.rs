// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Standard error enum for clock operations

/// Errors returned by the clock engine.
///
/// The shared variants keep the numbering of the kernel `ErrorCode` so a value can cross the
/// system call boundary unchanged. The last three are specific to clock switching.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 0,
    /// Underlying resource is in use (e.g. the live system clock source)
    BUSY = 1,
    /// An invalid parameter was passed
    INVAL = 5,
    /// Clock name or route is unsupported
    NOSUPPORT = 9,
    /// A ready flag or the system clock mux did not settle in time
    TIMEOUT = 13,
    /// A callback refused the BEFORE notification of a configuration change
    NOTIFY_BEFORE = 14,
    /// A callback failed on the AFTER notification of a configuration change
    NOTIFY_AFTER = 15,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}
