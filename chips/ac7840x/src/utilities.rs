// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Helper types for memory-mapped register blocks.

use core::ops::Deref;

/// Fixed address of a register block.
///
/// Dereferencing yields the register structure placed at that address. The block lives for the
/// whole program, so handing out `&T` from a shared `StaticRef` is sound.
#[derive(Debug)]
pub struct StaticRef<T> {
    ptr: *const T,
}

impl<T> StaticRef<T> {
    /// ## Safety
    ///
    /// `ptr` must be the base address of a peripheral block of type `T` that is never
    /// deallocated and not aliased by any other Rust value.
    pub const unsafe fn new(ptr: *const T) -> StaticRef<T> {
        StaticRef { ptr }
    }
}

impl<T> Clone for StaticRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StaticRef<T> {}

impl<T> Deref for StaticRef<T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.ptr }
    }
}
