// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Validity bitmask produced by [`GuardStack::check`](crate::GuardStack::check).

use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Set of detected violations, one bit per kind. Bit 0 is reserved.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Condition: u32 {
        /// Capacity is zero on a constructed stack.
        const INVALID_CAPACITY = 1 << 1;
        /// Pop was attempted on an empty stack.
        const EMPTY_STACK = 1 << 2;
        /// Size exceeds capacity.
        const INVALID_SIZE = 1 << 3;
        /// Buffer is missing or its geometry disagrees with the capacity.
        const INVALID_DATA = 1 << 4;

        /// A guard around the slot region was overwritten.
        const DATA_CANARY = 1 << 5;
        /// A guard inside the stack record was overwritten.
        const STACK_CANARY = 1 << 6;

        /// No hash function is installed.
        const INVALID_HASH_FUNC = 1 << 7;
        /// Buffer digest differs from the stored one.
        const DATA_HASH_MISMATCH = 1 << 8;
        /// Record digest differs from the stored one.
        const STACK_HASH_MISMATCH = 1 << 9;

        /// An unoccupied slot no longer holds the poison sentinel.
        const POISON_VIOLATION = 1 << 10;
    }
}

impl Condition {
    /// Nothing is violated.
    pub const OK: Self = Self::empty();

    /// Returns `true` when no violation is set.
    #[inline]
    pub const fn is_ok(self) -> bool {
        self.is_empty()
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({:#06x}: {self})", self.bits())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("OK");
        }

        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }

        Ok(())
    }
}
