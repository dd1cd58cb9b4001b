// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Byte geometry of the guarded buffer.
//!
//! ```text
//! with canaries:    [ prefix canary | slot 0 | slot 1 | ... | slot n-1 | postfix canary ]
//! without canaries: [ slot 0 | slot 1 | ... | slot n-1 ]
//! ```
//!
//! A `Layout` is computed once per resize and shared by the canary guard, the
//! poison fill and the hash guard, so none of them derives offsets on its own.

use core::ops::Range;

use crate::canary::CANARY_SIZE;

/// Offsets of the guard regions and the slot region inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    capacity: usize,
    elem_size: usize,
    guard_size: usize,
    data_len: usize,
}

impl Layout {
    /// Describes a buffer of `capacity` slots of `elem_size` bytes each.
    ///
    /// Returns `None` if the total byte length overflows `usize`.
    pub fn new(capacity: usize, elem_size: usize, canary: bool) -> Option<Self> {
        let guard_size = if canary { CANARY_SIZE } else { 0 };
        let data_len = capacity.checked_mul(elem_size)?;
        data_len.checked_add(2 * guard_size)?;

        Some(Self {
            capacity,
            elem_size,
            guard_size,
            data_len,
        })
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total byte length of the buffer, guards included.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.data_len + 2 * self.guard_size
    }

    /// Whether the layout reserves canary regions.
    #[inline]
    pub fn has_guards(&self) -> bool {
        self.guard_size != 0
    }

    /// Byte range of the leading canary, if any.
    pub fn prefix(&self) -> Option<Range<usize>> {
        self.has_guards().then(|| 0..self.guard_size)
    }

    /// Byte range of the trailing canary, if any.
    pub fn postfix(&self) -> Option<Range<usize>> {
        let start = self.data().end;
        self.has_guards().then(|| start..start + self.guard_size)
    }

    /// Byte range covering every slot.
    #[inline]
    pub fn data(&self) -> Range<usize> {
        self.guard_size..self.guard_size + self.data_len
    }

    /// Byte range of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    #[inline]
    pub fn slot(&self, index: usize) -> Range<usize> {
        assert!(index < self.capacity, "slot {index} out of {} slots", self.capacity);

        let start = self.guard_size + index * self.elem_size;
        start..start + self.elem_size
    }
}
