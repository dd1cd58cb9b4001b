// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Growth and shrink policy, and buffer reallocation.

use core::panic::Location;

use crate::canary;
use crate::element::Element;
use crate::error::StackError;
use crate::layout::Layout;
use crate::poison;
use crate::stack::GuardStack;

/// Default capacity floor.
pub const MIN_CAPACITY: usize = 16;

/// Capacity multiplier applied when a push finds the stack full.
pub const GROWTH_FACTOR: usize = 2;

/// Capacity divisor applied when a pop leaves the stack sparse.
pub const SHRINK_FACTOR: usize = 2;

/// A pop shrinks once `size <= capacity / SHRINK_THRESHOLD`.
pub const SHRINK_THRESHOLD: usize = 4;

/// Capacity after growing a full stack.
#[inline]
pub fn grown(capacity: usize) -> usize {
    capacity.saturating_mul(GROWTH_FACTOR)
}

/// Capacity to shrink to after a pop, or `None` if the stack keeps its
/// current capacity.
pub fn shrink_target(size: usize, capacity: usize, min_capacity: usize) -> Option<usize> {
    if size > capacity / SHRINK_THRESHOLD {
        return None;
    }

    let target = (capacity / SHRINK_FACTOR).max(min_capacity);
    (target < capacity).then_some(target)
}

/// Allocates a zero-filled buffer of `len` bytes, or `None` if the
/// allocator refuses.
pub(crate) fn allocate(len: usize) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).ok()?;
    buf.resize(len, 0);

    Some(buf)
}

impl<T: Element> GuardStack<T> {
    /// Moves the buffer to a new slot count, at least the configured minimum.
    ///
    /// Slots in `[old_capacity, new_capacity)` are poisoned and the trailing
    /// guard is rewritten at its new offset. If the allocation fails the
    /// stack is torn down and `AllocateMemory` is returned.
    pub(crate) fn resize(
        &mut self,
        requested: usize,
        caller: &'static Location<'static>,
    ) -> Result<(), StackError> {
        let new_capacity = requested.max(self.config.min_capacity());
        debug_assert!(new_capacity >= self.size);

        let Some(layout) = Layout::new(new_capacity, T::SIZE, self.config.protection.canary) else {
            return Err(self.abandon(new_capacity, caller));
        };

        #[cfg(any(test, feature = "test-utils"))]
        if self.take_resize_failure() {
            return Err(self.abandon(new_capacity, caller));
        }

        let old_capacity = self.capacity;
        let Some(buf) = self.data.as_mut() else {
            return Err(self.fail(crate::Condition::INVALID_DATA, caller));
        };

        let total_len = layout.total_len();
        if total_len > buf.len() && buf.try_reserve_exact(total_len - buf.len()).is_err() {
            return Err(self.abandon(new_capacity, caller));
        }

        buf.resize(total_len, 0);
        if total_len < buf.capacity() {
            buf.shrink_to_fit();
        }

        poison::fill::<T>(buf, &layout, old_capacity, new_capacity);
        canary::place_postfix(buf, &layout);

        self.layout = layout;
        self.capacity = new_capacity;
        self.rehash();

        tracing::debug!(
            from = old_capacity,
            to = new_capacity,
            size = self.size,
            "resized stack buffer"
        );

        Ok(())
    }

    /// Tears the stack down after a failed allocation.
    #[cold]
    fn abandon(&mut self, capacity: usize, caller: &'static Location<'static>) -> StackError {
        let error = StackError::AllocateMemory { capacity };

        tracing::error!(
            capacity,
            file = caller.file(),
            line = caller.line(),
            "buffer reallocation failed, destroying stack"
        );
        self.emit_error(&error, caller);
        self.teardown();

        error
    }
}
