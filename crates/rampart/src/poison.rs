// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Poison sentinel fill and verification for unoccupied slots.

use crate::element::Element;
use crate::layout::Layout;

/// Writes `T::POISON` into every slot in `[from, to)`.
///
/// `to` is clamped to the layout capacity; an empty range is a no-op.
pub fn fill<T: Element>(buf: &mut [u8], layout: &Layout, from: usize, to: usize) {
    for index in from..to.min(layout.capacity()) {
        T::POISON.write_to(&mut buf[layout.slot(index)]);
    }
}

/// Returns `true` when every slot in `[size, capacity)` still holds the
/// poison sentinel.
pub fn verify<T: Element>(buf: &[u8], layout: &Layout, size: usize) -> bool {
    first_violation::<T>(buf, layout, size).is_none()
}

/// Index of the first slot in `[size, capacity)` that no longer holds the
/// poison sentinel.
pub fn first_violation<T: Element>(buf: &[u8], layout: &Layout, size: usize) -> Option<usize> {
    (size..layout.capacity()).find(|&index| !is_poisoned::<T>(buf, layout, index))
}

/// Returns `true` when slot `index` holds the poison sentinel.
#[inline]
pub fn is_poisoned<T: Element>(buf: &[u8], layout: &Layout, index: usize) -> bool {
    T::read_from(&buf[layout.slot(index)]).is_poison()
}
