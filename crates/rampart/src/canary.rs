// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Guard constants around the slot region and inside the stack record.

use crate::layout::Layout;

/// Guard value type.
pub type Canary = u64;

/// The guard constant.
pub const CANARY: Canary = 0xBADC_0FFE_E0DD_F00D;

/// Width of one guard region in bytes.
pub const CANARY_SIZE: usize = core::mem::size_of::<Canary>();

/// Writes the guard constant before and after the slot region.
///
/// Does nothing for layouts without guard regions.
pub fn place(buf: &mut [u8], layout: &Layout) {
    if let Some(prefix) = layout.prefix() {
        buf[prefix].copy_from_slice(&CANARY.to_ne_bytes());
    }

    place_postfix(buf, layout);
}

/// Writes only the trailing guard. Used after a resize moves the slot end.
pub fn place_postfix(buf: &mut [u8], layout: &Layout) {
    if let Some(postfix) = layout.postfix() {
        buf[postfix].copy_from_slice(&CANARY.to_ne_bytes());
    }
}

/// Reads back both data guards as `(prefix, postfix)`.
///
/// Returns `None` for layouts without guard regions or when `buf` is shorter
/// than the layout describes.
pub fn read(buf: &[u8], layout: &Layout) -> Option<(Canary, Canary)> {
    let prefix = read_at(buf, layout.prefix()?)?;
    let postfix = read_at(buf, layout.postfix()?)?;

    Some((prefix, postfix))
}

/// Returns `true` when both data guards hold the guard constant.
///
/// A layout without guards verifies trivially.
pub fn verify(buf: &[u8], layout: &Layout) -> bool {
    if !layout.has_guards() {
        return true;
    }

    matches!(read(buf, layout), Some((prefix, postfix)) if verify_pair(prefix, postfix))
}

/// Returns `true` when both guards of a pair hold the guard constant.
#[inline]
pub fn verify_pair(prefix: Canary, postfix: Canary) -> bool {
    prefix == CANARY && postfix == CANARY
}

fn read_at(buf: &[u8], range: core::ops::Range<usize>) -> Option<Canary> {
    let bytes = buf.get(range)?;
    let mut raw = [0u8; CANARY_SIZE];
    raw.copy_from_slice(bytes);

    Some(Canary::from_ne_bytes(raw))
}
