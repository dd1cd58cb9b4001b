// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Element types storable in a [`GuardStack`](crate::GuardStack).

use core::fmt;

/// A fixed-size numeric type with a poison sentinel.
///
/// Elements are stored as native-endian bytes inside the guarded buffer, so
/// every implementation describes how to move itself in and out of a slot.
pub trait Element: Copy + PartialEq + fmt::Debug + fmt::Display + 'static {
    /// Width of one slot in bytes.
    const SIZE: usize;

    /// Sentinel written into every unoccupied slot.
    const POISON: Self;

    /// Returns `true` if `self` reads back as the poison sentinel.
    ///
    /// Floating types compare bit patterns, so a NaN with any other payload
    /// is not poison.
    fn is_poison(&self) -> bool;

    /// Writes `self` into `dst[..Self::SIZE]`.
    fn write_to(&self, dst: &mut [u8]);

    /// Reads a value from `src[..Self::SIZE]`.
    fn read_from(src: &[u8]) -> Self;
}

/// Generates `Element` for integer types with a fixed poison bit pattern.
macro_rules! impl_int_element {
    ($type:ty, $poison:expr) => {
        impl Element for $type {
            const SIZE: usize = core::mem::size_of::<$type>();
            const POISON: Self = $poison;

            #[inline(always)]
            fn is_poison(&self) -> bool {
                *self == Self::POISON
            }

            #[inline(always)]
            fn write_to(&self, dst: &mut [u8]) {
                dst[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
            }

            #[inline(always)]
            fn read_from(src: &[u8]) -> Self {
                let mut raw = [0u8; core::mem::size_of::<$type>()];
                raw.copy_from_slice(&src[..Self::SIZE]);
                <$type>::from_ne_bytes(raw)
            }
        }
    };
}

/// Generates `Element` for floating types poisoned with NaN.
macro_rules! impl_float_element {
    ($type:ty) => {
        impl Element for $type {
            const SIZE: usize = core::mem::size_of::<$type>();
            const POISON: Self = <$type>::NAN;

            #[inline(always)]
            fn is_poison(&self) -> bool {
                self.to_bits() == Self::POISON.to_bits()
            }

            #[inline(always)]
            fn write_to(&self, dst: &mut [u8]) {
                dst[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
            }

            #[inline(always)]
            fn read_from(src: &[u8]) -> Self {
                let mut raw = [0u8; core::mem::size_of::<$type>()];
                raw.copy_from_slice(&src[..Self::SIZE]);
                <$type>::from_ne_bytes(raw)
            }
        }
    };
}

impl_float_element!(f32);
impl_float_element!(f64);

impl_int_element!(i32, 0x0BAD_F00D);
impl_int_element!(i64, 0x0BAD_F00D_DEAD_BEEF);
impl_int_element!(u32, 0xDEAD_BEEF);
impl_int_element!(u64, 0xDEAD_BEEF_0BAD_F00D);
