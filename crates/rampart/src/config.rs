// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Protection levels and construction parameters.

use crate::capacity::MIN_CAPACITY;
use crate::hash::HashFn;

/// Which integrity guards a stack maintains.
///
/// `Protection::default()` follows the `canary` and `hash` Cargo features,
/// both enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Protection {
    /// Guard constants around the slot region and inside the record.
    pub canary: bool,
    /// Digests of the buffer and of the record.
    pub hash: bool,
}

impl Protection {
    /// Only size/capacity/data/poison checks.
    pub const NONE: Self = Self {
        canary: false,
        hash: false,
    };

    /// Every guard enabled.
    pub const ALL: Self = Self {
        canary: true,
        hash: true,
    };
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            canary: cfg!(feature = "canary"),
            hash: cfg!(feature = "hash"),
        }
    }
}

/// Parameters fixed when a stack is constructed.
#[derive(Debug, Clone, Copy)]
pub struct StackConfig {
    /// Guards to maintain.
    pub protection: Protection,
    /// Capacity floor for construction and shrinking.
    pub min_capacity: usize,
    /// Digest function installed when hash protection is on.
    pub hash_func: HashFn,
}

impl StackConfig {
    /// Replaces the protection level.
    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    /// Replaces the capacity floor.
    pub fn with_min_capacity(mut self, min_capacity: usize) -> Self {
        self.min_capacity = min_capacity;
        self
    }

    /// Replaces the digest function.
    pub fn with_hash_func(mut self, hash_func: HashFn) -> Self {
        self.hash_func = hash_func;
        self
    }

    /// Effective capacity floor; never below one slot.
    #[inline]
    pub fn min_capacity(&self) -> usize {
        self.min_capacity.max(1)
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            protection: Protection::default(),
            min_capacity: MIN_CAPACITY,
            hash_func: rampart_hash::murmur2,
        }
    }
}
