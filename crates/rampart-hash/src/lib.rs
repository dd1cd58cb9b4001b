// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Digest functions for integrity checks.
//!
//! Every function here has the shape `fn(&[u8]) -> Digest` so it can be
//! injected into a guarded container as its hash function. None of them are
//! cryptographic: they detect accidental corruption (stray writes, overruns),
//! not an adversary who can recompute the digest.
//!
//! # Example
//!
//! ```rust
//! use rampart_hash::{fnv1a, murmur2};
//!
//! let digest = murmur2(b"guarded bytes");
//! assert_eq!(digest, murmur2(b"guarded bytes"));
//! assert_ne!(digest, murmur2(b"guarded bytez"));
//!
//! assert_eq!(fnv1a(b""), 0x811c_9dc5);
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

#[cfg(test)]
mod tests;

/// Fixed-width digest produced by every function in this crate.
pub type Digest = u32;

/// Seed mixed into [`murmur2`].
pub const MURMUR_SEED: u32 = 0x9747_b28c;

const MURMUR_M: u32 = 0x5bd1_e995;
const MURMUR_R: u32 = 24;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// MurmurHash2 (32-bit) with [`MURMUR_SEED`].
///
/// Input is consumed in little-endian 4-byte words so the digest does not
/// depend on the host byte order.
#[inline]
pub fn murmur2(bytes: &[u8]) -> Digest {
    murmur2_with_seed(bytes, MURMUR_SEED)
}

/// MurmurHash2 (32-bit) with an explicit seed.
pub fn murmur2_with_seed(bytes: &[u8], seed: u32) -> Digest {
    // Length is folded in modulo 2^32, as in the reference implementation.
    let mut h = seed ^ (bytes.len() as u32);

    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

        k = k.wrapping_mul(MURMUR_M);
        k ^= k >> MURMUR_R;
        k = k.wrapping_mul(MURMUR_M);

        h = h.wrapping_mul(MURMUR_M);
        h ^= k;
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        if tail.len() == 3 {
            h ^= (tail[2] as u32) << 16;
        }
        if tail.len() >= 2 {
            h ^= (tail[1] as u32) << 8;
        }
        h ^= tail[0] as u32;
        h = h.wrapping_mul(MURMUR_M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(MURMUR_M);
    h ^= h >> 15;

    h
}

/// FNV-1a (32-bit).
#[inline]
pub fn fnv1a(bytes: &[u8]) -> Digest {
    bytes.iter().fold(FNV_OFFSET_BASIS, |h, &byte| {
        (h ^ byte as u32).wrapping_mul(FNV_PRIME)
    })
}
