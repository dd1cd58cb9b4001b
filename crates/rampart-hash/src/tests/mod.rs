// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use proptest::prelude::*;

use crate::{MURMUR_SEED, fnv1a, murmur2, murmur2_with_seed};

// =============================================================================
// fnv1a()
// =============================================================================

#[test]
fn test_fnv1a_known_vectors() {
    assert_eq!(fnv1a(b""), 0x811c_9dc5);
    assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    assert_eq!(fnv1a(b"foobar"), 0xbf9c_f968);
}

// =============================================================================
// murmur2()
// =============================================================================

#[test]
fn test_murmur2_empty_input_with_zero_seed_is_zero() {
    assert_eq!(murmur2_with_seed(b"", 0), 0);
}

#[test]
fn test_murmur2_uses_default_seed() {
    let bytes = b"rampart";
    assert_eq!(murmur2(bytes), murmur2_with_seed(bytes, MURMUR_SEED));
}

#[test]
fn test_murmur2_seed_changes_digest() {
    let bytes = b"rampart";
    assert_ne!(murmur2_with_seed(bytes, 1), murmur2_with_seed(bytes, 2));
}

#[test]
fn test_murmur2_covers_every_tail_length() {
    // 4..=7 bytes exercise the full-word loop plus tails of 0..=3 bytes.
    let bytes = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77];

    for len in 4..=bytes.len() {
        let mut flipped = bytes;
        flipped[len - 1] ^= 0x01;

        assert_ne!(
            murmur2(&bytes[..len]),
            murmur2(&flipped[..len]),
            "last byte of a {len}-byte input must affect the digest"
        );
    }
}

proptest! {
    #[test]
    fn murmur2_detects_single_bit_flips(
        bytes in proptest::collection::vec(any::<u8>(), 1..256),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut corrupted = bytes.clone();
        let i = index.index(corrupted.len());
        corrupted[i] ^= 1 << bit;

        prop_assert_ne!(murmur2(&bytes), murmur2(&corrupted));
    }

    #[test]
    fn digests_are_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        prop_assert_eq!(murmur2(&bytes), murmur2(&bytes));
        prop_assert_eq!(fnv1a(&bytes), fnv1a(&bytes));
    }
}
