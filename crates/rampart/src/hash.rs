// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Structural hashing of the buffer and of the stack record.
//!
//! The buffer digest covers the whole allocation, guard regions included, so
//! an overwritten canary is caught twice.
//!
//! The record digest is self-referential: the stored record digest is one of
//! the fields being hashed. [`GuardStack::compute_record_digest`] therefore
//! hashes an image of the record in which that field is written as zero.
//! Computing, storing and recomputing the digest all see the same image, so
//! the result is reproducible.

use smallvec::SmallVec;

use crate::element::Element;
use crate::stack::GuardStack;

pub use rampart_hash::Digest;

/// Injectable digest function.
pub type HashFn = fn(&[u8]) -> Digest;

// prefix, data address, data len, size, capacity, layout capacity,
// min capacity, hash fn, postfix: 9 words; two digests; protection flags.
pub(crate) const RECORD_IMAGE_LEN: usize = 9 * 8 + 2 * 4 + 2;

// Smallest inline size smallvec supports that holds RECORD_IMAGE_LEN.
const RECORD_IMAGE_INLINE: usize = 96;

const _: () = assert!(RECORD_IMAGE_LEN <= RECORD_IMAGE_INLINE);

/// Byte image of the stack record fed to the hash function.
#[derive(Default)]
pub(crate) struct RecordImage {
    bytes: SmallVec<[u8; RECORD_IMAGE_INLINE]>,
}

impl RecordImage {
    pub(crate) fn word(&mut self, value: u64) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_ne_bytes());
        self
    }

    pub(crate) fn usize(&mut self, value: usize) -> &mut Self {
        self.word(value as u64)
    }

    pub(crate) fn digest(&mut self, value: Digest) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_ne_bytes());
        self
    }

    pub(crate) fn flag(&mut self, value: bool) -> &mut Self {
        self.bytes.push(value as u8);
        self
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `true` once the image outgrew its inline storage.
    pub(crate) fn spilled(&self) -> bool {
        self.bytes.spilled()
    }
}

/// Address of a hash function, as shown in reports and hashed into the record.
#[inline]
pub(crate) fn func_addr(hash_func: Option<HashFn>) -> usize {
    hash_func.map_or(0, |f| f as usize)
}

impl<T: Element> GuardStack<T> {
    /// Fresh digest of the whole buffer, guards included.
    ///
    /// Returns `None` when no hash function is installed.
    pub fn compute_data_digest(&self) -> Option<Digest> {
        let hash_func = self.hash_func?;
        let bytes = self.data.as_deref().unwrap_or(&[]);

        Some(hash_func(bytes))
    }

    /// Fresh digest of the record with the stored record digest logically
    /// excluded (hashed as zero).
    ///
    /// Returns `None` when no hash function is installed.
    pub fn compute_record_digest(&self) -> Option<Digest> {
        let hash_func = self.hash_func?;
        let image = self.record_image();

        Some(hash_func(image.as_bytes()))
    }

    pub(crate) fn verify_data_digest(&self) -> bool {
        self.compute_data_digest() == Some(self.data_hash)
    }

    pub(crate) fn verify_record_digest(&self) -> bool {
        self.compute_record_digest() == Some(self.stack_hash)
    }

    /// Stores fresh digests. The buffer digest is stored first because it is
    /// part of the record image.
    pub(crate) fn rehash(&mut self) {
        if !self.config.protection.hash {
            return;
        }

        self.data_hash = self.compute_data_digest().unwrap_or(0);
        self.stack_hash = self.compute_record_digest().unwrap_or(0);
    }

    pub(crate) fn record_image(&self) -> RecordImage {
        let (data_addr, data_len) = self
            .data
            .as_ref()
            .map_or((0, 0), |buf| (buf.as_ptr() as usize, buf.len()));

        let mut image = RecordImage::default();
        image
            .word(self.stack_prefix)
            .usize(data_addr)
            .usize(data_len)
            .usize(self.size)
            .usize(self.capacity)
            .usize(self.layout.capacity())
            .usize(self.config.min_capacity)
            .flag(self.config.protection.canary)
            .flag(self.config.protection.hash)
            .usize(func_addr(self.hash_func))
            .digest(self.data_hash)
            // stored record digest, excluded
            .digest(0)
            .word(self.stack_postfix);

        image
    }
}
