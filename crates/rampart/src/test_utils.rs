// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Fault injection and out-of-band corruption for testing detection paths.
//!
//! Only available with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! rampart = { version = "*", features = ["test-utils"] }
//! ```

use std::cell::RefCell;
use std::panic::Location;
use std::rc::Rc;

use crate::canary::Canary;
use crate::condition::Condition;
use crate::element::Element;
use crate::error::ErrorCode;
use crate::hash::{Digest, HashFn};
use crate::report::{Diagnostic, DiagnosticSink};
use crate::stack::GuardStack;

/// Test behaviour for injecting failures into `GuardStack` operations.
///
/// The behaviour is consumed by the operation it targets.
///
/// # Example
///
/// ```rust
/// use rampart::{GuardStack, GuardStackBehaviour, StackConfig, StackError};
///
/// let config = StackConfig::default().with_min_capacity(1);
/// let mut stack = GuardStack::<i64>::with_config(1, config).unwrap();
/// stack.push(1).unwrap();
///
/// stack.change_behaviour(GuardStackBehaviour::FailAtResize);
/// assert_eq!(stack.push(2), Err(StackError::AllocateMemory { capacity: 2 }));
/// assert!(stack.is_destroyed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardStackBehaviour {
    /// Normal behaviour - no injected failures.
    #[default]
    None,
    /// Next buffer reallocation fails as if the allocator refused.
    FailAtResize,
}

impl<T: Element> GuardStack<T> {
    /// Changes the injected behaviour.
    pub fn change_behaviour(&mut self, behaviour: GuardStackBehaviour) {
        self.behaviour = behaviour;
    }

    /// Opens the record and buffer for writes that bypass every guard.
    pub fn tamper(&mut self) -> Tamper<'_, T> {
        Tamper { stack: self }
    }

    pub(crate) fn take_resize_failure(&mut self) -> bool {
        let fail = self.behaviour == GuardStackBehaviour::FailAtResize;
        if fail {
            self.behaviour = GuardStackBehaviour::None;
        }

        fail
    }
}

/// Raw write access to a stack's record and buffer.
///
/// Nothing written through a `Tamper` updates digests or guards, which is
/// the point: it stands in for memory corruption from outside the API.
pub struct Tamper<'a, T: Element> {
    stack: &'a mut GuardStack<T>,
}

impl<T: Element> Tamper<'_, T> {
    /// The whole allocation, guard regions included.
    ///
    /// # Panics
    ///
    /// Panics if the buffer was released.
    pub fn buffer(&mut self) -> &mut [u8] {
        self.stack
            .data
            .as_deref_mut()
            .expect("tampering with a released buffer")
    }

    /// Writes `value` into slot `index` (occupied or not).
    pub fn slot(&mut self, index: usize, value: T) -> &mut Self {
        let range = self.stack.layout.slot(index);
        value.write_to(&mut self.buffer()[range]);
        self
    }

    /// Overwrites one byte of the allocation.
    pub fn byte(&mut self, offset: usize, value: u8) -> &mut Self {
        self.buffer()[offset] = value;
        self
    }

    /// Overwrites the guard before the slot region.
    ///
    /// # Panics
    ///
    /// Panics if the stack has no canary protection.
    pub fn data_prefix(&mut self, canary: Canary) -> &mut Self {
        let range = self.stack.layout.prefix().expect("layout has no guards");
        self.buffer()[range].copy_from_slice(&canary.to_ne_bytes());
        self
    }

    /// Overwrites the guard after the slot region.
    ///
    /// # Panics
    ///
    /// Panics if the stack has no canary protection.
    pub fn data_postfix(&mut self, canary: Canary) -> &mut Self {
        let range = self.stack.layout.postfix().expect("layout has no guards");
        self.buffer()[range].copy_from_slice(&canary.to_ne_bytes());
        self
    }

    /// Overwrites the record's leading guard.
    pub fn stack_prefix(&mut self, canary: Canary) -> &mut Self {
        self.stack.stack_prefix = canary;
        self
    }

    /// Overwrites the record's trailing guard.
    pub fn stack_postfix(&mut self, canary: Canary) -> &mut Self {
        self.stack.stack_postfix = canary;
        self
    }

    /// Overwrites the size field.
    pub fn size(&mut self, size: usize) -> &mut Self {
        self.stack.size = size;
        self
    }

    /// Overwrites the capacity field.
    pub fn capacity(&mut self, capacity: usize) -> &mut Self {
        self.stack.capacity = capacity;
        self
    }

    /// Overwrites the stored buffer digest.
    pub fn data_hash(&mut self, digest: Digest) -> &mut Self {
        self.stack.data_hash = digest;
        self
    }

    /// Overwrites the stored record digest.
    pub fn stack_hash(&mut self, digest: Digest) -> &mut Self {
        self.stack.stack_hash = digest;
        self
    }

    /// Replaces (or clears) the installed hash function.
    pub fn hash_func(&mut self, hash_func: Option<HashFn>) -> &mut Self {
        self.stack.hash_func = hash_func;
        self
    }

    /// Drops the buffer while leaving every other field untouched.
    pub fn release_buffer(&mut self) -> &mut Self {
        self.stack.data = None;
        self
    }

    /// Recomputes both digests so that only non-hash guards see the damage.
    pub fn rehash(&mut self) -> &mut Self {
        self.stack.rehash();
        self
    }
}

/// An owned copy of a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedDiagnostic {
    /// Caller location.
    pub caller: &'static Location<'static>,
    /// Error code, `None` for dumps.
    pub code: ErrorCode,
    /// Violations.
    pub condition: Condition,
    /// Rendered report.
    pub report: String,
}

/// Sink that keeps every diagnostic in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    captured: Rc<RefCell<Vec<CapturedDiagnostic>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far.
    pub fn captured(&self) -> Vec<CapturedDiagnostic> {
        self.captured.borrow().clone()
    }

    /// Number of diagnostics captured so far.
    pub fn len(&self) -> usize {
        self.captured.borrow().len()
    }

    /// Returns `true` if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.captured.borrow().is_empty()
    }

    /// The most recent diagnostic.
    pub fn last(&self) -> Option<CapturedDiagnostic> {
        self.captured.borrow().last().cloned()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, diagnostic: &Diagnostic<'_>) {
        self.captured.borrow_mut().push(CapturedDiagnostic {
            caller: diagnostic.caller,
            code: diagnostic.code,
            condition: diagnostic.condition,
            report: diagnostic.report.to_owned(),
        });
    }
}
