// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::marker::PhantomData;
use core::panic::Location;

use crate::canary::{self, CANARY, Canary};
use crate::capacity::{self, allocate};
use crate::condition::Condition;
use crate::config::{Protection, StackConfig};
use crate::element::Element;
use crate::error::{ErrorCode, StackError};
use crate::hash::{Digest, HashFn};
use crate::layout::Layout;
use crate::poison;
use crate::report::{ConditionReport, Diagnostic, DiagnosticSink, StackDump, TracingSink};

#[cfg(any(test, feature = "test-utils"))]
use crate::test_utils::GuardStackBehaviour;

/// A growable stack that verifies its own memory before and after every
/// mutation.
///
/// Every operation follows the same contract: validate, mutate, validate.
/// A violation left behind by anything outside the public API (a stray write
/// into a spare slot, an overrun across a guard, a scribbled record field)
/// is caught at the next call, reported to the diagnostic sink with the full
/// stack state, and turned into an error before anything is mutated.
///
/// The record keeps guard constants as its first and last fields so that an
/// overrun from neighbouring memory into the record itself is detectable.
///
/// # Example
///
/// ```rust
/// use rampart::{GuardStack, StackError};
///
/// fn example() -> Result<(), StackError> {
///     let mut stack = GuardStack::<f64>::new(0)?;
///
///     stack.push(1.0)?;
///     stack.push(2.0)?;
///     assert_eq!(stack.pop()?, 2.0);
///
///     assert!(stack.check().is_ok());
///     stack.destroy()
/// }
/// # example().unwrap();
/// ```
#[repr(C)]
pub struct GuardStack<T: Element = f64> {
    pub(crate) stack_prefix: Canary,
    pub(crate) data: Option<Vec<u8>>,
    pub(crate) size: usize,
    pub(crate) capacity: usize,
    pub(crate) layout: Layout,
    pub(crate) config: StackConfig,
    pub(crate) hash_func: Option<HashFn>,
    pub(crate) data_hash: Digest,
    pub(crate) stack_hash: Digest,
    pub(crate) sink: Box<dyn DiagnosticSink>,
    #[cfg(any(test, feature = "test-utils"))]
    pub(crate) behaviour: GuardStackBehaviour,
    _element: PhantomData<T>,
    pub(crate) stack_postfix: Canary,
}

impl<T: Element> core::fmt::Debug for GuardStack<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GuardStack")
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("protection", &self.config.protection)
            .field("condition", &self.check())
            .finish_non_exhaustive()
    }
}

impl<T: Element> GuardStack<T> {
    /// Constructs a stack with the default configuration, reporting to
    /// [`TracingSink`].
    ///
    /// `capacity` below the minimum is raised to it.
    #[track_caller]
    pub fn new(capacity: usize) -> Result<Self, StackError> {
        Self::build(capacity, StackConfig::default(), TracingSink)
    }

    /// Constructs a stack with `config`, reporting to [`TracingSink`].
    #[track_caller]
    pub fn with_config(capacity: usize, config: StackConfig) -> Result<Self, StackError> {
        Self::build(capacity, config, TracingSink)
    }

    /// Constructs a stack with `config`, reporting to `sink`.
    ///
    /// Allocates the buffer, places the guards, poisons every slot, installs
    /// the hash function and stores the initial digests, then validates.
    #[track_caller]
    pub fn build<S>(capacity: usize, config: StackConfig, sink: S) -> Result<Self, StackError>
    where
        S: DiagnosticSink + 'static,
    {
        let caller = Location::caller();
        let capacity = capacity.max(config.min_capacity());
        let protection = config.protection;

        let mut stack = Self {
            stack_prefix: 0,
            data: None,
            size: 0,
            capacity: 0,
            layout: Layout::default(),
            config,
            hash_func: None,
            data_hash: 0,
            stack_hash: 0,
            sink: Box::new(sink),
            #[cfg(any(test, feature = "test-utils"))]
            behaviour: GuardStackBehaviour::default(),
            _element: PhantomData,
            stack_postfix: 0,
        };

        let Some((layout, mut buf)) = Layout::new(capacity, T::SIZE, protection.canary)
            .and_then(|layout| Some((layout, allocate(layout.total_len())?)))
        else {
            let error = StackError::AllocateMemory { capacity };
            tracing::error!(capacity, "initial buffer allocation failed");
            stack.emit_error(&error, caller);
            return Err(error);
        };

        poison::fill::<T>(&mut buf, &layout, 0, capacity);
        canary::place(&mut buf, &layout);

        if protection.canary {
            stack.stack_prefix = CANARY;
            stack.stack_postfix = CANARY;
        }

        if protection.hash {
            stack.hash_func = Some(config.hash_func);
        }

        stack.data = Some(buf);
        stack.layout = layout;
        stack.capacity = capacity;
        stack.rehash();

        stack.ensure_valid(caller)?;

        tracing::debug!(capacity, ?protection, "stack constructed");

        Ok(stack)
    }

    /// Validates, then releases the buffer and clears every field.
    ///
    /// # Panics
    ///
    /// Panics if the stack was already destroyed.
    #[track_caller]
    pub fn destroy(&mut self) -> Result<(), StackError> {
        let caller = Location::caller();
        self.assert_live();
        self.ensure_valid(caller)?;

        self.teardown();
        tracing::debug!("stack destroyed");

        Ok(())
    }

    /// Pushes `value`, doubling the capacity first if the stack is full.
    ///
    /// If growing fails the stack is destroyed and `AllocateMemory` is
    /// returned.
    ///
    /// # Panics
    ///
    /// Panics if the stack was destroyed.
    #[track_caller]
    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        let caller = Location::caller();
        self.assert_live();
        self.ensure_valid(caller)?;

        if self.size == self.capacity {
            self.resize(capacity::grown(self.capacity), caller)?;
        }

        let slot = self.layout.slot(self.size);
        let Some(buf) = self.data.as_mut() else {
            return Err(self.fail(Condition::INVALID_DATA, caller));
        };
        value.write_to(&mut buf[slot]);
        self.size += 1;

        self.rehash();
        self.ensure_valid(caller)
    }

    /// Pops the top value, poisoning the slot it vacates.
    ///
    /// Halves the capacity (never below the minimum) once the size falls to
    /// a quarter of it. Popping an empty stack reports and returns
    /// `EmptyStack` without touching size or capacity.
    ///
    /// # Panics
    ///
    /// Panics if the stack was destroyed.
    #[track_caller]
    pub fn pop(&mut self) -> Result<T, StackError> {
        let caller = Location::caller();
        self.assert_live();
        self.ensure_valid(caller)?;

        if self.size == 0 {
            return Err(self.fail(Condition::EMPTY_STACK, caller));
        }

        let slot = self.layout.slot(self.size - 1);
        let Some(buf) = self.data.as_mut() else {
            return Err(self.fail(Condition::INVALID_DATA, caller));
        };
        let value = T::read_from(&buf[slot.clone()]);
        T::POISON.write_to(&mut buf[slot]);
        self.size -= 1;

        self.rehash();

        if let Some(target) =
            capacity::shrink_target(self.size, self.capacity, self.config.min_capacity())
        {
            self.resize(target, caller)?;
        }

        self.rehash();
        self.ensure_valid(caller)?;

        Ok(value)
    }

    /// Returns the top value without removing it.
    ///
    /// # Panics
    ///
    /// Panics if the stack was destroyed.
    #[track_caller]
    pub fn peek(&mut self) -> Result<T, StackError> {
        let caller = Location::caller();
        self.assert_live();
        self.ensure_valid(caller)?;

        if self.size == 0 {
            return Err(self.fail(Condition::EMPTY_STACK, caller));
        }

        let slot = self.layout.slot(self.size - 1);
        let Some(buf) = self.data.as_deref() else {
            return Err(self.fail(Condition::INVALID_DATA, caller));
        };

        Ok(T::read_from(&buf[slot]))
    }

    /// Sends a full state dump to the sink, whether or not anything is
    /// violated.
    #[track_caller]
    pub fn dump(&mut self) {
        let caller = Location::caller();
        let condition = self.check();
        let report = if condition.is_ok() {
            format!("{}", self.report())
        } else {
            format!("{}{}", self.report(), ConditionReport::new(self, condition))
        };

        self.sink.emit(&Diagnostic {
            caller,
            code: ErrorCode::None,
            condition,
            report: &report,
        });
    }

    /// Renders the full state; see [`StackDump`].
    pub fn report(&self) -> StackDump<'_, T> {
        StackDump::new(self)
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no slot is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current slot count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Guards this stack maintains.
    #[inline]
    pub fn protection(&self) -> Protection {
        self.config.protection
    }

    /// Configuration the stack was built with.
    #[inline]
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Returns `true` once the stack was destroyed (explicitly or by a failed
    /// growth).
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.data.is_none() && self.capacity == 0
    }

    /// Returns `true` while the stack owns a buffer.
    #[inline]
    pub fn has_buffer(&self) -> bool {
        self.data.is_some()
    }

    /// Installed hash function.
    #[inline]
    pub fn hash_func(&self) -> Option<HashFn> {
        self.hash_func
    }

    /// Last known-good buffer digest.
    #[inline]
    pub fn data_hash(&self) -> Digest {
        self.data_hash
    }

    /// Last known-good record digest.
    #[inline]
    pub fn stack_hash(&self) -> Digest {
        self.stack_hash
    }

    /// Record guards as `(prefix, postfix)`.
    #[inline]
    pub fn stack_canaries(&self) -> (Canary, Canary) {
        (self.stack_prefix, self.stack_postfix)
    }

    /// Buffer guards as `(prefix, postfix)`, if the buffer has them.
    pub fn data_canaries(&self) -> Option<(Canary, Canary)> {
        canary::read(self.buffer()?, &self.layout)
    }

    /// Releases the buffer and clears every field without validating.
    pub(crate) fn teardown(&mut self) {
        if let Some(mut buf) = self.data.take() {
            buf.fill(0);
            core::hint::black_box(&mut buf);
        }

        self.size = 0;
        self.capacity = 0;
        self.layout = Layout::default();
        self.stack_prefix = 0;
        self.stack_postfix = 0;
        self.hash_func = None;
        self.data_hash = 0;
        self.stack_hash = 0;
    }

    /// Reports `error` together with the current state.
    pub(crate) fn emit_error(&mut self, error: &StackError, caller: &'static Location<'static>) {
        let condition = error.condition().unwrap_or(Condition::OK);
        let code = error.code();
        let report = format!(
            "{}\n{}{}",
            code.headline(),
            self.report(),
            ConditionReport::new(self, condition)
        );

        self.sink.emit(&Diagnostic {
            caller,
            code,
            condition,
            report: &report,
        });
    }

    #[track_caller]
    fn assert_live(&self) {
        assert!(!self.is_destroyed(), "operation on a destroyed GuardStack");
    }
}

impl<T: Element> Drop for GuardStack<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
