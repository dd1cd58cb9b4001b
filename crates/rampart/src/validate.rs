// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! The unified validity check.

use core::panic::Location;

use crate::canary;
use crate::condition::Condition;
use crate::element::Element;
use crate::error::StackError;
use crate::poison;
use crate::stack::GuardStack;

impl<T: Element> GuardStack<T> {
    /// Runs every enabled guard and returns one bit per detected violation.
    ///
    /// Pure: nothing is written, logged or reported. [`Condition::EMPTY_STACK`]
    /// is never produced here since an empty stack is valid; only a pop on
    /// it is not.
    pub fn check(&self) -> Condition {
        let mut condition = Condition::OK;

        if self.capacity == 0 {
            condition |= Condition::INVALID_CAPACITY;
        }

        if self.size > self.capacity {
            condition |= Condition::INVALID_SIZE;
        }

        let buffer = self.buffer();
        if buffer.is_none() && (self.capacity != 0 || self.data.is_some()) {
            condition |= Condition::INVALID_DATA;
        }

        if let Some(buf) = buffer {
            if self.size <= self.capacity && !poison::verify::<T>(buf, &self.layout, self.size) {
                condition |= Condition::POISON_VIOLATION;
            }

            if self.config.protection.canary && !canary::verify(buf, &self.layout) {
                condition |= Condition::DATA_CANARY;
            }
        }

        if self.config.protection.canary
            && !canary::verify_pair(self.stack_prefix, self.stack_postfix)
        {
            condition |= Condition::STACK_CANARY;
        }

        if self.config.protection.hash {
            if self.hash_func.is_none() {
                condition |= Condition::INVALID_HASH_FUNC;
            } else {
                if !self.verify_data_digest() {
                    condition |= Condition::DATA_HASH_MISMATCH;
                }
                if !self.verify_record_digest() {
                    condition |= Condition::STACK_HASH_MISMATCH;
                }
            }
        }

        condition
    }

    /// Returns `Ok` if [`check`](Self::check) is clean; otherwise reports the
    /// violations to the sink and returns `InvalidStack`.
    pub(crate) fn ensure_valid(
        &mut self,
        caller: &'static Location<'static>,
    ) -> Result<(), StackError> {
        let condition = self.check();
        if condition.is_ok() {
            return Ok(());
        }

        Err(self.fail(condition, caller))
    }

    /// Reports `condition` and builds the matching error.
    #[cold]
    pub(crate) fn fail(
        &mut self,
        condition: Condition,
        caller: &'static Location<'static>,
    ) -> StackError {
        let error = if condition == Condition::EMPTY_STACK {
            StackError::EmptyStack
        } else {
            StackError::InvalidStack(condition)
        };

        tracing::warn!(
            %condition,
            file = caller.file(),
            line = caller.line(),
            "stack validation failed"
        );
        self.emit_error(&error, caller);

        error
    }

    /// The buffer, if its length matches the layout of the current capacity.
    pub(crate) fn buffer(&self) -> Option<&[u8]> {
        let buf = self.data.as_deref()?;
        let consistent =
            self.layout.capacity() == self.capacity && buf.len() == self.layout.total_len();

        consistent.then_some(buf)
    }
}
