// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Self-verifying stack that catches memory corruption at the next call.
//!
//! `GuardStack<T>` is an ordinary growable stack wrapped in integrity guards.
//! Every operation validates the stack, mutates it, and validates it again,
//! so a corruption introduced between two calls is reported at the very next
//! one instead of surfacing far from the fault.
//!
//! # Guards
//!
//! - **Canaries**: a fixed constant right before and after the slot region,
//!   and as the first and last fields of the stack record. Catches under-
//!   and overruns of the buffer and scribbles over the record.
//! - **Poison**: every unoccupied slot holds a sentinel (`NaN` for floats, a
//!   fixed bit pattern for integers). Catches writes into slots that were
//!   never pushed or were already popped.
//! - **Hashes**: a digest of the whole buffer (guards included) and a digest
//!   of the record, computed with an injected hash function. Catches any
//!   other change made outside the API.
//! - **Structural checks**: capacity, size and buffer geometry.
//!
//! Canaries and hashes are toggled per stack through [`Protection`]; the
//! default follows the `canary` and `hash` Cargo features (both on).
//!
//! # Reports
//!
//! On a violation the operation returns [`StackError::InvalidStack`] carrying
//! the [`Condition`] bitmask, after sending a full report (every field,
//! every slot, one line per violation) to the stack's [`DiagnosticSink`].
//!
//! # Example
//!
//! ```rust
//! use rampart::{GuardStack, Protection, StackConfig, StackError};
//!
//! fn example() -> Result<(), StackError> {
//!     let config = StackConfig::default().with_protection(Protection::ALL);
//!     let mut stack = GuardStack::<i64>::with_config(4, config)?;
//!
//!     for value in 1..=3 {
//!         stack.push(value)?;
//!     }
//!
//!     assert_eq!(stack.pop()?, 3);
//!     assert_eq!(stack.pop()?, 2);
//!     assert_eq!(stack.pop()?, 1);
//!     assert_eq!(stack.pop(), Err(StackError::EmptyStack));
//!
//!     stack.destroy()
//! }
//! # example().unwrap();
//! ```
//!
//! # Test Utilities
//!
//! The `test-utils` feature adds [`GuardStackBehaviour`] (allocation fault
//! injection), [`Tamper`] (writes that bypass every guard) and
//! [`MemorySink`].

#![warn(missing_docs)]

mod canary;
mod capacity;
mod condition;
mod config;
mod element;
mod error;
mod hash;
mod layout;
mod poison;
mod report;
mod stack;
mod validate;

#[cfg(any(test, feature = "test-utils"))]
mod test_utils;

#[cfg(test)]
mod tests;

pub use canary::{CANARY, Canary};
pub use capacity::{
    GROWTH_FACTOR, MIN_CAPACITY, SHRINK_FACTOR, SHRINK_THRESHOLD, grown, shrink_target,
};
pub use condition::Condition;
pub use config::{Protection, StackConfig};
pub use element::Element;
pub use error::{ErrorCode, StackError};
pub use hash::{Digest, HashFn};
pub use layout::Layout;
pub use report::{ConditionReport, Diagnostic, DiagnosticSink, StackDump, TracingSink};
pub use stack::GuardStack;

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::{CapturedDiagnostic, GuardStackBehaviour, MemorySink, Tamper};
