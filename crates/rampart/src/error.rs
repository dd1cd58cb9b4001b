// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for rampart.

use thiserror::Error;

use crate::condition::Condition;

/// Errors returned by [`GuardStack`](crate::GuardStack) operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// The buffer could not be (re)allocated.
    ///
    /// A failed growth tears the stack down; it must not be used again.
    #[error("failed to allocate a buffer for {capacity} slots")]
    AllocateMemory {
        /// Slot count that was requested.
        capacity: usize,
    },

    /// Validation detected at least one violation.
    #[error("invalid stack: {0}")]
    InvalidStack(Condition),

    /// Pop was called with no occupied slots.
    #[error("pop from an empty stack")]
    EmptyStack,
}

impl StackError {
    /// Returns the numeric code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AllocateMemory { .. } => ErrorCode::AllocateMemory,
            Self::InvalidStack(_) => ErrorCode::InvalidStack,
            Self::EmptyStack => ErrorCode::EmptyStack,
        }
    }

    /// Returns `true` for the invalid-stack class, empty-stack pops included.
    pub fn is_invalid_stack(&self) -> bool {
        matches!(self, Self::InvalidStack(_) | Self::EmptyStack)
    }

    /// The violations behind this error, if it came from validation.
    pub fn condition(&self) -> Option<Condition> {
        match self {
            Self::InvalidStack(condition) => Some(*condition),
            Self::EmptyStack => Some(Condition::EMPTY_STACK),
            Self::AllocateMemory { .. } => None,
        }
    }
}

/// Small-integer error codes shared by the stack and its I/O collaborators.
///
/// `OpenFile`, `ReadFile` and `PrintData` belong to the log destination and
/// are never produced by the stack itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// Not an error.
    None = 0,
    /// A file could not be opened.
    OpenFile = 1,
    /// A file could not be read.
    ReadFile = 2,
    /// Memory could not be allocated.
    AllocateMemory = 3,
    /// Data could not be printed.
    PrintData = 4,
    /// The stack failed validation.
    InvalidStack = 5,
    /// Pop on an empty stack.
    EmptyStack = 6,
    /// Unrecognized code.
    Unknown = 7,
}

impl ErrorCode {
    /// Maps a raw code back to an `ErrorCode`; unrecognized values become
    /// [`ErrorCode::Unknown`].
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::OpenFile,
            2 => Self::ReadFile,
            3 => Self::AllocateMemory,
            4 => Self::PrintData,
            5 => Self::InvalidStack,
            6 => Self::EmptyStack,
            _ => Self::Unknown,
        }
    }

    /// Code of an operation's outcome: `None` on success.
    pub fn of<T>(result: &Result<T, StackError>) -> Self {
        match result {
            Ok(_) => Self::None,
            Err(e) => e.code(),
        }
    }

    /// Raw value of the code.
    #[inline]
    pub fn as_raw(self) -> u8 {
        self as u8
    }

    /// Headline printed to the log when this code is reported.
    pub fn headline(self) -> &'static str {
        match self {
            Self::None => "NO ERROR",
            Self::OpenFile => "OPEN FILE ERROR",
            Self::ReadFile => "READ FILE ERROR",
            Self::AllocateMemory => "MEMORY ALLOCATE ERROR",
            Self::PrintData => "DATA PRINT ERROR",
            Self::InvalidStack => "INVALID STACK ERROR",
            Self::EmptyStack => "EMPTY STACK ERROR",
            Self::Unknown => "UNKNOWN ERROR",
        }
    }
}

impl From<&StackError> for ErrorCode {
    fn from(error: &StackError) -> Self {
        error.code()
    }
}
