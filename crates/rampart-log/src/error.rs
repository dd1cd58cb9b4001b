// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::io;
use std::path::PathBuf;

use rampart::ErrorCode;
use thiserror::Error;
use tracing_appender::rolling::InitError;

/// Errors from the log destination.
#[derive(Debug, Error)]
pub enum LogError {
    /// The log file could not be opened.
    #[error("failed to open log file {path:?}")]
    OpenFile {
        /// Full path that was attempted.
        path: PathBuf,
        /// Why the appender could not be initialized.
        #[source]
        source: InitError,
    },

    /// Writing to the log stream failed.
    #[error("failed to write to the log")]
    Write(#[from] io::Error),
}

impl LogError {
    /// Code shared with the stack's error codes.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OpenFile { .. } => ErrorCode::OpenFile,
            Self::Write(_) => ErrorCode::PrintData,
        }
    }
}
