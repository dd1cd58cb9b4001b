// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Process log file for rampart diagnostics.
//!
//! [`LogFile::open`] appends to `<stem>.log`, falling back to stderr when the
//! file cannot be opened, and frames the session between a `PROGRAM START`
//! and a `PROGRAM END` banner. [`LogFile::sink`] hands out a
//! [`DiagnosticSink`](rampart::DiagnosticSink) so stacks report straight into
//! the same stream.
//!
//! ```rust,no_run
//! use rampart::{GuardStack, Protection, StackConfig};
//! use rampart_log::{LogFile, log};
//!
//! let log = LogFile::open("stack", Protection::default());
//! let mut stack = GuardStack::<f64>::build(0, StackConfig::default(), log.sink())?;
//!
//! stack.push(7.0)?;
//! stack.dump();
//! log!(log, "pushed {} value(s)", stack.len())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod error;
mod log_file;
mod sink;


pub use error::LogError;
pub use log_file::LogFile;
pub use sink::LogSink;

/// Writes a formatted entry to a [`LogFile`], tagged with the call site.
///
/// ```rust,no_run
/// # use rampart_log::{LogFile, log};
/// # let log = LogFile::open("app", rampart::Protection::NONE);
/// log!(log, "capacity is {}", 16)?;
/// # Ok::<(), rampart_log::LogError>(())
/// ```
#[macro_export]
macro_rules! log {
    ($file:expr, $($arg:tt)*) => {
        $file.log(::core::format_args!($($arg)*))
    };
}
