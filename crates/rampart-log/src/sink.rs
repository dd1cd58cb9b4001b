// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::io::Write;

use rampart::{Diagnostic, DiagnosticSink};

use crate::log_file::{LogFile, SEPARATOR, write_entry_header};

/// [`DiagnosticSink`] that appends every report to a [`LogFile`].
///
/// Write failures are logged through `tracing` and otherwise ignored: a
/// broken log must not turn a detected corruption into a second failure.
#[derive(Debug, Clone)]
pub struct LogSink {
    log: LogFile,
}

impl LogSink {
    pub(crate) fn new(log: LogFile) -> Self {
        Self { log }
    }

    /// The log this sink writes to.
    pub fn log_file(&self) -> &LogFile {
        &self.log
    }
}

impl DiagnosticSink for LogSink {
    fn emit(&mut self, diagnostic: &Diagnostic<'_>) {
        let result = self.log.with_stream(|out| {
            write_entry_header(out, diagnostic.caller)?;
            out.write_all(diagnostic.report.as_bytes())?;
            write!(out, "\n{SEPARATOR}\n\n")
        });

        if let Err(e) = result {
            tracing::warn!(
                error = %e,
                code = ?diagnostic.code,
                "failed to write diagnostic to log"
            );
        }
    }
}
