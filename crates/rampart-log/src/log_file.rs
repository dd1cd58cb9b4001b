// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use rampart::{Protection, StackError};
use tracing_appender::rolling::{InitError, RollingFileAppender, RollingWriter, Rotation};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};

use crate::error::LogError;
use crate::sink::LogSink;

const EXTENSION: &str = ".log";

const STARS: &str = "*********************************************************************";
const START: &str = "=========================== PROGRAM START ===========================";
const END: &str = "============================ PROGRAM END ============================";
pub(crate) const SEPARATOR: &str = "........................................";
const ENTRY: &str = "--------------------LOG CALLED--------------------";

/// Log destination shared by every handle and sink created from it.
///
/// Cloning is cheap; all clones write to the same stream. The closing
/// banner is written when the last handle (or sink) is dropped.
///
/// The file is a never-rotating [`RollingFileAppender`], so `tracing`
/// events routed through [`make_writer`](Self::make_writer) land in the same
/// file as the banners and stack reports.
#[derive(Clone)]
pub struct LogFile {
    stream: Rc<LogStream>,
}

impl fmt::Debug for LogFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFile")
            .field("path", &self.stream.path)
            .finish_non_exhaustive()
    }
}

impl LogFile {
    /// Opens `<stem>.log` for appending and writes the start banner.
    ///
    /// Falls back to stderr if the file cannot be opened, so logging never
    /// fails at startup.
    pub fn open(stem: impl AsRef<Path>, protection: Protection) -> Self {
        let path = log_path(stem.as_ref());

        let log = match open_appender(&path) {
            Ok(appender) => Self::start(Some(appender), Some(path)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "cannot open log file, logging to stderr"
                );
                Self::start(None, None)
            }
        };

        if let Err(e) = log.write_start_banner(protection) {
            tracing::warn!(error = %e, "failed to write log start banner");
        }

        log
    }

    /// Like [`open`](Self::open), but fails instead of falling back to
    /// stderr.
    pub fn create(stem: impl AsRef<Path>, protection: Protection) -> Result<Self, LogError> {
        let path = log_path(stem.as_ref());
        let appender = open_appender(&path).map_err(|source| LogError::OpenFile {
            path: path.clone(),
            source,
        })?;

        let log = Self::start(Some(appender), Some(path));
        log.write_start_banner(protection)?;

        Ok(log)
    }

    /// Log that writes only to stderr.
    pub fn stderr(protection: Protection) -> Self {
        let log = Self::start(None, None);
        if let Err(e) = log.write_start_banner(protection) {
            tracing::warn!(error = %e, "failed to write log start banner");
        }

        log
    }

    fn start(appender: Option<RollingFileAppender>, path: Option<PathBuf>) -> Self {
        let appender = appender.map(Arc::new);
        let writer = writer_for(appender.as_ref());

        Self {
            stream: Rc::new(LogStream {
                appender,
                writer,
                path,
            }),
        }
    }

    /// Path of the log file, or `None` when writing to stderr.
    pub fn path(&self) -> Option<PathBuf> {
        self.stream.path.clone()
    }

    /// Returns `true` when the log fell back to (or was opened on) stderr.
    pub fn is_stderr(&self) -> bool {
        self.stream.path.is_none()
    }

    /// Writer onto this log's destination, for a `tracing_subscriber::fmt`
    /// layer.
    ///
    /// ```rust,no_run
    /// # use rampart_log::LogFile;
    /// let log = LogFile::open("app", rampart::Protection::ALL);
    /// let subscriber = tracing_subscriber::fmt()
    ///     .with_writer(log.make_writer())
    ///     .finish();
    /// tracing::subscriber::set_global_default(subscriber)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn make_writer(&self) -> BoxMakeWriter {
        writer_for(self.stream.appender.as_ref())
    }

    /// Sink that appends stack diagnostics to this log.
    pub fn sink(&self) -> LogSink {
        LogSink::new(self.clone())
    }

    /// Writes a free-form entry headed by the caller's location.
    #[track_caller]
    pub fn log(&self, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        let caller = Location::caller();

        self.with_stream(|out| {
            write_entry_header(out, caller)?;
            writeln!(out, "{args}")
        })
    }

    /// Writes the headline and message of `error`, headed by the caller's
    /// location.
    #[track_caller]
    pub fn log_error(&self, error: &StackError) -> Result<(), LogError> {
        let caller = Location::caller();

        self.with_stream(|out| {
            write_entry_header(out, caller)?;
            writeln!(out, "{}: {error}", error.code().headline())
        })
    }

    /// Writes a dotted separator line.
    pub fn separator(&self) -> Result<(), LogError> {
        self.with_stream(|out| write!(out, "\n{SEPARATOR}\n\n"))
    }

    /// Flushes the destination.
    pub fn flush(&self) -> Result<(), LogError> {
        self.with_stream(|_| Ok(()))
    }

    /// Runs `f` against a fresh writer and flushes it afterwards.
    pub(crate) fn with_stream<F>(&self, f: F) -> Result<(), LogError>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let mut out = self.stream.writer.make_writer();
        f(out.as_mut())?;
        out.flush()?;

        Ok(())
    }

    fn write_start_banner(&self, protection: Protection) -> Result<(), LogError> {
        let now = chrono::Local::now();

        self.with_stream(|out| {
            write!(out, "\n{STARS}\n{START}\n{STARS}\n")?;
            writeln!(out, "RUNNED AT {}", now.format("%a %b %e %H:%M:%S %Y"))?;
            if protection.canary {
                writeln!(out, "[CANARY PROTECT ON]")?;
            }
            if protection.hash {
                writeln!(out, "[HASH PROTECT ON]")?;
            }
            writeln!(out)
        })
    }
}

pub(crate) fn write_entry_header(
    out: &mut dyn Write,
    caller: &'static Location<'static>,
) -> io::Result<()> {
    writeln!(out, "{ENTRY}")?;
    writeln!(out, "RUNNING FROM FILE \"{}\"({})", caller.file(), caller.line())
}

fn log_path(stem: &Path) -> PathBuf {
    let mut name = stem.as_os_str().to_owned();
    name.push(EXTENSION);

    PathBuf::from(name)
}

/// Never-rotating appender on `path`. Missing parent directories are
/// created.
fn open_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
}

fn writer_for(appender: Option<&Arc<RollingFileAppender>>) -> BoxMakeWriter {
    match appender {
        Some(appender) => BoxMakeWriter::new(SharedAppender(Arc::clone(appender))),
        None => BoxMakeWriter::new(io::stderr),
    }
}

/// Appender handle that can back several `MakeWriter`s at once.
struct SharedAppender(Arc<RollingFileAppender>);

impl<'a> MakeWriter<'a> for SharedAppender {
    type Writer = RollingWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        (*self.0).make_writer()
    }
}

struct LogStream {
    appender: Option<Arc<RollingFileAppender>>,
    writer: BoxMakeWriter,
    path: Option<PathBuf>,
}

impl Drop for LogStream {
    fn drop(&mut self) {
        let mut out = self.writer.make_writer();
        let result = write!(out, "{STARS}\n{END}\n{STARS}\n").and_then(|()| out.flush());

        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to close log");
        }
    }
}
