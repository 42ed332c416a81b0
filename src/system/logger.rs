//! Logger implementation for the log crate.
//!
//! Captures every record at or above the capture level into the console's log
//! buffer, and forwards everything to `env_logger` (configured from `RUST_LOG`)
//! for stderr output.

use crate::core::log_buffer::{LogSink, SharedLogBuffer};
use crate::models::Severity;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// A `log` backend feeding the console overlay.
#[derive(Debug)]
pub struct ConsoleLogger {
    buffer: SharedLogBuffer,
    capture_level: LevelFilter,
    inner: env_logger::Logger,
}

impl ConsoleLogger {
    /// Creates a logger capturing records up to `capture_level` into `buffer`.
    pub fn new(buffer: SharedLogBuffer, capture_level: LevelFilter) -> Self {
        Self {
            buffer,
            capture_level,
            inner: env_logger::Builder::from_env(env_logger::Env::default()).build(),
        }
    }

    /// The most verbose level either the capture or stderr output wants.
    pub fn max_level(&self) -> LevelFilter {
        self.capture_level.max(self.inner.filter())
    }

    fn captures(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.capture_level
    }
}

/// Maps a `log` level onto the three console severities.
pub fn severity_for(level: Level) -> Severity {
    match level {
        Level::Error => Severity::Error,
        Level::Warn => Severity::Warning,
        Level::Info | Level::Debug | Level::Trace => Severity::Info,
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.captures(metadata) || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if self.captures(record.metadata()) {
            self.buffer
                .append(severity_for(record.level()), record.args().to_string());
        }
        if self.inner.matches(record) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Installs a [`ConsoleLogger`] as the global logger. Fails if a logger is
/// already installed.
pub fn install(buffer: SharedLogBuffer, capture_level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = ConsoleLogger::new(buffer, capture_level);
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}
