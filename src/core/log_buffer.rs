// src/core/log_buffer.rs

//! Bounded, severity-tagged console log.

use crate::models::{LogEntry, Severity};
use colored::Colorize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Anything that accepts severity-tagged console lines.
///
/// The registry and dispatcher report every diagnostic through this trait, so
/// tests can observe them without installing a global logger.
pub trait LogSink {
    /// Appends one line.
    fn append(&self, severity: Severity, message: String);
}

/// A capped log of console lines. Appending past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    pushed: u64,
}

impl LogBuffer {
    /// Creates an empty buffer. A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            pushed: 0,
        }
    }

    /// Appends a line, dropping the oldest ones if the buffer is full.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push_back(LogEntry {
            severity,
            message: message.into(),
        });
        self.pushed = self.pushed.saturating_add(1);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// The retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter()
    }

    /// Total number of lines ever pushed. Unaffected by eviction and [`LogBuffer::clear`].
    pub fn sequence(&self) -> u64 {
        self.pushed
    }

    /// The retained entries pushed after [`LogBuffer::sequence`] returned `sequence`.
    /// Lines already evicted are skipped.
    pub fn entries_since(&self, sequence: u64) -> impl Iterator<Item = &LogEntry> + '_ {
        let unseen = usize::try_from(self.pushed.saturating_sub(sequence)).unwrap_or(usize::MAX);
        let skip = self.entries.len().saturating_sub(unseen);
        self.entries.iter().skip(skip)
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the buffer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Renders the buffer as newline-joined text, tagging warnings and errors.
    pub fn render(&self, use_colors: bool) -> String {
        self.entries
            .iter()
            .map(|entry| render_entry(entry, use_colors))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(crate::constants::MAX_LOG_LINES)
    }
}

/// Renders one line, prefixing warnings and errors with their severity.
pub fn render_entry(entry: &LogEntry, use_colors: bool) -> String {
    let prefix = match entry.severity {
        Severity::Info => return entry.message.clone(),
        Severity::Warning => "[Warning]",
        Severity::Error => "[Error]",
    };

    if !use_colors {
        return format!("{} {}", prefix, entry.message);
    }

    let prefix = match entry.severity {
        Severity::Warning => prefix.yellow(),
        _ => prefix.red(),
    };
    format!("{} {}", prefix, entry.message)
}

/// A log buffer shared between the console, the captured `log` stream and the dispatcher.
#[derive(Debug, Clone)]
pub struct SharedLogBuffer {
    inner: Arc<Mutex<LogBuffer>>,
}

impl SharedLogBuffer {
    /// Creates a shared buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogBuffer::with_capacity(capacity))),
        }
    }

    /// Locks the buffer. A poisoned lock is recovered: a line of text cannot leave
    /// the buffer in a broken state.
    pub fn lock(&self) -> MutexGuard<'_, LogBuffer> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().entries().cloned().collect()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Entries pushed since `sequence`, plus the sequence to pass next time.
    pub fn tail(&self, sequence: u64) -> (Vec<LogEntry>, u64) {
        let buffer = self.lock();
        let entries = buffer.entries_since(sequence).cloned().collect();
        (entries, buffer.sequence())
    }

    /// See [`LogBuffer::render`].
    pub fn render(&self, use_colors: bool) -> String {
        self.lock().render(use_colors)
    }
}

impl LogSink for SharedLogBuffer {
    fn append(&self, severity: Severity, message: String) {
        self.lock().push(severity, message);
    }
}

impl Default for SharedLogBuffer {
    fn default() -> Self {
        Self::with_capacity(crate::constants::MAX_LOG_LINES)
    }
}
