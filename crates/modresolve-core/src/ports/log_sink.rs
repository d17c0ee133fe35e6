//! Log sink port for human-readable resolution traces.
//!
//! The engine reports every probe, resolution and miss through this sink.
//! Callers inject whatever destination suits them: a closure, the tracing
//! subscriber, or nothing at all.

use std::sync::Arc;

/// Port for appending resolution log lines to a sink.
///
/// Implementations must be thread-safe; the engine calls `append` from
/// whichever thread triggered the load.
pub trait LogSink: Send + Sync {
    /// Append a single line (without trailing newline).
    fn append(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn append(&self, line: &str) {
        self(line);
    }
}

/// Sink that forwards every line to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&self, line: &str) {
        tracing::info!(target: "modresolve", "{}", line.trim_start());
    }
}

/// A no-op sink for contexts without a log destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn append(&self, _line: &str) {
        // Intentionally do nothing
    }
}

/// Shared, type-erased sink handle.
pub type SharedLogSink = Arc<dyn LogSink>;

/// Sink that records every line in memory (tests and diagnostics).
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines appended so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines containing `needle`.
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(needle))
            .collect()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl LogSink for MemorySink {
    fn append(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
