//! Command handlers.
//!
//! Each handler takes the composed [`CliContext`](crate::CliContext), runs one
//! engine or host operation and prints the result. Rendering is kept in
//! separate functions returning `String` so output can be asserted on.

pub mod load;
pub mod paths;
pub mod probe;
pub mod rules;

use std::sync::Arc;

use modresolve_core::SharedLogSink;

/// Sink printing engine log lines to stdout as they are produced.
pub(crate) fn stdout_sink() -> SharedLogSink {
    Arc::new(|line: &str| println!("{line}"))
}
