//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces that the resolution engine expects from its
//! surroundings. They contain no implementation details beyond the trivial
//! production adapters (`SystemEnv`, `SystemFs`) and test doubles.
//!
//! # Design Rules
//!
//! - Every port is `Send + Sync`; the engine is shared across loader threads
//! - Probing failures are values (`ProbeOutcome`), never errors
//! - Test doubles live behind `cfg(any(test, feature = "test-utils"))`

pub mod env;
pub mod fs;
pub mod host_loader;
pub mod log_sink;
pub mod system_paths;

pub use env::{EnvProvider, SystemEnv};
pub use fs::{FsProvider, ProbeOutcome, SystemFs};
pub use host_loader::{HandlerId, HostLoader, ResolveHandler};
pub use log_sink::{LogSink, NoopSink, SharedLogSink, TracingSink};
pub use system_paths::{FixedPathProvider, SystemPathProvider, SystemPaths};

#[cfg(any(test, feature = "test-utils"))]
pub use env::MockEnv;
#[cfg(any(test, feature = "test-utils"))]
pub use fs::MockFs;
#[cfg(any(test, feature = "test-utils"))]
pub use log_sink::MemorySink;
