//! Command-line adapter for the modresolve resolution engine.
//!
//! The binary in `main.rs` is the composition root; this library holds the
//! parser, the bootstrap that wires settings into an engine, and one handler
//! per command so they can be exercised from tests.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
