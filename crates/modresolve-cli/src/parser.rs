//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Diagnose how modules are located by the resolution engine.
#[derive(Parser)]
#[command(name = "modresolve")]
#[command(about = "Probe, inspect and load modules through the resolution engine")]
#[command(version)]
pub struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long = "config", global = true, env = "MODRESOLVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
