//! Available subcommands.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one module and show every probe
    Probe {
        /// Module display name (e.g. "Vendor.Tools, Version=1.0.0.0")
        name: String,
        /// Extra probing directories (';'-joined lists accepted, repeatable)
        #[arg(short = 'p', long = "path")]
        paths: Vec<String>,
        /// Display name of the module that requested this one
        #[arg(long = "requested-by")]
        requested_by: Option<String>,
        /// Decline satellite resource modules without probing
        #[arg(long)]
        skip_satellites: bool,
    },

    /// Show system, user and combined probing directories
    Paths {
        /// Extra probing directories (';'-joined lists accepted, repeatable)
        #[arg(short = 'p', long = "path")]
        paths: Vec<String>,
    },

    /// Show the effective exclusion patterns
    Rules,

    /// Load a module through the host with the engine attached
    Load {
        /// Module display name
        name: String,
        /// Extra probing directories (';'-joined lists accepted, repeatable)
        #[arg(short = 'p', long = "path")]
        paths: Vec<String>,
    },
}
