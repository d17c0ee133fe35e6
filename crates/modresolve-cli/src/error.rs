//! CLI-specific error types and exit codes.

use modresolve_core::SettingsError;
use modresolve_runtime::{EngineError, LoadError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// The probed module was not resolved.
    #[error("{0}")]
    Unresolved(String),

    /// The host failed to load the module.
    #[error("{0}")]
    Load(String),

    /// The engine refused the requested lifecycle change.
    #[error("{0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to a process exit code.
    ///
    /// - 1: module unresolved or failed to load
    /// - 70: internal engine error (`EX_SOFTWARE`)
    /// - 78: bad configuration (`EX_CONFIG`)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Unresolved(_) | Self::Load(_) => 1,
            Self::Engine(_) => 70,
            Self::Config(_) => 78,
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err.to_string())
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        Self::Load(err.to_string())
    }
}
