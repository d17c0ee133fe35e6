//! Types for module resolution outcomes.

use std::path::PathBuf;

use modresolve_core::ProbeOutcome;

/// Decision taken for a single module request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A module file was found; the loader should map this path.
    Resolved(PathBuf),
    /// Every candidate directory was probed without a match.
    NotFound,
    /// The name matched an exclusion rule and was never probed.
    Excluded { pattern: String },
    /// Satellite modules are skipped for this activation.
    SatelliteSkipped,
    /// The current thread is already resolving this name.
    Reentrant,
    /// The bare name cannot name a file inside a probing directory.
    InvalidName,
    /// The engine is not attached to a loader.
    Inactive,
}

impl Resolution {
    /// The resolved path, if any. Every other outcome is "no opinion".
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Resolved(path) => Some(path),
            _ => None,
        }
    }

    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(path) => write!(f, "resolved to {}", path.display()),
            Self::NotFound => write!(f, "not found"),
            Self::Excluded { pattern } => write!(f, "excluded by '{pattern}'"),
            Self::SatelliteSkipped => write!(f, "satellite module skipped"),
            Self::Reentrant => write!(f, "already being resolved on this thread"),
            Self::InvalidName => write!(f, "not a valid module file name"),
            Self::Inactive => write!(f, "engine inactive"),
        }
    }
}

/// A single probe of a candidate module file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// The path that was checked.
    pub candidate: PathBuf,
    /// The outcome of checking this candidate.
    pub outcome: ProbeOutcome,
}

/// Decision plus every probe made to reach it (for diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionReport {
    pub resolution: Resolution,
    pub attempts: Vec<Attempt>,
}

impl ResolutionReport {
    pub(crate) const fn without_probe(resolution: Resolution) -> Self {
        Self {
            resolution,
            attempts: Vec::new(),
        }
    }
}

/// Errors raised by engine lifecycle operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Resolution engine is already active ({0})")]
    AlreadyActive(modresolve_core::HandlerId),
}
