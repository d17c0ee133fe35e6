//! Filesystem port used by the directory probe.

use std::path::Path;

/// Outcome of checking a single candidate module file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A regular file exists at the candidate path.
    Found,
    /// Path does not exist.
    NotFound,
    /// Path exists but is not a file (e.g., directory).
    NotAFile,
    /// Permission denied when checking the path.
    PermissionDenied,
    /// Other I/O error occurred.
    IoError(String),
}

impl ProbeOutcome {
    /// Whether the candidate can be handed to the loader.
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found => write!(f, "found"),
            Self::NotFound => write!(f, "not found"),
            Self::NotAFile => write!(f, "not a file"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

/// Trait for filesystem operations (injectable for testing).
pub trait FsProvider: Send + Sync {
    /// Check whether a module file exists at `path`.
    ///
    /// Implementations report failures through the outcome instead of
    /// returning errors; every outcome other than `Found` is a miss.
    fn check_file(&self, path: &Path) -> ProbeOutcome;
}

/// Production filesystem provider that uses real filesystem operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFs;

impl FsProvider for SystemFs {
    fn check_file(&self, path: &Path) -> ProbeOutcome {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => ProbeOutcome::Found,
            Ok(_) => ProbeOutcome::NotAFile,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProbeOutcome::NotFound,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ProbeOutcome::PermissionDenied
            }
            Err(e) => ProbeOutcome::IoError(e.to_string()),
        }
    }
}

/// Test/mock filesystem provider with predefined files.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockFs {
    files: std::collections::HashSet<std::path::PathBuf>,
    failures: std::collections::HashMap<std::path::PathBuf, String>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    #[must_use]
    pub fn with_failure(
        mut self,
        path: impl Into<std::path::PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        self.failures.insert(path.into(), message.into());
        self
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl FsProvider for MockFs {
    fn check_file(&self, path: &Path) -> ProbeOutcome {
        if let Some(message) = self.failures.get(path) {
            ProbeOutcome::IoError(message.clone())
        } else if self.files.contains(path) {
            ProbeOutcome::Found
        } else {
            ProbeOutcome::NotFound
        }
    }
}
