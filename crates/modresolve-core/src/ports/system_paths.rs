//! System path provider port.
//!
//! Platform installation directories are discovered by an adapter (see
//! `modresolve-runtime::system`). Core owns the trait and the once-only
//! caching wrapper so the engine never triggers discovery twice.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Port for discovering platform-defined probing directories.
///
/// Returning an empty list is not an error: it means the platform
/// installation could not be located.
#[cfg_attr(test, mockall::automock)]
pub trait SystemPathProvider: Send + Sync {
    /// Produce the ordered list of platform directories.
    fn discover(&self) -> Vec<PathBuf>;
}

/// Provider returning a fixed list, for composition roots and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedPathProvider {
    paths: Vec<PathBuf>,
}

impl FixedPathProvider {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Provider that never finds anything.
    pub const fn empty() -> Self {
        Self { paths: Vec::new() }
    }
}

impl SystemPathProvider for FixedPathProvider {
    fn discover(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }
}

/// Caches the output of a [`SystemPathProvider`] for the lifetime of the owner.
///
/// Discovery runs on first access and never again; blank entries are dropped.
pub struct SystemPaths {
    provider: Arc<dyn SystemPathProvider>,
    resolved: OnceLock<Arc<[PathBuf]>>,
}

impl SystemPaths {
    pub fn new(provider: Arc<dyn SystemPathProvider>) -> Self {
        Self {
            provider,
            resolved: OnceLock::new(),
        }
    }

    /// The discovered directories, computing them on first call.
    pub fn directories(&self) -> Arc<[PathBuf]> {
        Arc::clone(self.resolved.get_or_init(|| {
            let discovered: Vec<PathBuf> = self
                .provider
                .discover()
                .into_iter()
                .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty())
                .collect();
            tracing::debug!(count = discovered.len(), "Discovered system probing paths");
            discovered.into()
        }))
    }

    /// Whether discovery found no directories.
    pub fn is_empty(&self) -> bool {
        self.directories().is_empty()
    }
}

impl std::fmt::Debug for SystemPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemPaths")
            .field("resolved", &self.resolved.get())
            .finish_non_exhaustive()
    }
}
