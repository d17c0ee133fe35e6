//! System probing path discovery from the platform installation root.
//!
//! The installation root is read from an explicit override or from
//! `MODRESOLVE_INSTALL_ROOT`. When neither is set the platform is considered
//! not installed and discovery yields nothing; that is reported by the
//! engine, never raised.

use std::path::PathBuf;
use std::sync::Arc;

use modresolve_core::settings::DEFAULT_INSTALL_SUBDIRS;
use modresolve_core::{ENV_INSTALL_ROOT, EnvProvider, Settings, SystemPathProvider};

/// Discovers `[root, root/<subdir>...]` below the platform installation root.
pub struct InstallRootProvider {
    root: Option<String>,
    subdirs: Vec<String>,
    env: Arc<dyn EnvProvider>,
}

impl InstallRootProvider {
    /// Provider reading the root from `env`, with the default subdirectories.
    pub fn new(env: Arc<dyn EnvProvider>) -> Self {
        Self {
            root: None,
            subdirs: DEFAULT_INSTALL_SUBDIRS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            env,
        }
    }

    pub fn from_settings(settings: &Settings, env: Arc<dyn EnvProvider>) -> Self {
        let mut provider = Self::new(env).with_subdirs(settings.effective_install_subdirs());
        provider.root.clone_from(&settings.install_root);
        provider
    }

    /// Use `root` instead of the environment variable.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Subdirectories (with `/` separators) probed after the root.
    #[must_use]
    pub fn with_subdirs<I, S>(mut self, subdirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdirs = subdirs.into_iter().map(Into::into).collect();
        self
    }

    fn install_root(&self) -> Option<PathBuf> {
        self.root
            .clone()
            .or_else(|| self.env.var(ENV_INSTALL_ROOT))
            .map(|root| root.trim().to_string())
            .filter(|root| !root.is_empty())
            .map(PathBuf::from)
    }
}

impl SystemPathProvider for InstallRootProvider {
    fn discover(&self) -> Vec<PathBuf> {
        let Some(root) = self.install_root() else {
            tracing::debug!("Platform installation root not configured");
            return Vec::new();
        };

        let mut paths = vec![root.clone()];
        for subdir in &self.subdirs {
            let mut path = root.clone();
            path.extend(subdir.split(['/', '\\']).filter(|c| !c.trim().is_empty()));
            if path != root {
                paths.push(path);
            }
        }
        tracing::debug!(root = %root.display(), count = paths.len(), "Discovered installation paths");
        paths
    }
}
