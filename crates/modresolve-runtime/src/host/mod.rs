//! Reference host loader.
//!
//! `ModuleHost` plays the part of the platform's module loader: it looks in
//! its own default directories first, and when that fails it notifies the
//! attached [`ResolveHandler`]s in attach order. The first handler that
//! answers with a path wins; the host maps that file itself and does not
//! fall back to later handlers if mapping fails.
//!
//! Handlers are invoked without any host lock held, so a handler (or the
//! mapper) may call back into [`ModuleHost::load`] on the same thread.

mod mapper;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use modresolve_core::{
    FsProvider, HandlerId, HostLoader, ModuleIdentity, ModuleRequest, ResolveHandler, SystemFs,
};
use thiserror::Error;

pub use mapper::{FileMapper, ModuleMapper};

/// Where a loaded module was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// One of the host's own default directories.
    Default,
    /// An attached handler supplied the path.
    Handler(HandlerId),
}

/// A module the host has mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub identity: ModuleIdentity,
    pub path: PathBuf,
    pub size: u64,
    pub source: LoadSource,
}

/// Errors returned by [`ModuleHost::load`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not load module '{name}': not found")]
    NotFound { name: String },

    #[error("Failed to map module file {path}: {reason}")]
    MapFailed { path: PathBuf, reason: String },
}

type Handlers = Vec<(HandlerId, Arc<dyn ResolveHandler>)>;

/// In-process module loader with module-not-found notifications.
pub struct ModuleHost {
    handlers: RwLock<Handlers>,
    next_id: AtomicU64,
    default_dirs: Vec<PathBuf>,
    extension: String,
    fs: Arc<dyn FsProvider>,
    mapper: Arc<dyn ModuleMapper>,
    loaded: RwLock<HashMap<String, LoadedModule>>,
}

impl ModuleHost {
    /// Host with no default directories, mapping files from disk.
    pub fn new(extension: impl AsRef<str>) -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            default_dirs: Vec::new(),
            extension: extension.as_ref().trim_start_matches('.').to_string(),
            fs: Arc::new(SystemFs),
            mapper: Arc::new(FileMapper),
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Directories the host searches itself before notifying handlers.
    #[must_use]
    pub fn with_default_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.default_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_filesystem(mut self, fs: Arc<dyn FsProvider>) -> Self {
        self.fs = fs;
        self
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: Arc<dyn ModuleMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Load a module, notifying handlers when the default lookup fails.
    pub fn load(&self, request: &ModuleRequest) -> Result<LoadedModule, LoadError> {
        let identity = request.identity();

        if let Some(module) = self.cached(&identity.name) {
            return Ok(module);
        }

        let file_name = identity.file_name(&self.extension);
        let default_hit = self
            .default_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| self.fs.check_file(candidate).is_found());
        if let Some(path) = default_hit {
            return self.map(identity, &path, LoadSource::Default);
        }

        tracing::debug!(module = request.name(), "Module not found, notifying handlers");
        for (id, handler) in self.handlers_snapshot() {
            if let Some(path) = handler.on_module_not_found(request) {
                return self.map(identity, &path, LoadSource::Handler(id));
            }
        }

        Err(LoadError::NotFound {
            name: request.name().to_string(),
        })
    }

    /// Whether a module with this bare name has been loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.cached(name).is_some()
    }

    /// Every loaded module, in no particular order.
    pub fn loaded_modules(&self) -> Vec<LoadedModule> {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn handlers_snapshot(&self) -> Handlers {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn cached(&self, name: &str) -> Option<LoadedModule> {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn map(
        &self,
        identity: ModuleIdentity,
        path: &Path,
        source: LoadSource,
    ) -> Result<LoadedModule, LoadError> {
        let size = self
            .mapper
            .map(&identity, path)
            .map_err(|e| LoadError::MapFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let module = LoadedModule {
            identity,
            path: path.to_path_buf(),
            size,
            source,
        };
        tracing::debug!(module = %module.identity.name, path = %path.display(), "Module mapped");

        let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        Ok(loaded
            .entry(module.identity.name.clone())
            .or_insert(module)
            .clone())
    }
}

impl HostLoader for ModuleHost {
    fn attach(&self, handler: Arc<dyn ResolveHandler>) -> HandlerId {
        let id = HandlerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, handler));
        id
    }

    fn detach(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(attached, _)| *attached != id);
        handlers.len() != before
    }
}

impl std::fmt::Debug for ModuleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHost")
            .field("default_dirs", &self.default_dirs)
            .field("extension", &self.extension)
            .field("handlers", &self.handler_count())
            .finish_non_exhaustive()
    }
}
