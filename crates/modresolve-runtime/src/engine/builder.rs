//! Engine construction.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, RwLock};

use modresolve_core::{
    EnvProvider, ExclusionRules, FixedPathProvider, FsProvider, HostLoader, NoopSink,
    PathRegistry, Settings, SettingsError, SystemFs, SystemPathProvider, SystemPaths,
    validate_settings,
};

use super::guard::ResolutionGuard;
use super::search::SearchListCache;
use super::{Activation, EngineInner, EngineState, ResolutionEngine};
use crate::system::InstallRootProvider;

/// Builder for [`ResolutionEngine`].
///
/// Defaults: no system paths, the real filesystem, the platform dynamic
/// library extension and the built-in exclusion table
/// ([`ExclusionRules::defaults`]). Pass [`ExclusionRules::none`] to probe
/// every name.
pub struct EngineBuilder {
    host: Arc<dyn HostLoader>,
    system: Arc<dyn SystemPathProvider>,
    fs: Arc<dyn FsProvider>,
    extension: String,
    rules: ExclusionRules,
}

impl EngineBuilder {
    pub fn new(host: Arc<dyn HostLoader>) -> Self {
        Self {
            host,
            system: Arc::new(FixedPathProvider::empty()),
            fs: Arc::new(SystemFs),
            extension: std::env::consts::DLL_EXTENSION.to_string(),
            rules: ExclusionRules::defaults(),
        }
    }

    /// Configure a builder from validated settings.
    ///
    /// System paths come from the installation root (settings override,
    /// then `env`), exclusions from the configured table or the defaults.
    pub fn from_settings(
        host: Arc<dyn HostLoader>,
        settings: &Settings,
        env: Arc<dyn EnvProvider>,
    ) -> Result<Self, SettingsError> {
        validate_settings(settings)?;
        let provider = InstallRootProvider::from_settings(settings, env);
        Ok(Self::new(host)
            .system_paths(Arc::new(provider))
            .module_extension(settings.effective_module_extension())
            .exclusion_rules(settings.exclusion_rules()?))
    }

    #[must_use]
    pub fn system_paths(mut self, provider: Arc<dyn SystemPathProvider>) -> Self {
        self.system = provider;
        self
    }

    #[must_use]
    pub fn filesystem(mut self, fs: Arc<dyn FsProvider>) -> Self {
        self.fs = fs;
        self
    }

    /// Extension appended to bare module names (leading dot optional).
    #[must_use]
    pub fn module_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim().trim_start_matches('.').to_string();
        self
    }

    #[must_use]
    pub fn exclusion_rules(mut self, rules: ExclusionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn build(self) -> ResolutionEngine {
        let inner = EngineInner {
            system: SystemPaths::new(self.system),
            registry: PathRegistry::new(),
            rules: RwLock::new(Arc::new(self.rules)),
            fs: self.fs,
            extension: self.extension,
            guard: ResolutionGuard::new(),
            search: SearchListCache::new(),
            activation: RwLock::new(Activation {
                sink: Arc::new(NoopSink),
                skip_satellite_modules: false,
            }),
            active: AtomicBool::new(false),
            reported_missing_system_paths: AtomicBool::new(false),
        };

        ResolutionEngine {
            inner: Arc::new(inner),
            host: self.host,
            state: Mutex::new(EngineState::Inactive),
        }
    }
}
