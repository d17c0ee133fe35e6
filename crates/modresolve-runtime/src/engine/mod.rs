//! Module resolution engine.
//!
//! The engine attaches to a [`HostLoader`] and answers its module-not-found
//! notifications by probing an ordered search list: system directories
//! first, then user-registered directories.
//!
//! ## Architecture
//!
//! - `guard`: in-flight set preventing a thread from re-entering its own request
//! - `search`: combined search list (cached per registry generation) and probing
//! - `types`: `Resolution`, `Attempt`, `ResolutionReport`, `EngineError`
//! - `builder`: construction from explicit parts or from `Settings`
//!
//! ## Concurrency
//!
//! Same-name requests from different threads race: each probes on its own
//! thread. Only re-entry from the thread already resolving a name is turned
//! away. Registry updates are published as whole snapshots.

mod builder;
mod guard;
mod search;
mod types;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use modresolve_core::{
    ExclusionRules, FsProvider, HandlerId, HostLoader, ModuleRequest, NoopSink, PathEntry,
    PathRegistry, ResolveHandler, SharedLogSink, SystemPaths,
};

pub use builder::EngineBuilder;
pub use guard::{InFlight, ResolutionGuard};
pub use search::{DirectoryProber, SearchListCache, combine, find_success};
pub use types::{Attempt, EngineError, Resolution, ResolutionReport};

/// Logged once when the system path provider found nothing.
pub const MISSING_SYSTEM_PATHS_MESSAGE: &str = "Default probing paths could not be found.";

/// Options supplied when attaching the engine to its host loader.
#[derive(Clone)]
pub struct ActivationOptions {
    sink: SharedLogSink,
    skip_satellite_modules: bool,
    probing_paths: Vec<String>,
}

impl ActivationOptions {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(NoopSink),
            skip_satellite_modules: false,
            probing_paths: Vec::new(),
        }
    }

    /// Report probes and outcomes through `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: SharedLogSink) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn skip_satellite_modules(mut self, skip: bool) -> Self {
        self.skip_satellite_modules = skip;
        self
    }

    /// Seed the user registry with `;`-joined path strings.
    #[must_use]
    pub fn with_probing_paths<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: PathEntry,
    {
        self.probing_paths.extend(
            entries
                .into_iter()
                .filter_map(|entry| entry.as_joined().map(str::to_string)),
        );
        self
    }
}

impl Default for ActivationOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActivationOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationOptions")
            .field("skip_satellite_modules", &self.skip_satellite_modules)
            .field("probing_paths", &self.probing_paths)
            .finish_non_exhaustive()
    }
}

/// Lifecycle state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Inactive,
    Active(HandlerId),
}

struct Activation {
    sink: SharedLogSink,
    skip_satellite_modules: bool,
}

/// Shared state; this is the handler the host loader holds on to.
struct EngineInner {
    system: SystemPaths,
    registry: PathRegistry,
    rules: RwLock<Arc<ExclusionRules>>,
    fs: Arc<dyn FsProvider>,
    extension: String,
    guard: ResolutionGuard,
    search: SearchListCache,
    activation: RwLock<Activation>,
    active: AtomicBool,
    reported_missing_system_paths: AtomicBool,
}

impl EngineInner {
    fn activation(&self) -> (SharedLogSink, bool) {
        let activation = self
            .activation
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        (Arc::clone(&activation.sink), activation.skip_satellite_modules)
    }

    fn rules(&self) -> Arc<ExclusionRules> {
        Arc::clone(&self.rules.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn resolve(&self, request: &ModuleRequest) -> ResolutionReport {
        let name = request.name();

        if !self.active.load(Ordering::Acquire) {
            return ResolutionReport::without_probe(Resolution::Inactive);
        }

        if self.guard.is_held_by_current_thread(name) {
            tracing::trace!(module = name, "Re-entrant request short-circuited");
            return ResolutionReport::without_probe(Resolution::Reentrant);
        }

        let identity = request.identity();
        if !identity.is_file_stem() {
            tracing::debug!(module = name, "Module name is not a file name, not probing");
            return ResolutionReport::without_probe(Resolution::InvalidName);
        }
        let (sink, skip_satellite_modules) = self.activation();

        if skip_satellite_modules && identity.is_satellite() {
            tracing::debug!(module = name, "Skipping satellite module");
            return ResolutionReport::without_probe(Resolution::SatelliteSkipped);
        }

        if let Some(rule) = self.rules().find_match(&identity) {
            tracing::debug!(module = name, pattern = rule.pattern(), "Module excluded");
            return ResolutionReport::without_probe(Resolution::Excluded {
                pattern: rule.pattern().to_string(),
            });
        }

        let Some(_in_flight) = self.guard.try_enter(name) else {
            return ResolutionReport::without_probe(Resolution::Reentrant);
        };

        if let Some(requester) = request.requester() {
            sink.append(&format!("Resolving dependencies of '{requester}'."));
        }

        let directories = self.search.get(&self.system, &self.registry);
        let file_name = identity.file_name(&self.extension);
        let attempts =
            DirectoryProber::new(self.fs.as_ref(), sink.as_ref()).probe(&directories, &file_name);

        let resolution = match find_success(&attempts) {
            Some(success) => {
                sink.append(&format!(
                    "   Resolved module '{}'.",
                    success.candidate.display()
                ));
                Resolution::Resolved(success.candidate.clone())
            }
            None => {
                sink.append(&format!("   Could not resolve module '{name}'."));
                Resolution::NotFound
            }
        };
        tracing::debug!(module = name, probes = attempts.len(), %resolution, "Resolution finished");

        ResolutionReport {
            resolution,
            attempts,
        }
    }
}

impl ResolveHandler for EngineInner {
    fn on_module_not_found(&self, request: &ModuleRequest) -> Option<PathBuf> {
        self.resolve(request).resolution.into_path()
    }
}

/// Dynamic module resolution engine.
///
/// Constructed explicitly (see [`EngineBuilder`]) and owned by the
/// composition root. Detaches from the host loader when dropped.
pub struct ResolutionEngine {
    inner: Arc<EngineInner>,
    host: Arc<dyn HostLoader>,
    state: Mutex<EngineState>,
}

impl ResolutionEngine {
    /// Start building an engine attached to `host`.
    pub fn builder(host: Arc<dyn HostLoader>) -> EngineBuilder {
        EngineBuilder::new(host)
    }

    /// Attach to the host loader's module-not-found notification.
    ///
    /// Stores the sink and satellite flag, seeds the user registry and, when
    /// system discovery found nothing, reports it once through the sink.
    /// Activating an already active engine is refused and changes nothing.
    pub fn activate(&self, options: ActivationOptions) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let EngineState::Active(id) = *state {
            return Err(EngineError::AlreadyActive(id));
        }

        let ActivationOptions {
            sink,
            skip_satellite_modules,
            probing_paths,
        } = options;

        let report_missing = self.inner.system.is_empty()
            && !self
                .inner
                .reported_missing_system_paths
                .swap(true, Ordering::AcqRel);

        *self
            .inner
            .activation
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Activation {
            sink: Arc::clone(&sink),
            skip_satellite_modules,
        };
        self.inner.registry.add_paths(&probing_paths);
        self.inner.active.store(true, Ordering::Release);

        let handler: Arc<dyn ResolveHandler> = Arc::clone(&self.inner) as Arc<dyn ResolveHandler>;
        let id = self.host.attach(handler);
        *state = EngineState::Active(id);
        drop(state);

        // Sink runs outside the state lock; it may call back into the engine
        if report_missing {
            sink.append(MISSING_SYSTEM_PATHS_MESSAGE);
        }

        tracing::debug!(%id, "Resolution engine activated");
        Ok(())
    }

    /// Detach from the host loader. No-op when inactive.
    ///
    /// Returns whether a handler was detached.
    pub fn deactivate(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let EngineState::Active(id) = *state else {
            return false;
        };

        self.inner.active.store(false, Ordering::Release);
        let detached = self.host.detach(id);
        *state = EngineState::Inactive;

        tracing::debug!(%id, detached, "Resolution engine deactivated");
        true
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state(), EngineState::Active(_))
    }

    /// Register additional `;`-joined probing paths. Valid in any state.
    pub fn add_paths<I>(&self, entries: I)
    where
        I: IntoIterator,
        I::Item: PathEntry,
    {
        self.inner.registry.add_paths(entries);
    }

    /// The handler logic: a path for the loader, or `None` for "no opinion".
    pub fn try_resolve(&self, request: &ModuleRequest) -> Option<PathBuf> {
        self.inner.on_module_not_found(request)
    }

    /// Like [`Self::try_resolve`], also returning every probe made.
    pub fn resolve(&self, request: &ModuleRequest) -> ResolutionReport {
        self.inner.resolve(request)
    }

    /// Replace the exclusion table. In-flight resolutions keep the old one.
    pub fn set_exclusion_rules(&self, rules: ExclusionRules) {
        *self
            .inner
            .rules
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(rules);
    }

    pub fn exclusion_rules(&self) -> Arc<ExclusionRules> {
        self.inner.rules()
    }

    /// System directories (discovered once).
    pub fn system_paths(&self) -> Arc<[PathBuf]> {
        self.inner.system.directories()
    }

    /// User directories, in registration order.
    pub fn user_paths(&self) -> Arc<[String]> {
        self.inner.registry.paths()
    }

    /// Combined, deduplicated search list in probing order.
    pub fn search_list(&self) -> Arc<[PathBuf]> {
        self.inner.search.get(&self.inner.system, &self.inner.registry)
    }

    /// Module file extension appended to bare names.
    pub fn module_extension(&self) -> &str {
        &self.inner.extension
    }

    /// Whether any thread is currently resolving `name`.
    pub fn is_resolving(&self, name: &str) -> bool {
        self.inner.guard.contains(name)
    }
}

impl Drop for ResolutionEngine {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("state", &self.state())
            .field("extension", &self.inner.extension)
            .field("user_paths", &self.user_paths())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
