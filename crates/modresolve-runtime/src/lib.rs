//! Module resolution engine and reference host loader for modresolve.
//!
//! - [`engine`]: the resolution engine attached to a host loader
//! - [`host`]: `ModuleHost`, an in-process loader exposing the
//!   module-not-found notification the engine subscribes to
//! - [`system`]: system probing path discovery from the installation root
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use modresolve_core::{ModuleRequest, TracingSink};
//! use modresolve_runtime::{ActivationOptions, ModuleHost, ResolutionEngine};
//!
//! let host = Arc::new(ModuleHost::new("dll"));
//! let engine = ResolutionEngine::builder(host.clone()).build();
//! engine
//!     .activate(
//!         ActivationOptions::new()
//!             .with_sink(Arc::new(TracingSink))
//!             .with_probing_paths(["/opt/vendor/lib;/opt/vendor/plugins"]),
//!     )
//!     .unwrap();
//!
//! let module = host.load(&ModuleRequest::new("Vendor.Tools, Version=1.0.0.0"));
//! engine.deactivate();
//! ```

#![deny(unused_crate_dependencies)]

pub mod engine;
pub mod host;
pub mod system;

pub use engine::{
    ActivationOptions, Attempt, EngineBuilder, EngineError, EngineState,
    MISSING_SYSTEM_PATHS_MESSAGE, Resolution, ResolutionEngine, ResolutionReport,
};
pub use host::{FileMapper, LoadError, LoadSource, LoadedModule, ModuleHost, ModuleMapper};
pub use system::InstallRootProvider;
