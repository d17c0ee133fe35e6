//! Core domain types, ports and path registry for modresolve.
//!
//! This crate is pure: it defines what a module request is, how probing
//! directories are registered, which modules are known to be absent, and the
//! ports through which the resolution engine talks to the host loader, the
//! filesystem, the environment and the log sink. The engine itself lives in
//! `modresolve-runtime`.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod exclusion;
pub mod ports;
pub mod registry;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{ModuleIdentity, ModuleRequest};
pub use exclusion::{
    DEFAULT_OWN_NAMESPACE, ExclusionRule, ExclusionRules, KNOWN_ABSENT_PATTERNS, RuleError,
};
pub use ports::{
    EnvProvider, FixedPathProvider, FsProvider, HandlerId, HostLoader, LogSink, NoopSink,
    ProbeOutcome, ResolveHandler, SharedLogSink, SystemEnv, SystemFs, SystemPathProvider,
    SystemPaths, TracingSink,
};
pub use registry::{PATH_DELIMITER, PathEntry, PathRegistry, split_joined};
pub use settings::{
    ENV_INSTALL_ROOT, ENV_MODULE_EXTENSION, ENV_PROBING_PATHS, ENV_SKIP_SATELLITES, Settings,
    SettingsError, SettingsUpdate, default_settings_path, validate_settings,
};
