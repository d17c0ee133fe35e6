//! CLI bootstrap - the composition root.
//!
//! Settings are loaded here and turned into a `ModuleHost` with a
//! `ResolutionEngine` bound to it. Handlers receive the composed context and
//! decide when to activate the engine.

use std::path::PathBuf;
use std::sync::Arc;

use modresolve_core::{EnvProvider, Settings, SharedLogSink, SystemEnv};
use modresolve_runtime::{ActivationOptions, EngineBuilder, ModuleHost, ResolutionEngine};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit settings file; the default location is used when absent.
    pub settings_path: Option<PathBuf>,
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub settings: Settings,
    pub host: Arc<ModuleHost>,
    pub engine: ResolutionEngine,
}

impl CliContext {
    /// Activation options from settings plus per-invocation directories.
    pub fn activation(&self, extra_paths: &[String], sink: SharedLogSink) -> ActivationOptions {
        ActivationOptions::new()
            .with_sink(sink)
            .skip_satellite_modules(self.settings.effective_skip_satellite_modules())
            .with_probing_paths(
                self.settings
                    .probing_path_list()
                    .into_iter()
                    .chain(extra_paths.iter().cloned()),
            )
    }
}

/// Compose the CLI context from the process environment.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    bootstrap_with_env(config, Arc::new(SystemEnv))
}

/// Compose the CLI context reading overrides from `env`.
pub fn bootstrap_with_env(
    config: &CliConfig,
    env: Arc<dyn EnvProvider>,
) -> Result<CliContext, CliError> {
    let settings = Settings::load(config.settings_path.as_deref(), env.as_ref())?;
    tracing::debug!(?settings, "Settings loaded");

    let host = Arc::new(ModuleHost::new(settings.effective_module_extension()));
    let engine = EngineBuilder::from_settings(host.clone(), &settings, env)?.build();

    Ok(CliContext {
        settings,
        host,
        engine,
    })
}
