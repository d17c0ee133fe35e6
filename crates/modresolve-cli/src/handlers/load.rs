//! Load command handler.
//!
//! Loads a module through the host with the engine attached, so the
//! engine is only consulted when the host's own lookup fails.

use anyhow::Result;
use modresolve_core::{ModuleRequest, SharedLogSink};
use modresolve_runtime::{LoadSource, LoadedModule};

use super::stdout_sink;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the load command.
pub fn execute(ctx: &CliContext, name: &str, extra_paths: &[String]) -> Result<()> {
    let module = run(ctx, name, extra_paths, stdout_sink())?;
    println!("{}", describe(&module));
    Ok(())
}

/// Activate, load once and deactivate regardless of the outcome.
pub fn run(
    ctx: &CliContext,
    name: &str,
    extra_paths: &[String],
    sink: SharedLogSink,
) -> Result<LoadedModule, CliError> {
    ctx.engine.activate(ctx.activation(extra_paths, sink))?;
    let loaded = ctx.host.load(&ModuleRequest::new(name));
    ctx.engine.deactivate();
    loaded.map_err(CliError::from)
}

pub fn describe(module: &LoadedModule) -> String {
    let source = match module.source {
        LoadSource::Default => "host default directory".to_string(),
        LoadSource::Handler(id) => format!("resolution {id}"),
    };
    format!(
        "Loaded '{}' from '{}' ({} bytes, via {source})",
        module.identity,
        module.path.display(),
        module.size
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use modresolve_core::ports::{MemorySink, MockEnv};

    use super::*;
    use crate::bootstrap::{CliConfig, bootstrap_with_env};

    #[test]
    fn test_load_through_engine_and_release_handler() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        std::fs::write(&settings, r#"{ "module_extension": ".dll" }"#).unwrap();
        let plugins = dir.path().join("plugins");
        std::fs::create_dir(&plugins).unwrap();
        std::fs::write(plugins.join("Vendor.Tools.dll"), b"MZ\0\0").unwrap();
        let ctx = bootstrap_with_env(
            &CliConfig {
                settings_path: Some(settings),
            },
            Arc::new(MockEnv::new()),
        )
        .unwrap();

        let module = run(
            &ctx,
            "Vendor.Tools",
            &[plugins.to_string_lossy().into_owned()],
            Arc::new(MemorySink::new()),
        )
        .unwrap();

        assert_eq!(module.path, plugins.join("Vendor.Tools.dll"));
        assert_eq!(module.size, 4);
        assert!(describe(&module).contains("via resolution handler#"));
        assert_eq!(ctx.host.handler_count(), 0);

        let err = run(&ctx, "Vendor.Other", &[], Arc::new(MemorySink::new())).unwrap_err();
        assert!(matches!(err, CliError::Load(_)));
        assert!(!ctx.engine.is_active());
    }
}
