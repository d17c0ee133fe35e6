//! Settings domain types, loading and validation.
//!
//! Settings are layered: defaults, then an optional JSON file, then
//! environment overrides. All fields are optional so partial files and
//! partial updates merge cleanly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::exclusion::{DEFAULT_OWN_NAMESPACE, ExclusionRule, ExclusionRules, RuleError};
use crate::ports::EnvProvider;
use crate::registry::split_joined;

/// Joined probing paths appended to the user registry.
pub const ENV_PROBING_PATHS: &str = "MODRESOLVE_PROBING_PATHS";
/// `true`/`false` toggle for satellite skipping.
pub const ENV_SKIP_SATELLITES: &str = "MODRESOLVE_SKIP_SATELLITES";
/// Module file extension override.
pub const ENV_MODULE_EXTENSION: &str = "MODRESOLVE_MODULE_EXTENSION";
/// Platform installation root.
pub const ENV_INSTALL_ROOT: &str = "MODRESOLVE_INSTALL_ROOT";

/// Subdirectories of the installation root probed after the root itself.
pub const DEFAULT_INSTALL_SUBDIRS: &[&str] = &["Developer Tools", "SDK/Utilities/PipelineTools"];

/// Name of the settings file inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// `;`-joined user probing paths registered at activation.
    pub probing_paths: Option<String>,

    /// Whether satellite (`*.resources`) modules are skipped without probing.
    pub skip_satellite_modules: Option<bool>,

    /// Module file extension, without the leading dot.
    pub module_extension: Option<String>,

    /// Namespace whose resource and serializer satellites are never present.
    pub own_namespace: Option<String>,

    /// Exclusion patterns. Replaces the default table when set.
    pub exclusion_patterns: Option<Vec<String>>,

    /// Platform installation root used for system probing paths.
    pub install_root: Option<String>,

    /// Subdirectories of `install_root` probed after the root.
    pub install_subdirs: Option<Vec<String>>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            probing_paths: None,
            skip_satellite_modules: Some(false),
            module_extension: Some(std::env::consts::DLL_EXTENSION.to_string()),
            own_namespace: Some(DEFAULT_OWN_NAMESPACE.to_string()),
            exclusion_patterns: None,
            install_root: None,
            install_subdirs: Some(
                DEFAULT_INSTALL_SUBDIRS
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect(),
            ),
        }
    }

    /// Effective module extension (with default fallback).
    pub fn effective_module_extension(&self) -> &str {
        self.module_extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.'))
            .unwrap_or(std::env::consts::DLL_EXTENSION)
    }

    /// Effective satellite-skip flag.
    pub fn effective_skip_satellite_modules(&self) -> bool {
        self.skip_satellite_modules.unwrap_or(false)
    }

    /// Effective installation subdirectories.
    pub fn effective_install_subdirs(&self) -> Vec<String> {
        self.install_subdirs.clone().unwrap_or_else(|| {
            DEFAULT_INSTALL_SUBDIRS
                .iter()
                .map(|s| (*s).to_string())
                .collect()
        })
    }

    /// User probing paths split into fragments.
    pub fn probing_path_list(&self) -> Vec<String> {
        split_joined(self.probing_paths.as_deref())
    }

    /// Build the exclusion table described by these settings.
    pub fn exclusion_rules(&self) -> Result<ExclusionRules, RuleError> {
        if let Some(ref patterns) = self.exclusion_patterns {
            return ExclusionRules::from_patterns(patterns);
        }
        let namespace = self.own_namespace.as_deref().unwrap_or(DEFAULT_OWN_NAMESPACE);
        ExclusionRules::with_defaults(namespace)
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref paths) = other.probing_paths {
            self.probing_paths.clone_from(paths);
        }
        if let Some(skip) = other.skip_satellite_modules {
            self.skip_satellite_modules = skip;
        }
        if let Some(ref ext) = other.module_extension {
            self.module_extension.clone_from(ext);
        }
        if let Some(ref ns) = other.own_namespace {
            self.own_namespace.clone_from(ns);
        }
        if let Some(ref patterns) = other.exclusion_patterns {
            self.exclusion_patterns.clone_from(patterns);
        }
        if let Some(ref root) = other.install_root {
            self.install_root.clone_from(root);
        }
        if let Some(ref subdirs) = other.install_subdirs {
            self.install_subdirs.clone_from(subdirs);
        }
    }

    /// Apply environment overrides on top of these settings.
    ///
    /// Probing paths from the environment are appended to the configured
    /// ones rather than replacing them.
    pub fn apply_env(&mut self, env: &dyn EnvProvider) -> Result<(), SettingsError> {
        if let Some(extra) = env.var(ENV_PROBING_PATHS) {
            self.probing_paths = Some(match self.probing_paths.take() {
                Some(existing) if !existing.trim().is_empty() => format!("{existing};{extra}"),
                _ => extra,
            });
        }
        if let Some(raw) = env.var(ENV_SKIP_SATELLITES) {
            self.skip_satellite_modules = Some(parse_bool(ENV_SKIP_SATELLITES, &raw)?);
        }
        if let Some(ext) = env.var(ENV_MODULE_EXTENSION) {
            self.module_extension = Some(ext);
        }
        if let Some(root) = env.var(ENV_INSTALL_ROOT) {
            self.install_root = Some(root);
        }
        Ok(())
    }

    /// Read settings from a JSON file, layered over the defaults.
    pub fn load_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let update: SettingsUpdate =
            serde_json::from_str(&contents).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let mut settings = Self::with_defaults();
        settings.merge(&update);
        Ok(settings)
    }

    /// Load settings: defaults, then `path` (or the default file when it
    /// exists), then environment overrides. The result is validated.
    pub fn load(path: Option<&Path>, env: &dyn EnvProvider) -> Result<Self, SettingsError> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| default_settings_path().filter(|p| p.is_file()));

        let mut settings = match file {
            Some(ref file) => {
                tracing::debug!(path = %file.display(), "Loading settings file");
                Self::load_file(file)?
            }
            None => Self::with_defaults(),
        };
        settings.apply_env(env)?;
        validate_settings(&settings)?;
        Ok(settings)
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, with = "double_option")]
    pub probing_paths: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub skip_satellite_modules: Option<Option<bool>>,
    #[serde(default, with = "double_option")]
    pub module_extension: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub own_namespace: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub exclusion_patterns: Option<Option<Vec<String>>>,
    #[serde(default, with = "double_option")]
    pub install_root: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub install_subdirs: Option<Option<Vec<String>>>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::option_option)]
    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    #[allow(clippy::option_option)]
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Settings loading or validation error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Module extension cannot be empty")]
    EmptyExtension,

    #[error("Module extension must not contain path separators, got '{0}'")]
    InvalidExtension(String),

    #[error("Environment variable {key} must be true or false, got '{value}'")]
    InvalidBool { key: String, value: String },

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("Failed to read settings file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse settings file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref ext) = settings.module_extension {
        let trimmed = ext.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(SettingsError::EmptyExtension);
        }
        if trimmed.contains(['/', '\\']) {
            return Err(SettingsError::InvalidExtension(ext.clone()));
        }
    }

    if let Some(ref patterns) = settings.exclusion_patterns {
        for pattern in patterns {
            ExclusionRule::new(pattern)?;
        }
    }

    if let Some(ref ns) = settings.own_namespace {
        if !ns.trim().is_empty() {
            ExclusionRule::own_namespace(ns)?;
        }
    }

    Ok(())
}

/// Default location of the settings file (`<config dir>/modresolve/settings.json`).
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("modresolve").join(SETTINGS_FILE_NAME))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidBool {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
