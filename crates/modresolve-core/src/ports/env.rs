//! Environment port read by settings overrides and install-root discovery.
//!
//! Only the `MODRESOLVE_*` variables are consulted, and all of them hold
//! text (paths, booleans, an extension), so values are exposed as UTF-8.

use std::collections::HashMap;

/// Source of `MODRESOLVE_*` overrides.
pub trait EnvProvider: Send + Sync {
    /// Value of `key`; unset and non-unicode variables are both `None`.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvProvider for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvProvider for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Fixed set of variables for tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockEnv {
    vars: HashMap<String, String>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl EnvProvider for MockEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.var(key)
    }
}
