//! User probing path registry.
//!
//! Callers register directories at any time, before or after activation, as
//! `;`-joined strings. The registry normalizes, deduplicates and publishes
//! them as immutable snapshots so in-flight resolutions never observe a
//! partially updated list.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Separator between paths inside a single joined entry.
pub const PATH_DELIMITER: char = ';';

/// A single registration entry that may be absent.
///
/// Implemented for string types and for `Option` of them, so both
/// `["a;b"]` and `[None::<&str>]` are accepted by [`PathRegistry::add_paths`].
pub trait PathEntry {
    /// The joined path string, or `None` if the entry is absent.
    fn as_joined(&self) -> Option<&str>;
}

impl PathEntry for str {
    fn as_joined(&self) -> Option<&str> {
        Some(self)
    }
}

impl PathEntry for String {
    fn as_joined(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: PathEntry + ?Sized> PathEntry for &T {
    fn as_joined(&self) -> Option<&str> {
        (**self).as_joined()
    }
}

impl<T: PathEntry> PathEntry for Option<T> {
    fn as_joined(&self) -> Option<&str> {
        self.as_ref().and_then(PathEntry::as_joined)
    }
}

/// Split joined entries into trimmed, non-blank fragments in input order.
pub fn split_joined<I>(entries: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: PathEntry,
{
    let mut fragments = Vec::new();
    for entry in entries {
        let Some(joined) = entry.as_joined() else {
            continue;
        };
        fragments.extend(
            joined
                .split(PATH_DELIMITER)
                .map(str::trim)
                .filter(|fragment| !fragment.is_empty())
                .map(str::to_string),
        );
    }
    fragments
}

#[derive(Debug, Default)]
struct Snapshot {
    paths: Arc<[String]>,
    generation: u64,
}

/// Append-only, deduplicating registry of user probing directories.
#[derive(Debug, Default)]
pub struct PathRegistry {
    state: RwLock<Snapshot>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register joined path strings.
    ///
    /// Absent sequences and absent entries are ignored, fragments are
    /// trimmed, blank fragments discarded and duplicates (within the call
    /// or against earlier registrations) collapsed in first-seen order.
    pub fn add_paths<I>(&self, entries: I)
    where
        I: IntoIterator,
        I::Item: PathEntry,
    {
        let fragments = split_joined(entries);
        if fragments.is_empty() {
            return;
        }

        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut seen: HashSet<&str> = state.paths.iter().map(String::as_str).collect();
        let added: Vec<&String> = fragments
            .iter()
            .filter(|fragment| seen.insert(fragment.as_str()))
            .collect();
        if added.is_empty() {
            return;
        }

        let merged: Vec<String> = state.paths.iter().chain(added).cloned().collect();
        tracing::debug!(count = merged.len(), "Registered user probing paths");
        state.paths = merged.into();
        state.generation += 1;
    }

    /// Current ordered, deduplicated list. Empty when nothing is registered.
    pub fn paths(&self) -> Arc<[String]> {
        Arc::clone(&self.read().paths)
    }

    /// Current list together with its generation, read atomically.
    pub fn snapshot(&self) -> (u64, Arc<[String]>) {
        let state = self.read();
        (state.generation, Arc::clone(&state.paths))
    }

    /// Counter bumped every time the list actually changes.
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Remove every registered path.
    pub fn clear(&self) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !state.paths.is_empty() {
            state.paths = Arc::from(Vec::new());
            state.generation += 1;
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
