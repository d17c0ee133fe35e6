//! Combined search list and directory probing.

use std::collections::HashSet;
use std::ffi::OsString;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use modresolve_core::{FsProvider, LogSink, PathRegistry, ProbeOutcome, SystemPaths};

use super::types::Attempt;

/// Concatenate system and user directories, dropping exact duplicates.
///
/// System directories come first; within each group registration order is
/// kept, so earlier entries take precedence.
pub fn combine(system: &[PathBuf], user: &[String]) -> Vec<PathBuf> {
    let mut seen: HashSet<OsString> = HashSet::new();
    system
        .iter()
        .cloned()
        .chain(user.iter().map(PathBuf::from))
        .filter(|dir| seen.insert(dir.as_os_str().to_os_string()))
        .collect()
}

#[derive(Debug)]
struct Cached {
    generation: u64,
    directories: Arc<[PathBuf]>,
}

/// Search list cached per user-registry generation.
#[derive(Debug, Default)]
pub struct SearchListCache {
    cached: RwLock<Option<Cached>>,
}

impl SearchListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current search list, rebuilt only when the registry has changed.
    pub fn get(&self, system: &SystemPaths, registry: &PathRegistry) -> Arc<[PathBuf]> {
        let (generation, user) = registry.snapshot();

        if let Some(cached) = self
            .cached
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .filter(|cached| cached.generation == generation)
        {
            return Arc::clone(&cached.directories);
        }

        let directories: Arc<[PathBuf]> = combine(&system.directories(), &user).into();
        let mut slot = self
            .cached
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if slot.as_ref().is_none_or(|cached| cached.generation <= generation) {
            *slot = Some(Cached {
                generation,
                directories: Arc::clone(&directories),
            });
        }
        directories
    }
}

/// Probes candidate directories in order for a module file.
pub struct DirectoryProber<'a> {
    fs: &'a dyn FsProvider,
    sink: &'a dyn LogSink,
}

impl<'a> DirectoryProber<'a> {
    pub fn new(fs: &'a dyn FsProvider, sink: &'a dyn LogSink) -> Self {
        Self { fs, sink }
    }

    /// Probe `directories` for `file_name`, stopping at the first match.
    ///
    /// Failures of the filesystem port, including panics, count as a miss
    /// for that directory and the scan moves on.
    pub fn probe(&self, directories: &[PathBuf], file_name: &str) -> Vec<Attempt> {
        let mut attempts = Vec::new();

        for dir in directories {
            let candidate = dir.join(file_name);
            self.sink.append(&format!("   Probing '{}'.", candidate.display()));

            let outcome = catch_unwind(AssertUnwindSafe(|| self.fs.check_file(&candidate)))
                .unwrap_or_else(|_| ProbeOutcome::IoError("filesystem probe panicked".to_string()));
            tracing::trace!(candidate = %candidate.display(), %outcome, "Probed candidate");

            let found = outcome.is_found();
            attempts.push(Attempt { candidate, outcome });
            if found {
                return attempts; // Early return on first success
            }
        }

        attempts
    }
}

/// Find the first successful attempt in a list.
pub fn find_success(attempts: &[Attempt]) -> Option<&Attempt> {
    attempts.iter().find(|a| a.outcome.is_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modresolve_core::FixedPathProvider;
    use modresolve_core::ports::{MemorySink, MockFs};

    #[test]
    fn test_combine_orders_system_first_and_dedups() {
        let system = vec![PathBuf::from("/s1"), PathBuf::from("/s2")];
        let user = vec!["/u1".to_string(), "/s1".to_string(), "/u1".to_string()];

        assert_eq!(
            combine(&system, &user),
            [
                PathBuf::from("/s1"),
                PathBuf::from("/s2"),
                PathBuf::from("/u1")
            ]
        );
    }

    #[test]
    fn test_combine_dedups_by_exact_string() {
        let system = vec![PathBuf::from("/s1/")];
        let user = vec!["/s1".to_string()];

        // Trailing separator makes it a different registration
        assert_eq!(combine(&system, &user).len(), 2);
    }

    #[test]
    fn test_cache_rebuilds_when_registry_changes() {
        let system = SystemPaths::new(Arc::new(FixedPathProvider::new(["/s1"])));
        let registry = PathRegistry::new();
        let cache = SearchListCache::new();

        let first = cache.get(&system, &registry);
        assert_eq!(&*first, [PathBuf::from("/s1")]);
        assert!(Arc::ptr_eq(&first, &cache.get(&system, &registry)));

        registry.add_paths(["/u1"]);
        let second = cache.get(&system, &registry);
        assert_eq!(&*second, [PathBuf::from("/s1"), PathBuf::from("/u1")]);
    }

    #[test]
    fn test_probe_stops_at_first_match() {
        let fs = MockFs::new()
            .with_file("/s2/A.dll")
            .with_file("/u1/A.dll");
        let sink = MemorySink::new();
        let dirs = [
            PathBuf::from("/s1"),
            PathBuf::from("/s2"),
            PathBuf::from("/u1"),
        ];

        let attempts = DirectoryProber::new(&fs, &sink).probe(&dirs, "A.dll");

        assert_eq!(attempts.len(), 2);
        assert_eq!(
            find_success(&attempts).unwrap().candidate,
            PathBuf::from("/s2/A.dll")
        );
        assert_eq!(sink.lines_containing("Probing").len(), 2);
    }

    #[test]
    fn test_probe_failure_is_a_miss() {
        let fs = MockFs::new()
            .with_failure("/s1/A.dll", "stale handle")
            .with_file("/s2/A.dll");
        let sink = MemorySink::new();
        let dirs = [PathBuf::from("/s1"), PathBuf::from("/s2")];

        let attempts = DirectoryProber::new(&fs, &sink).probe(&dirs, "A.dll");

        assert_eq!(
            attempts[0].outcome,
            ProbeOutcome::IoError("stale handle".to_string())
        );
        assert!(attempts[1].outcome.is_found());
    }

    #[test]
    fn test_probe_panic_is_a_miss() {
        struct PanickingFs;
        impl FsProvider for PanickingFs {
            fn check_file(&self, _path: &std::path::Path) -> ProbeOutcome {
                panic!("driver exploded");
            }
        }

        let sink = MemorySink::new();
        let attempts =
            DirectoryProber::new(&PanickingFs, &sink).probe(&[PathBuf::from("/s1")], "A.dll");

        assert_eq!(attempts.len(), 1);
        assert!(matches!(attempts[0].outcome, ProbeOutcome::IoError(_)));
    }
}
