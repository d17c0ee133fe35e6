//! Resolution guard: the set of module names currently being resolved.
//!
//! Tokens are keyed by `(thread, name)`. A thread that re-enters resolution
//! for a name it is already resolving is turned away; two different threads
//! asking for the same name both proceed and probe independently.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

type Token = (ThreadId, String);

/// Thread-safe in-flight set with scoped acquire/release.
#[derive(Debug, Default)]
pub struct ResolutionGuard {
    in_flight: Mutex<HashSet<Token>>,
}

impl ResolutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as in flight on the current thread.
    ///
    /// Returns `None` if the current thread is already resolving `name`.
    /// The returned token releases the entry when dropped, including
    /// during unwinding.
    pub fn try_enter(&self, name: &str) -> Option<InFlight<'_>> {
        let token = (thread::current().id(), name.to_string());
        if !self.lock().insert(token.clone()) {
            return None;
        }
        Some(InFlight { guard: self, token })
    }

    /// Whether the current thread is resolving `name`.
    pub fn is_held_by_current_thread(&self, name: &str) -> bool {
        let token = (thread::current().id(), name.to_string());
        self.lock().contains(&token)
    }

    /// Whether any thread is resolving `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().iter().any(|(_, held)| held == name)
    }

    /// Number of in-flight tokens across all threads.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn release(&self, token: &Token) {
        self.lock().remove(token);
    }

    // Critical sections are single set operations; a poisoned set is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashSet<Token>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped membership in a [`ResolutionGuard`].
#[derive(Debug)]
#[must_use = "the name is released as soon as the token is dropped"]
pub struct InFlight<'a> {
    guard: &'a ResolutionGuard,
    token: Token,
}

impl InFlight<'_> {
    pub fn name(&self) -> &str {
        &self.token.1
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.release(&self.token);
    }
}
