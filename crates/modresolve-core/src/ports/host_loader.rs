//! Host loader port.
//!
//! The host loader owns physical module loading. When its own lookup fails it
//! notifies every attached [`ResolveHandler`]; the first handler returning a
//! path wins and the loader maps that file itself.
//!
//! # Design Notes
//!
//! - Core owns the traits (pure)
//! - Runtime owns the reference loader (`ModuleHost`) and the engine
//! - Handlers are invoked synchronously and may be re-entered by the loader

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::ModuleRequest;

/// Handler consulted by the host loader when a module cannot be found.
pub trait ResolveHandler: Send + Sync {
    /// Return the file to load for `request`, or `None` for "no opinion".
    ///
    /// Must not panic for expected conditions; the loader treats `None` as
    /// a signal to apply its own fallback.
    fn on_module_not_found(&self, request: &ModuleRequest) -> Option<PathBuf>;
}

/// Opaque token identifying an attached handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// Port for subscribing to the host loader's module-not-found notification.
#[cfg_attr(test, mockall::automock)]
pub trait HostLoader: Send + Sync {
    /// Attach a handler; it is consulted on every subsequent load failure.
    fn attach(&self, handler: Arc<dyn ResolveHandler>) -> HandlerId;

    /// Detach a previously attached handler. Returns `false` if `id` was
    /// not attached.
    fn detach(&self, id: HandlerId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<PathBuf>);

    impl ResolveHandler for Fixed {
        fn on_module_not_found(&self, _request: &ModuleRequest) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    #[test]
    fn test_mock_loader_attach_detach() {
        let mut loader = MockHostLoader::new();
        loader
            .expect_attach()
            .times(1)
            .returning(|_| HandlerId::new(7));
        loader
            .expect_detach()
            .withf(|id| *id == HandlerId::new(7))
            .times(1)
            .returning(|_| true);

        let id = loader.attach(Arc::new(Fixed(None)));
        assert_eq!(id.get(), 7);
        assert!(loader.detach(id));
    }

    #[test]
    fn test_handler_answers() {
        let handler = Fixed(Some(PathBuf::from("/opt/A.dll")));
        let answer = handler.on_module_not_found(&ModuleRequest::new("A"));
        assert_eq!(answer, Some(PathBuf::from("/opt/A.dll")));
    }

    #[test]
    fn test_handler_id_display() {
        assert_eq!(HandlerId::new(3).to_string(), "handler#3");
    }
}
