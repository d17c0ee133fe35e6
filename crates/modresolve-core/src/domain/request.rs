//! A single module-not-found notification.

use super::identity::ModuleIdentity;

/// Request raised by the host loader when it cannot find a module.
///
/// Constructed once per notification and consumed synchronously by the
/// handlers attached to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    name: String,
    requested_by: Option<String>,
}

impl ModuleRequest {
    /// Create a request for the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requested_by: None,
        }
    }

    /// Attach the name of the module whose load triggered this request.
    #[must_use]
    pub fn requested_by(mut self, requester: impl Into<String>) -> Self {
        self.requested_by = Some(requester.into());
        self
    }

    /// The requested display name, exactly as the loader supplied it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The requesting module, used for log context only.
    pub fn requester(&self) -> Option<&str> {
        self.requested_by.as_deref()
    }

    /// Parse the display name into a structured identity.
    pub fn identity(&self) -> ModuleIdentity {
        ModuleIdentity::parse(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_keeps_display_name_verbatim() {
        let request = ModuleRequest::new("Vendor.Tools, Version=1.0");
        assert_eq!(request.name(), "Vendor.Tools, Version=1.0");
        assert_eq!(request.identity().name, "Vendor.Tools");
        assert_eq!(request.requester(), None);
    }

    #[test]
    fn test_request_with_requester() {
        let request = ModuleRequest::new("Vendor.Tools").requested_by("Vendor.App");
        assert_eq!(request.requester(), Some("Vendor.App"));
    }
}
