//! Core domain types.
//!
//! These types describe a single module-not-found notification and the
//! structured identity parsed out of it. They carry no filesystem or
//! loader concerns.

mod identity;
mod request;

pub use identity::{ModuleIdentity, RESOURCES_SUFFIX, XML_SERIALIZERS_SUFFIX};
pub use request::ModuleRequest;
