//! Traffic filter and traffic filter association resources for serverless
//! projects.
//!
//! A traffic filter is a standalone entity with its own endpoint. An
//! association has no server-side counterpart: it is one member of the
//! `traffic_filters` list embedded in a project, so every association
//! operation reads that list, changes a single member and writes the whole
//! list back. See [`association`] for the consequences.

pub mod association;
pub mod diagnostics;
pub mod errors;
pub mod filter;
pub mod metrics_defs;
pub mod project_filters;
pub mod project_kind;
pub mod resource;
pub mod state;

#[cfg(test)]
mod testutils;

pub use association::AssociationResource;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use errors::{ErrorCategory, ResourceError};
pub use filter::TrafficFilterResource;
pub use project_kind::ProjectKind;
pub use resource::Resource;
pub use state::State;
