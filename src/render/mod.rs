//! Template rendering module.
//!
//! This module turns the shared template into one manifest per target:
//! - Ordered substitution scopes built from configuration mappings
//! - Two-namespace placeholder substitution
//! - Rejection of manifests with unresolved placeholders

mod check;
mod scope;
mod template;

pub use check::ManifestValidator;
pub use scope::{Scope, value_text};
pub use template::{APP_PREFIX, CLUSTER_PREFIX, TemplateRenderer};
