//! Placeholder substitution.
//!
//! Rendering is literal string replacement: every key of the application
//! scope is substituted under `gitops.`, then every key of the cluster
//! scope under `gitops.config.`. Each key is replaced once per occurrence;
//! substituted text is never expanded again by the same key.

use tracing::debug;

use super::scope::Scope;

/// Prefix for application-scope placeholders.
pub const APP_PREFIX: &str = "gitops.";

/// Prefix for cluster-scope placeholders.
pub const CLUSTER_PREFIX: &str = "gitops.config.";

/// Renders the shared template for one target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Creates a new renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Substitutes both scopes into `template`.
    ///
    /// Application bindings are applied strictly before cluster bindings.
    #[must_use]
    pub fn render(&self, template: &str, app: &Scope, cluster: &Scope) -> String {
        let rendered = Self::substitute(template.to_string(), APP_PREFIX, app);
        Self::substitute(rendered, CLUSTER_PREFIX, cluster)
    }

    fn substitute(mut text: String, prefix: &str, scope: &Scope) -> String {
        for (key, value) in scope.iter() {
            let tight = format!("{{{{{prefix}{key}}}}}");
            let spaced = format!("{{{{ {prefix}{key} }}}}");

            if text.contains(&tight) || text.contains(&spaced) {
                debug!("Substituting {prefix}{key}");
                text = text.replace(&tight, value).replace(&spaced, value);
            }
        }
        text
    }
}
