//! Configuration types for the manifest generator.
//!
//! The application config has three typed required members; every other
//! key is kept in an ordered mapping and only ever consumed by the
//! renderer through a [`Scope`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::render::{Scope, value_text};

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApplicationConfig {
    /// Application name; also the manifest file stem.
    pub name: String,
    /// Namespace; the per-target output subdirectory.
    pub namespace: String,
    /// Declared targets, in processing order.
    pub targets: Vec<String>,
    /// Every key except `targets`, in file order, with `version` and
    /// `deploy` appended when they were injected.
    fields: Map<String, Value>,
}

/// Per-target cluster configuration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Target the configuration was read from.
    pub target: String,
    /// Free-form fields, in file order.
    fields: Map<String, Value>,
}

impl ApplicationConfig {
    /// Assembles a config from already-validated parts.
    #[must_use]
    pub(crate) const fn from_parts(
        name: String,
        namespace: String,
        targets: Vec<String>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            name,
            namespace,
            targets,
            fields,
        }
    }

    /// Looks up a field by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `version` binding as text.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.get("version").and_then(value_text)
    }

    /// The `deploy` binding as text.
    #[must_use]
    pub fn deploy(&self) -> Option<String> {
        self.get("deploy").and_then(value_text)
    }

    /// Keys that are neither required nor derived.
    #[must_use]
    pub fn extension_keys(&self) -> Vec<&str> {
        const BUILT_IN: &[&str] = &["name", "namespace", "version", "deploy"];

        self.fields
            .keys()
            .map(String::as_str)
            .filter(|k| !BUILT_IN.contains(k))
            .collect()
    }

    /// Bindings substituted under `gitops.`.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::from_map(&self.fields)
    }
}

impl ClusterConfig {
    /// Creates a cluster config for `target`.
    #[must_use]
    pub fn new(target: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            target: target.into(),
            fields,
        }
    }

    /// Bindings substituted under `gitops.config.`.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::from_map(&self.fields)
    }
}
