//! Dry-run deployment plans.
//!
//! A plan walks the same steps as a run but only records what would
//! happen. Unlike a run, it keeps going after a failing target so every
//! problem shows up in one pass.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::error::Result;

use super::digest::ManifestHasher;
use super::executor::DeploymentPlanner;

/// A complete dry-run plan.
#[derive(Debug, Serialize)]
pub struct DeploymentPlan {
    /// When the run this plan belongs to started.
    pub created_at: DateTime<Utc>,
    /// Application name.
    pub name: String,
    /// Namespace.
    pub namespace: String,
    /// Planned actions in execution order.
    pub actions: Vec<PlannedAction>,
    /// Targets that would make the run fail.
    pub failures: Vec<PlanFailure>,
}

/// A single planned filesystem action.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedAction {
    /// Action type.
    pub action_type: ActionType,
    /// Target (deploy root subdirectory) the action applies to.
    pub target: String,
    /// Path affected.
    pub path: PathBuf,
    /// Reason for this action.
    pub reason: String,
}

/// A target that cannot be generated.
#[derive(Debug, Clone, Serialize)]
pub struct PlanFailure {
    /// Target name.
    pub target: String,
    /// Why it would fail.
    pub message: String,
}

/// Types of actions in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Delete a previously generated manifest.
    Prune,
    /// Create the `<target>/<namespace>` directory.
    CreateDirectory,
    /// Write `namespace.yaml`.
    WriteNamespace,
    /// Leave an existing `namespace.yaml` alone.
    KeepNamespace,
    /// Write the rendered manifest.
    WriteManifest,
}

impl DeploymentPlan {
    /// Builds a plan from the planner's current view of the deploy tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the deploy root cannot be listed.
    pub fn build(planner: &DeploymentPlanner<'_>, template: &str) -> Result<Self> {
        let ctx = planner.context();
        let config = planner.config();
        let layout = &ctx.layout;
        let hasher = planner.hasher();

        let mut actions = Vec::new();
        let mut failures = Vec::new();
        let mut previous = Vec::new();

        for existing in planner.existing_manifests()? {
            let reason = if config.targets.contains(&existing.target) {
                String::from("regenerated every run")
            } else {
                String::from("target no longer declared")
            };

            match hasher.hash_file(&existing.path) {
                Ok(digest) => previous.push((existing.target.clone(), digest)),
                Err(e) => failures.push(PlanFailure {
                    target: existing.target.clone(),
                    message: e.to_string(),
                }),
            }

            actions.push(PlannedAction {
                action_type: ActionType::Prune,
                target: existing.target,
                path: existing.path,
                reason,
            });
        }

        let app_scope = config.scope();

        for target in &config.targets {
            if !layout.target_dir(target).is_dir() {
                failures.push(PlanFailure {
                    target: target.clone(),
                    message: format!("target directory missing: {}", layout.target_dir(target).display()),
                });
                continue;
            }

            let namespace_dir = layout.namespace_dir(target, &config.namespace);
            if !namespace_dir.is_dir() {
                actions.push(PlannedAction {
                    action_type: ActionType::CreateDirectory,
                    target: target.clone(),
                    path: namespace_dir,
                    reason: String::from("namespace directory missing"),
                });
            }

            let namespace_path = layout.namespace_manifest(target, &config.namespace);
            let (action_type, reason) = if namespace_path.exists() {
                (ActionType::KeepNamespace, "already exists")
            } else {
                (ActionType::WriteNamespace, "namespace manifest missing")
            };
            actions.push(PlannedAction {
                action_type,
                target: target.clone(),
                path: namespace_path,
                reason: String::from(reason),
            });

            match planner.render_target(target, template, &app_scope) {
                Ok(rendered) => {
                    let digest = hasher.hash_manifest(rendered.as_bytes());
                    let reason = match previous.iter().find(|(t, _)| t == target) {
                        None => String::from("new manifest"),
                        Some((_, old)) if ManifestHasher::hashes_match(old, &digest) => {
                            format!("unchanged ({})", hasher.short_hash(&digest))
                        }
                        Some((_, old)) => format!(
                            "content changed ({} -> {})",
                            hasher.short_hash(old),
                            hasher.short_hash(&digest)
                        ),
                    };

                    actions.push(PlannedAction {
                        action_type: ActionType::WriteManifest,
                        target: target.clone(),
                        path: layout.manifest(target, &config.namespace, &config.name),
                        reason,
                    });
                }
                Err(e) => failures.push(PlanFailure {
                    target: target.clone(),
                    message: e.to_string(),
                }),
            }
        }

        Ok(Self {
            created_at: ctx.started_at,
            name: config.name.clone(),
            namespace: config.namespace.clone(),
            actions,
            failures,
        })
    }

    /// Returns true if a run with this plan would succeed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of actions of a given type.
    #[must_use]
    pub fn count(&self, action_type: ActionType) -> usize {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .count()
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Prune => "prune",
            Self::CreateDirectory => "mkdir",
            Self::WriteNamespace => "namespace",
            Self::KeepNamespace => "keep",
            Self::WriteManifest => "write",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.action_type, self.path.display())?;
        if !self.reason.is_empty() {
            write!(f, " ({})", self.reason)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for DeploymentPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Plan for {}/{} ({} actions):",
            self.namespace,
            self.name,
            self.actions.len()
        )?;
        for (i, action) in self.actions.iter().enumerate() {
            writeln!(f, "  {i}. {action}")?;
        }

        if !self.failures.is_empty() {
            writeln!(f, "\nFailures:")?;
            for failure in &self.failures {
                writeln!(f, "  - {}: {}", failure.target, failure.message)?;
            }
        }

        Ok(())
    }
}
