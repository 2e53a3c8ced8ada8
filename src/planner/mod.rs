//! Planning module for manifest generation.
//!
//! This module reconciles the deploy tree against the declared targets,
//! either for real (prune-then-create) or as a dry-run plan.

mod digest;
mod executor;
mod plan;

pub use digest::ManifestHasher;
pub use executor::{
    DeploymentPlanner, ExistingManifest, ManifestChange, PrunedManifest, RunReport, TargetOutcome,
    namespace_manifest,
};
pub use plan::{ActionType, DeploymentPlan, PlanFailure, PlannedAction};
