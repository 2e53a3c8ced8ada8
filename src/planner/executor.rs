//! Prune-then-create reconciliation of the deploy tree.
//!
//! A run first deletes every generated manifest for the configured
//! namespace/name found under any subdirectory of the deploy root, then
//! writes one fresh manifest per declared target. The first failure aborts
//! the run; manifests already written for earlier targets stay in place.

use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{ApplicationConfig, ConfigParser};
use crate::context::RunContext;
use crate::error::{DeployError, GitopsError, Result};
use crate::render::{ManifestValidator, Scope, TemplateRenderer};

use super::digest::ManifestHasher;
use super::plan::DeploymentPlan;

/// Drives a reconciliation run.
#[derive(Debug)]
pub struct DeploymentPlanner<'a> {
    /// Run context.
    ctx: &'a RunContext,
    /// Application configuration.
    config: &'a ApplicationConfig,
    /// Loader for cluster configs.
    parser: &'a ConfigParser,
    /// Template renderer.
    renderer: TemplateRenderer,
    /// Rendered manifest validator.
    validator: ManifestValidator,
    /// Manifest hasher.
    hasher: ManifestHasher,
}

/// A generated manifest found under the deploy root.
#[derive(Debug, Clone, Serialize)]
pub struct ExistingManifest {
    /// Name of the deploy root subdirectory holding it.
    pub target: String,
    /// Path to the manifest.
    pub path: PathBuf,
}

/// A manifest removed by the prune phase.
#[derive(Debug, Clone, Serialize)]
pub struct PrunedManifest {
    /// Name of the deploy root subdirectory it was in.
    pub target: String,
    /// Path that was removed.
    pub path: PathBuf,
    /// Digest of the removed content.
    pub digest: String,
}

/// How a target's manifest compares to the copy removed by the prune phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestChange {
    /// No manifest existed for this target before the run.
    Created,
    /// The content differs from the pruned copy.
    Updated,
    /// The content is byte-identical to the pruned copy.
    Unchanged,
}

/// Outcome for a single target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    /// Target name.
    pub target: String,
    /// Path of the written manifest.
    pub manifest: PathBuf,
    /// Digest of the written manifest.
    pub digest: String,
    /// Whether `namespace.yaml` was written by this run.
    pub namespace_created: bool,
    /// Change relative to the previous run.
    pub change: ManifestChange,
}

/// Result of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Manifests removed by the prune phase.
    pub pruned: Vec<PrunedManifest>,
    /// One outcome per declared target, in order.
    pub targets: Vec<TargetOutcome>,
}

impl<'a> DeploymentPlanner<'a> {
    /// Creates a new planner.
    #[must_use]
    pub const fn new(ctx: &'a RunContext, config: &'a ApplicationConfig, parser: &'a ConfigParser) -> Self {
        Self {
            ctx,
            config,
            parser,
            renderer: TemplateRenderer::new(),
            validator: ManifestValidator::new(),
            hasher: ManifestHasher::new(),
        }
    }

    /// Run context.
    #[must_use]
    pub const fn context(&self) -> &RunContext {
        self.ctx
    }

    /// Application configuration.
    #[must_use]
    pub const fn config(&self) -> &ApplicationConfig {
        self.config
    }

    /// Manifest hasher.
    #[must_use]
    pub const fn hasher(&self) -> &ManifestHasher {
        &self.hasher
    }

    /// Runs the prune phase followed by the create phase.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; no later target is processed.
    pub fn run(&self, template: &str) -> Result<RunReport> {
        info!(
            "Generating {}/{} for {} target(s)",
            self.config.namespace,
            self.config.name,
            self.config.targets.len()
        );

        let pruned = self.prune()?;
        let app_scope = self.config.scope();

        let mut targets = Vec::with_capacity(self.config.targets.len());
        for target in &self.config.targets {
            targets.push(self.create_target(target, template, &app_scope, &pruned)?);
        }

        info!("Generated {} manifest(s)", targets.len());
        Ok(RunReport { pruned, targets })
    }

    /// Builds a dry-run plan without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error only if the deploy root cannot be listed; per-target
    /// problems are recorded in the plan.
    pub fn plan(&self, template: &str) -> Result<DeploymentPlan> {
        DeploymentPlan::build(self, template)
    }

    /// Lists every generated manifest under the deploy root, sorted by
    /// directory name.
    ///
    /// # Errors
    ///
    /// Returns an error if the deploy root cannot be read.
    pub fn existing_manifests(&self) -> Result<Vec<ExistingManifest>> {
        let root = &self.ctx.layout.deploy_root;
        let file_name = format!("{}.yaml", self.config.name);

        let entries = fs::read_dir(root).map_err(|e| DeployError::io(root, e))?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DeployError::io(root, e))?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }

            let namespace_dir = dir.join(&self.config.namespace);
            if !namespace_dir.is_dir() {
                continue;
            }

            let path = namespace_dir.join(&file_name);
            if path.is_file() {
                found.push(ExistingManifest {
                    target: entry.file_name().to_string_lossy().into_owned(),
                    path,
                });
            }
        }

        found.sort_by(|a, b| a.target.cmp(&b.target));
        Ok(found)
    }

    /// Deletes every generated manifest, whether or not its directory is a
    /// declared target.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest cannot be read or removed.
    pub fn prune(&self) -> Result<Vec<PrunedManifest>> {
        let mut pruned = Vec::new();

        for existing in self.existing_manifests()? {
            let digest = self.hasher.hash_file(&existing.path)?;
            fs::remove_file(&existing.path).map_err(|e| DeployError::io(&existing.path, e))?;

            info!("Pruned {}", existing.path.display());
            pruned.push(PrunedManifest {
                digest,
                target: existing.target,
                path: existing.path,
            });
        }

        debug!("Prune phase removed {} manifest(s)", pruned.len());
        Ok(pruned)
    }

    /// Loads a target's cluster config, renders the template and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster config cannot be loaded or the
    /// rendered text still holds placeholders.
    pub fn render_target(&self, target: &str, template: &str, app_scope: &Scope) -> Result<String> {
        let cluster = self
            .parser
            .load_cluster_config(target, &self.ctx.layout.target_dir(target))?;

        let rendered = self.renderer.render(template, app_scope, &cluster.scope());
        self.validator.validate(&rendered)?;

        Ok(rendered)
    }

    /// Processes one declared target.
    fn create_target(
        &self,
        target: &str,
        template: &str,
        app_scope: &Scope,
        pruned: &[PrunedManifest],
    ) -> Result<TargetOutcome> {
        let layout = &self.ctx.layout;
        let namespace = &self.config.namespace;

        let target_dir = layout.target_dir(target);
        if !target_dir.is_dir() {
            return Err(GitopsError::Deploy(DeployError::TargetDirectoryMissing {
                target: target.to_string(),
                path: target_dir,
            }));
        }

        let namespace_dir = layout.namespace_dir(target, namespace);
        if !namespace_dir.is_dir() {
            fs::create_dir_all(&namespace_dir).map_err(|e| DeployError::io(&namespace_dir, e))?;
            debug!("Created {}", namespace_dir.display());
        }

        let namespace_path = layout.namespace_manifest(target, namespace);
        let namespace_created = !namespace_path.exists();
        if namespace_created {
            fs::write(&namespace_path, namespace_manifest(namespace))
                .map_err(|e| DeployError::io(&namespace_path, e))?;
            info!("Created {}", namespace_path.display());
        } else {
            debug!("Keeping existing {}", namespace_path.display());
        }

        let rendered = self.render_target(target, template, app_scope)?;

        let manifest = layout.manifest(target, namespace, &self.config.name);
        fs::write(&manifest, &rendered).map_err(|e| DeployError::io(&manifest, e))?;

        let digest = self.hasher.hash_manifest(rendered.as_bytes());
        let change = match pruned.iter().find(|p| p.target == target) {
            None => ManifestChange::Created,
            Some(previous) if ManifestHasher::hashes_match(&previous.digest, &digest) => {
                ManifestChange::Unchanged
            }
            Some(_) => ManifestChange::Updated,
        };

        info!("Wrote {} ({change})", manifest.display());
        Ok(TargetOutcome {
            target: target.to_string(),
            manifest,
            digest,
            namespace_created,
            change,
        })
    }
}

/// Fixed-shape namespace manifest.
#[must_use]
pub fn namespace_manifest(namespace: &str) -> String {
    format!(
        "apiVersion: v1\nkind: Namespace\nmetadata:\n  labels:\n    name: {namespace}\n  name: {namespace}\n"
    )
}

impl RunReport {
    /// Number of targets whose manifest changed or appeared.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.change != ManifestChange::Unchanged)
            .count()
    }

    /// Pruned manifests that were not regenerated.
    #[must_use]
    pub fn removed(&self) -> Vec<&PrunedManifest> {
        self.pruned
            .iter()
            .filter(|p| !self.targets.iter().any(|t| t.target == p.target))
            .collect()
    }
}

impl std::fmt::Display for ManifestChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Generated {} manifest(s):", self.targets.len())?;
        for outcome in &self.targets {
            writeln!(f, "  {} {} ({})", outcome.change, outcome.manifest.display(), outcome.target)?;
        }

        let removed = self.removed();
        if !removed.is_empty() {
            writeln!(f, "Removed {} stale manifest(s):", removed.len())?;
            for pruned in removed {
                writeln!(f, "  {}", pruned.path.display())?;
            }
        }

        Ok(())
    }
}
