//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::ApplicationConfig;
use crate::context::DeployLayout;
use crate::planner::{ActionType, DeploymentPlan, ManifestChange, ManifestHasher, RunReport};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Target outcome row for table display.
#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Digest")]
    digest: String,
    #[tabled(rename = "Manifest")]
    manifest: String,
}

/// Plan action row for table display.
#[derive(Tabled)]
struct PlanActionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result of a generate run.
    #[must_use]
    pub fn format_report(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &RunReport) -> String {
        let hasher = ManifestHasher::new();
        let mut output = String::new();

        let rows: Vec<TargetRow> = report
            .targets
            .iter()
            .map(|t| TargetRow {
                target: t.target.clone(),
                change: match t.change {
                    ManifestChange::Created => t.change.to_string().green().to_string(),
                    ManifestChange::Updated => t.change.to_string().yellow().to_string(),
                    ManifestChange::Unchanged => t.change.to_string().dimmed().to_string(),
                },
                namespace: if t.namespace_created {
                    String::from("created")
                } else {
                    String::from("kept")
                },
                digest: hasher.short_hash(&t.digest),
                manifest: t.manifest.display().to_string(),
            })
            .collect();

        let _ = writeln!(output, "{}", Table::new(rows));

        let removed = report.removed();
        if !removed.is_empty() {
            let _ = writeln!(output, "\n{}", "Removed stale manifests:".yellow().bold());
            for pruned in removed {
                let _ = writeln!(output, "  - {} ({})", pruned.path.display(), pruned.target);
            }
        }

        let _ = writeln!(
            output,
            "\n{} {} manifest(s) generated, {} changed.",
            "✓".green(),
            report.targets.len(),
            report.changed_count()
        );

        output
    }

    /// Formats a deployment plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &DeploymentPlan) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(plan),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(plan: &DeploymentPlan) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "{} {}/{}\n",
            "Plan for".bold(),
            plan.namespace,
            plan.name
        );

        let rows: Vec<PlanActionRow> = plan
            .actions
            .iter()
            .enumerate()
            .map(|(i, a)| PlanActionRow {
                index: i + 1,
                action: Self::color_action(a.action_type),
                target: a.target.clone(),
                path: a.path.display().to_string(),
                reason: a.reason.clone(),
            })
            .collect();

        let _ = writeln!(output, "{}", Table::new(rows));

        let _ = writeln!(
            output,
            "\nSummary: {} to prune, {} to write, {} namespace manifest(s) to create",
            plan.count(ActionType::Prune).to_string().red(),
            plan.count(ActionType::WriteManifest).to_string().green(),
            plan.count(ActionType::WriteNamespace).to_string().green(),
        );

        if plan.is_clean() {
            let _ = writeln!(output, "{} Plan is clean.", "✓".green());
        } else {
            let _ = writeln!(output, "\n{}", "Failures:".red().bold());
            for failure in &plan.failures {
                let _ = writeln!(output, "  {} {}: {}", "✗".red(), failure.target, failure.message);
            }
        }

        output
    }

    /// Colors an action type.
    fn color_action(action_type: ActionType) -> String {
        let label = action_type.to_string();
        match action_type {
            ActionType::Prune => label.red().to_string(),
            ActionType::CreateDirectory | ActionType::WriteNamespace | ActionType::WriteManifest => {
                label.green().to_string()
            }
            ActionType::KeepNamespace => label.dimmed().to_string(),
        }
    }

    /// Formats a configuration summary for `validate`.
    #[must_use]
    pub fn format_summary(&self, config: &ApplicationConfig, layout: &DeployLayout) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "valid": true,
                "name": config.name,
                "namespace": config.namespace,
                "targets": config.targets,
                "version": config.version(),
                "deploy": config.deploy(),
                "extensions": config.extension_keys(),
                "deploy_root": layout.deploy_root,
                "template": layout.template,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = String::new();
                let _ = writeln!(output, "{} Configuration is valid!\n", "✓".green());
                let _ = writeln!(output, "Configuration summary:");
                let _ = writeln!(output, "  Name: {}", config.name);
                let _ = writeln!(output, "  Namespace: {}", config.namespace);
                let _ = writeln!(output, "  Targets: {}", config.targets.join(", "));
                let _ = writeln!(output, "  Version: {}", config.version().unwrap_or_default());
                let _ = writeln!(output, "  Extension fields: {}", config.extension_keys().join(", "));
                let _ = writeln!(output, "  Deploy root: {}", layout.deploy_root.display());
                let _ = writeln!(output, "  Template: {}", layout.template.display());
                output
            }
        }
    }
}
