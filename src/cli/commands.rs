//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitops - Render per-target deployment manifests from a single template.
#[derive(Parser, Debug)]
#[command(name = "gitops")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Deploy root (defaults to `./deploy` next to `../gitops.json`).
    #[arg(short, long, global = true, env = "GITOPS_DEPLOY_DIR")]
    pub deploy_dir: Option<PathBuf>,

    /// Path to the application configuration file.
    #[arg(short, long, global = true, env = "GITOPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the manifest template.
    #[arg(short, long, global = true, env = "GITOPS_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prune stale manifests and generate one per declared target.
    #[command(alias = "apply")]
    Generate {
        /// Build version injected as `gitops.version` when the config has none.
        #[arg(value_name = "VERSION", env = "GITOPS_VERSION")]
        build_version: Option<String>,
    },

    /// Show what a generate run would do without writing anything.
    Plan {
        /// Build version injected as `gitops.version` when the config has none.
        #[arg(value_name = "VERSION", env = "GITOPS_VERSION")]
        build_version: Option<String>,
    },

    /// Validate the application configuration and template location.
    Validate,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Commands {
    /// The build version requested on the command line, if any.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        match self {
            Self::Generate { build_version } | Self::Plan { build_version } => build_version.clone(),
            Self::Validate => None,
        }
    }
}
