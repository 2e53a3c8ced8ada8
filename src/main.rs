//! gitops CLI entrypoint.
//!
//! This is the main entrypoint for the gitops manifest generator.

use std::path::PathBuf;
use std::process::ExitCode;

use gitops_manifests::cli::{Cli, Commands, OutputFormatter};
use gitops_manifests::config::ConfigParser;
use gitops_manifests::context::{DEPLOY_DIR, DeployLayout, RunContext};
use gitops_manifests::error::{
    ConfigError, DeployError, EXIT_FAILURE, EXIT_SUCCESS, GitopsError, Result,
};
use gitops_manifests::planner::DeploymentPlanner;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // .env may set GITOPS_* variables that clap reads
    if let Err(e) = load_env() {
        eprintln!("Error: {e}");
        return ExitCode::from(e.exit_code());
    }

    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatches the selected command and returns the exit code.
fn run(cli: Cli) -> Result<u8> {
    let formatter = OutputFormatter::new(cli.output);
    let layout = resolve_layout(&cli)?;
    let ctx = RunContext::new(layout, cli.command.version());
    debug!("Run version {} started at {}", ctx.version, ctx.started_at);

    match cli.command {
        Commands::Generate { .. } => cmd_generate(&ctx, &formatter),
        Commands::Plan { .. } => cmd_plan(&ctx, &formatter),
        Commands::Validate => cmd_validate(&ctx, &formatter),
    }
}

/// Prune stale manifests and generate fresh ones.
fn cmd_generate(ctx: &RunContext, formatter: &OutputFormatter) -> Result<u8> {
    let parser = ConfigParser::new();
    let config = parser.load_app_config(&ctx.layout.app_config, ctx)?;
    let template = parser.load_template(&ctx.layout.template)?;

    let planner = DeploymentPlanner::new(ctx, &config, &parser);
    let report = planner.run(&template)?;

    eprintln!("{}", formatter.format_report(&report));
    Ok(EXIT_SUCCESS)
}

/// Show what a generate run would do.
fn cmd_plan(ctx: &RunContext, formatter: &OutputFormatter) -> Result<u8> {
    let parser = ConfigParser::new();
    let config = parser.load_app_config(&ctx.layout.app_config, ctx)?;
    let template = parser.load_template(&ctx.layout.template)?;

    let planner = DeploymentPlanner::new(ctx, &config, &parser);
    let plan = planner.plan(&template)?;

    eprintln!("{}", formatter.format_plan(&plan));

    if plan.is_clean() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILURE)
    }
}

/// Validate configuration.
fn cmd_validate(ctx: &RunContext, formatter: &OutputFormatter) -> Result<u8> {
    let parser = ConfigParser::new();
    let config = parser.load_app_config(&ctx.layout.app_config, ctx)?;

    if !ctx.layout.template.is_file() {
        return Err(GitopsError::Config(ConfigError::TemplateNotFound {
            path: ctx.layout.template.clone(),
        }));
    }

    eprintln!("{}", formatter.format_summary(&config, &ctx.layout));
    Ok(EXIT_SUCCESS)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the layout from flags, falling back to discovery from the
/// current directory.
fn resolve_layout(cli: &Cli) -> Result<DeployLayout> {
    let mut layout = match &cli.deploy_dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(GitopsError::Deploy(DeployError::DeployRootMissing {
                    path: dir.clone(),
                }));
            }
            DeployLayout::from_deploy_root(dir)
        }
        None if cli.config.is_some() => {
            // An explicit config without a deploy dir means the working
            // directory holds `deploy/`.
            let root = current_dir()?.join(DEPLOY_DIR);
            if !root.is_dir() {
                return Err(GitopsError::Deploy(DeployError::DeployRootMissing {
                    path: root,
                }));
            }
            DeployLayout::from_deploy_root(root)
        }
        None => DeployLayout::discover(current_dir()?)?,
    };

    if let Some(config) = &cli.config {
        layout = layout.with_app_config(config);
    }
    if let Some(template) = &cli.template {
        layout = layout.with_template(template);
    }

    info!("Application config: {}", layout.app_config.display());
    Ok(layout)
}

/// Loads `.env` from the base directory found from the working directory,
/// or from the working directory itself when no layout is found there.
fn load_env() -> Result<()> {
    let cwd = current_dir()?;
    let base = DeployLayout::discover(&cwd).map_or(cwd, |layout| layout.base_dir());

    ConfigParser::new().with_base_path(base).load_dotenv()
}

/// Returns the current working directory.
fn current_dir() -> Result<PathBuf> {
    std::env::current_dir()
        .map_err(|e| GitopsError::internal(format!("Cannot determine current directory: {e}")))
}
