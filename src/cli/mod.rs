//! CLI module for the gitops manifest generator.
//!
//! This module provides the command-line interface for generating and
//! previewing manifests.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
