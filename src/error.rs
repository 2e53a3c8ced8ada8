//! Error types for the gitops manifest generator.
//!
//! This module provides the error hierarchy for every stage of a run:
//! configuration loading, template rendering, and the prune-then-create
//! reconciliation of the deploy tree.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the manifest generator.
#[derive(Debug, Error)]
pub enum GitopsError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Template rendering errors.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Deploy tree errors.
    #[error("Deploy error: {0}")]
    Deploy(#[from] DeployError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The application configuration file was not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A configuration file could not be parsed as a mapping.
    #[error("Invalid configuration format in {location}: {message}")]
    InvalidFormat {
        /// File the content came from.
        location: String,
        /// Description of the parse error.
        message: String,
    },

    /// One or more required fields are missing or empty.
    #[error("Missing required field(s): {}", .fields.join(", "))]
    MissingRequiredField {
        /// Every required field that failed the presence check.
        fields: Vec<String>,
    },

    /// The `targets` field is not a non-empty list of names.
    #[error("Invalid targets field: {message}")]
    InvalidTargetsField {
        /// Description of what is wrong with the field.
        message: String,
    },

    /// A target directory has no cluster configuration file.
    #[error("Cluster configuration not found for target '{target}' (looked in {path})")]
    ClusterConfigNotFound {
        /// Target whose configuration is missing.
        target: String,
        /// Directory that was searched.
        path: PathBuf,
    },

    /// The shared template file was not found.
    #[error("Template file not found: {path}")]
    TemplateNotFound {
        /// Path to the missing template.
        path: PathBuf,
    },
}

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The rendered text still contains placeholders.
    #[error("{} unresolved placeholder line(s):\n{}", .lines.len(), format_lines(.lines))]
    UnresolvedPlaceholder {
        /// Every offending line of the rendered text.
        lines: Vec<UnresolvedLine>,
    },
}

/// A rendered line that still contains a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnresolvedLine {
    /// 1-based line number in the rendered text.
    pub number: usize,
    /// The line itself.
    pub text: String,
}

/// Errors raised while reconciling the deploy tree.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The deploy root directory does not exist.
    #[error("Deploy directory doesn't exist: {path}")]
    DeployRootMissing {
        /// Expected deploy root.
        path: PathBuf,
    },

    /// A declared target has no directory under the deploy root.
    #[error("Target directory missing for '{target}': {path}")]
    TargetDirectoryMissing {
        /// The declared target.
        target: String,
        /// Directory that was expected.
        path: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("IO failure on {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for manifest generator operations.
pub type Result<T> = std::result::Result<T, GitopsError>;

/// Process exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;

/// Process exit code for any failure (`-1` as a signed byte).
pub const EXIT_FAILURE: u8 = 255;

impl GitopsError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the process exit code for this error.
    ///
    /// Every failure maps to the same code; the variant only changes the
    /// message shown to the operator.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

impl ConfigError {
    /// Creates a format error for content read from `location`.
    #[must_use]
    pub fn invalid_format(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl DeployError {
    /// Wraps an IO error with the path it happened on.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for UnresolvedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>4}: {}", self.number, self.text)
    }
}

/// Joins unresolved lines one per row for error display.
fn format_lines(lines: &[UnresolvedLine]) -> String {
    lines
        .iter()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_all() {
        let err = ConfigError::MissingRequiredField {
            fields: vec![String::from("name"), String::from("namespace")],
        };
        assert_eq!(err.to_string(), "Missing required field(s): name, namespace");
    }

    #[test]
    fn test_unresolved_message_lists_lines() {
        let err = RenderError::UnresolvedPlaceholder {
            lines: vec![UnresolvedLine {
                number: 3,
                text: String::from("image: {{gitops.missingkey}}"),
            }],
        };
        let message = err.to_string();
        assert!(message.starts_with("1 unresolved placeholder line(s):"));
        assert!(message.contains("   3: image: {{gitops.missingkey}}"));
    }

    #[test]
    fn test_every_error_exits_with_failure() {
        let err = GitopsError::from(DeployError::TargetDirectoryMissing {
            target: String::from("azure"),
            path: PathBuf::from("deploy/azure"),
        });
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }
}
