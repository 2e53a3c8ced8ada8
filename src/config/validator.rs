//! Required-field validation for the application configuration.
//!
//! Presence checks are aggregated: every missing field is collected and
//! reported in a single error. The `targets` shape check runs only once
//! all required fields are present.

use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{ConfigError, GitopsError, Result};

/// Fields every application config must provide.
pub const REQUIRED_FIELDS: &[&str] = &["name", "namespace", "targets"];

/// Key holding the target list.
pub const TARGETS_FIELD: &str = "targets";

/// Validator for application configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing everything found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
    /// Targets extracted from the config, in declared order.
    pub targets: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a raw application config mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] listing every missing
    /// field, or [`ConfigError::InvalidTargetsField`] if `targets` is not a
    /// non-empty list of plain directory names.
    pub fn validate(&self, fields: &Map<String, Value>) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_presence(fields, &mut result);

        if !result.errors.is_empty() {
            return Err(GitopsError::Config(ConfigError::MissingRequiredField {
                fields: result.errors.iter().map(|e| e.field.clone()).collect(),
            }));
        }

        result.targets = Self::validate_targets(fields.get(TARGETS_FIELD), &mut result.warnings)?;
        Self::validate_path_segments(fields, &mut result.warnings);

        debug!(
            "Configuration validation passed with {} warning(s)",
            result.warnings.len()
        );
        Ok(result)
    }

    /// Records every required field that is absent, null, or an empty string.
    fn validate_presence(fields: &Map<String, Value>, result: &mut ValidationResult) {
        for field in REQUIRED_FIELDS {
            let message = match fields.get(*field) {
                None | Some(Value::Null) => Some(format!("'{field}' is required")),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    Some(format!("'{field}' cannot be empty"))
                }
                Some(Value::String(_)) => None,
                Some(_) if *field == TARGETS_FIELD => None,
                Some(other) => Some(format!("'{field}' must be a string, found {other}")),
            };

            if let Some(message) = message {
                result.errors.push(ValidationError {
                    field: (*field).to_string(),
                    message,
                });
            }
        }
    }

    /// Extracts the target list. Each entry is a single path segment, so
    /// every generated manifest sits where the prune phase looks for it.
    fn validate_targets(value: Option<&Value>, warnings: &mut Vec<String>) -> Result<Vec<String>> {
        let invalid = |message: String| {
            GitopsError::Config(ConfigError::InvalidTargetsField { message })
        };

        let Some(Value::Array(items)) = value else {
            return Err(invalid(String::from("expected a list of target names")));
        };

        if items.is_empty() {
            return Err(invalid(String::from("at least one target is required")));
        }

        let mut targets = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();

        for (i, item) in items.iter().enumerate() {
            let target = match item {
                Value::String(s) if !s.trim().is_empty() => s.clone(),
                other => {
                    return Err(invalid(format!(
                        "targets[{i}] must be a non-empty string, found {other}"
                    )));
                }
            };

            if !is_plain_segment(&target) {
                return Err(invalid(format!(
                    "targets[{i}]: '{target}' must name a directory directly under the deploy root"
                )));
            }

            if !seen.insert(target.clone()) {
                warnings.push(format!("targets[{i}]: '{target}' is listed more than once"));
            }
            targets.push(target);
        }

        Ok(targets)
    }

    /// Warns about values that are used as path components but look odd.
    fn validate_path_segments(fields: &Map<String, Value>, warnings: &mut Vec<String>) {
        for field in ["name", "namespace"] {
            if let Some(value) = fields.get(field).and_then(Value::as_str) {
                if !is_plain_segment(value) {
                    warnings.push(format!(
                        "{field}: '{value}' is used as a path component and contains separators or dots"
                    ));
                }
            }
        }
    }
}

/// Returns true if `segment` names a single directory entry.
fn is_plain_segment(segment: &str) -> bool {
    !segment.contains('/') && !segment.contains('\\') && segment != "." && segment != ".."
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn missing_fields(result: Result<ValidationResult>) -> Vec<String> {
        match result {
            Err(GitopsError::Config(ConfigError::MissingRequiredField { fields })) => fields,
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_config() {
        let validator = ConfigValidator::new();
        let result = validator
            .validate(&map(json!({
                "name": "svc",
                "namespace": "ns1",
                "targets": ["azure", "gcp"],
            })))
            .expect("config should be valid");

        assert!(result.errors.is_empty());
        assert_eq!(result.targets, vec!["azure", "gcp"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_name_and_namespace_reported_together() {
        let validator = ConfigValidator::new();
        let result = validator.validate(&map(json!({ "targets": ["azure"] })));

        assert_eq!(missing_fields(result), vec!["name", "namespace"]);
    }

    #[test]
    fn test_all_required_missing() {
        let validator = ConfigValidator::new();
        let result = validator.validate(&map(json!({ "imageName": "x" })));

        assert_eq!(missing_fields(result), vec!["name", "namespace", "targets"]);
    }

    #[test]
    fn test_empty_and_non_string_count_as_missing() {
        let validator = ConfigValidator::new();
        let result = validator.validate(&map(json!({
            "name": "  ",
            "namespace": 5,
            "targets": ["azure"],
        })));

        assert_eq!(missing_fields(result), vec!["name", "namespace"]);
    }

    #[test]
    fn test_invalid_targets() {
        let validator = ConfigValidator::new();

        for targets in [json!([]), json!("azure"), json!(["azure", 3]), json!([""])] {
            let result = validator.validate(&map(json!({
                "name": "svc",
                "namespace": "ns1",
                "targets": targets,
            })));
            assert!(matches!(
                result,
                Err(GitopsError::Config(ConfigError::InvalidTargetsField { .. }))
            ));
        }
    }

    #[test]
    fn test_nested_or_relative_targets_rejected() {
        let validator = ConfigValidator::new();

        for target in ["clusters/azure", "..", ".", "a\\b", "/abs", "gcp/"] {
            let result = validator.validate(&map(json!({
                "name": "svc",
                "namespace": "ns1",
                "targets": ["azure", target],
            })));
            match result {
                Err(GitopsError::Config(ConfigError::InvalidTargetsField { message })) => {
                    assert!(message.contains("targets[1]"), "unexpected message: {message}");
                }
                other => panic!("expected '{target}' to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_duplicate_target_warns() {
        let validator = ConfigValidator::new();
        let result = validator
            .validate(&map(json!({
                "name": "svc",
                "namespace": "ns1",
                "targets": ["azure", "azure"],
            })))
            .expect("duplicates are allowed");

        assert_eq!(result.targets.len(), 2);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_plain_segment() {
        assert!(is_plain_segment("ns1"));
        assert!(!is_plain_segment("a/b"));
        assert!(!is_plain_segment(".."));
        assert!(!is_plain_segment("a\\b"));
    }
}
