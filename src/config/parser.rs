//! Configuration parser for the application and cluster config files.
//!
//! This module handles loading JSON or YAML mappings from disk, enforcing
//! the application config's required fields, and injecting the derived
//! `version` and `deploy` bindings from the run context.

use crate::context::RunContext;
use crate::error::{ConfigError, GitopsError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::spec::{ApplicationConfig, ClusterConfig};
use super::validator::{ConfigValidator, TARGETS_FIELD};

/// Cluster configuration file names, in lookup order.
pub const CLUSTER_CONFIG_FILES: &[&str] = &["config.json", "config.yaml", "config.yml"];

/// Configuration parser for loading deployment configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for the `.env` file.
    base_path: Option<PathBuf>,
    /// Required-field validator.
    validator: ConfigValidator,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_path: None,
            validator: ConfigValidator::new(),
        }
    }

    /// Sets the base path used to locate `.env`.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, is not a mapping, lacks
    /// required fields, or has a malformed `targets` list.
    pub fn load_app_config(&self, path: impl AsRef<Path>, ctx: &RunContext) -> Result<ApplicationConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.is_file() {
            return Err(GitopsError::Config(ConfigError::ConfigNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path)?;
        self.parse_app_config(&content, path, ctx)
    }

    /// Parses application configuration content read from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid application config.
    pub fn parse_app_config(
        &self,
        content: &str,
        source: &Path,
        ctx: &RunContext,
    ) -> Result<ApplicationConfig> {
        let mut fields = Self::parse_mapping(content, source)?;

        let result = self.validator.validate(&fields)?;
        for warning in &result.warnings {
            warn!("{warning}");
        }

        fields.shift_remove(TARGETS_FIELD);
        Self::inject_derived(&mut fields, ctx);

        let name = string_field(&fields, "name");
        let namespace = string_field(&fields, "namespace");

        debug!(
            "Parsed configuration for {name} in namespace {namespace} with {} target(s)",
            result.targets.len()
        );
        Ok(ApplicationConfig::from_parts(name, namespace, result.targets, fields))
    }

    /// Loads the cluster configuration inside `target_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if no config file exists or it is not a mapping.
    pub fn load_cluster_config(&self, target: &str, target_dir: &Path) -> Result<ClusterConfig> {
        let Some(path) = CLUSTER_CONFIG_FILES
            .iter()
            .map(|file| target_dir.join(file))
            .find(|p| p.is_file())
        else {
            return Err(GitopsError::Config(ConfigError::ClusterConfigNotFound {
                target: target.to_string(),
                path: target_dir.to_path_buf(),
            }));
        };

        debug!("Loading cluster configuration from: {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        let fields = Self::parse_mapping(&content, &path)?;

        Ok(ClusterConfig::new(target, fields))
    }

    /// Reads the shared template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist or cannot be read.
    pub fn load_template(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(GitopsError::Config(ConfigError::TemplateNotFound {
                path: path.to_path_buf(),
            }));
        }

        info!("Loading template from: {}", path.display());
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parses `content` as a mapping, choosing YAML or JSON by extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFormat`] if the content does not parse
    /// or is not a mapping at the top level.
    pub fn parse_mapping(content: &str, source: &Path) -> Result<Map<String, Value>> {
        let location = source.display().to_string();

        let value: Value = if is_yaml(source) {
            serde_yaml::from_str(content).map_err(|e| {
                GitopsError::Config(ConfigError::invalid_format(&location, format!("YAML parse error: {e}")))
            })?
        } else {
            parse_json(content).map_err(|e| GitopsError::Config(ConfigError::invalid_format(&location, e)))?
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(GitopsError::Config(ConfigError::invalid_format(
                location,
                format!("expected a mapping at the top level, found {}", kind_name(&other)),
            ))),
        }
    }

    /// Adds `version` and `deploy` unless the config already sets them.
    fn inject_derived(fields: &mut Map<String, Value>, ctx: &RunContext) {
        if !fields.contains_key("version") {
            fields.insert(String::from("version"), Value::String(ctx.version.clone()));
        }

        if !fields.contains_key("deploy") {
            fields.insert(String::from("deploy"), Value::String(ctx.deploy_stamp()));
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                GitopsError::Config(ConfigError::invalid_format(
                    env_path.display().to_string(),
                    format!("Failed to load .env file: {e}"),
                ))
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Returns true if `path` has a YAML extension.
fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Parses JSON, tolerating `//` and `/* */` comments and trailing commas.
///
/// Strict JSON is tried first so numbers keep their source spelling; the
/// lenient reader is only used for files the strict one rejects.
fn parse_json(content: &str) -> std::result::Result<Value, String> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(strict) => json5::from_str(content).map_err(|_| format!("JSON parse error: {strict}")),
    }
}

/// Reads a string field that validation already guaranteed.
fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Short name of a JSON value's type, for error messages.
const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DeployLayout;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn test_context() -> RunContext {
        let started = Utc
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 2)
            .single()
            .expect("valid timestamp");
        RunContext::at(DeployLayout::from_deploy_root("deploy"), Some(String::from("42")), started)
    }

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{"name": "svc", "namespace": "ns1", "targets": ["azure", "gcp"]}"#;
        let parser = ConfigParser::new();
        let config = parser
            .parse_app_config(json, Path::new("gitops.json"), &test_context())
            .expect("config should parse");

        assert_eq!(config.name, "svc");
        assert_eq!(config.namespace, "ns1");
        assert_eq!(config.targets, vec!["azure", "gcp"]);
        assert!(config.get("targets").is_none());
        assert_eq!(config.version().as_deref(), Some("42"));
        assert_eq!(config.deploy().as_deref(), Some("24-03-07-09-05-02"));
    }

    #[test]
    fn test_existing_version_is_kept() {
        let json = r#"{"name": "svc", "namespace": "ns1", "targets": ["azure"], "version": "7.1", "deploy": "fixed"}"#;
        let parser = ConfigParser::new();
        let config = parser
            .parse_app_config(json, Path::new("gitops.json"), &test_context())
            .expect("config should parse");

        assert_eq!(config.version().as_deref(), Some("7.1"));
        assert_eq!(config.deploy().as_deref(), Some("fixed"));
    }

    #[test]
    fn test_scope_order_follows_file_then_derived() {
        let json = r#"{"namespace": "ns1", "targets": ["azure"], "imageName": "img", "name": "svc"}"#;
        let parser = ConfigParser::new();
        let config = parser
            .parse_app_config(json, Path::new("gitops.json"), &test_context())
            .expect("config should parse");

        let scope = config.scope();
        let keys: Vec<_> = scope.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["namespace", "imageName", "name", "version", "deploy"]);
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r"
name: svc
namespace: ns1
replicas: 3
targets:
  - azure
";
        let parser = ConfigParser::new();
        let config = parser
            .parse_app_config(yaml, Path::new("gitops.yaml"), &test_context())
            .expect("yaml config should parse");

        assert_eq!(config.targets, vec!["azure"]);
        assert_eq!(config.scope().get("replicas"), Some("3"));
    }

    #[test]
    fn test_invalid_json_is_invalid_format() {
        let parser = ConfigParser::new();
        let result = parser.parse_app_config("{ not json", Path::new("gitops.json"), &test_context());

        assert!(matches!(
            result,
            Err(GitopsError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_json_comments_and_trailing_commas() {
        let json = r#"{
            // application
            "name": "svc",
            "namespace": "ns1", /* shared */
            "targets": ["azure", "gcp",],
        }"#;
        let parser = ConfigParser::new();
        let config = parser
            .parse_app_config(json, Path::new("gitops.json"), &test_context())
            .expect("commented config should parse");

        assert_eq!(config.name, "svc");
        assert_eq!(config.targets, vec!["azure", "gcp"]);
    }

    #[test]
    fn test_commented_cluster_config() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            temp.path().join("config.json"),
            "{\n  // primary region\n  \"region\": \"eastus\",\n}\n",
        )
        .expect("write cluster config");

        let cluster = ConfigParser::new()
            .load_cluster_config("azure", temp.path())
            .expect("commented cluster config should load");
        assert_eq!(cluster.scope().get("region"), Some("eastus"));
    }

    #[test]
    fn test_non_mapping_is_invalid_format() {
        let result = ConfigParser::parse_mapping("[1, 2]", Path::new("config.json"));

        assert!(matches!(
            result,
            Err(GitopsError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_missing_app_config() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let parser = ConfigParser::new();
        let result = parser.load_app_config(temp.path().join("gitops.json"), &test_context());

        assert!(matches!(
            result,
            Err(GitopsError::Config(ConfigError::ConfigNotFound { .. }))
        ));
    }

    #[test]
    fn test_load_cluster_config_json_then_yaml() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let parser = ConfigParser::new();

        std::fs::write(temp.path().join("config.yaml"), "region: westeu\n").expect("write yaml");
        let cluster = parser
            .load_cluster_config("gcp", temp.path())
            .expect("yaml cluster config should load");
        assert_eq!(cluster.scope().get("region"), Some("westeu"));

        std::fs::write(temp.path().join("config.json"), r#"{"region": "eastus"}"#).expect("write json");
        let cluster = parser
            .load_cluster_config("gcp", temp.path())
            .expect("json cluster config should load");
        assert_eq!(cluster.scope().get("region"), Some("eastus"));
        assert_eq!(cluster.target, "gcp");
    }

    #[test]
    fn test_missing_cluster_config() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let parser = ConfigParser::new();
        let result = parser.load_cluster_config("azure", temp.path());

        assert!(matches!(
            result,
            Err(GitopsError::Config(ConfigError::ClusterConfigNotFound { .. }))
        ));
    }

    #[test]
    fn test_dotenv_read_from_base_path() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp.path().join(".env"), "GITOPS_PARSER_TEST_BASE=from-base\n")
            .expect("write .env");

        ConfigParser::new()
            .with_base_path(temp.path())
            .load_dotenv()
            .expect(".env should load");

        assert_eq!(
            std::env::var("GITOPS_PARSER_TEST_BASE").as_deref(),
            Ok("from-base")
        );
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp.path().join(".env"), "not a valid line\n").expect("write .env");

        let result = ConfigParser::new().with_base_path(temp.path()).load_dotenv();

        assert!(matches!(
            result,
            Err(GitopsError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_missing_template() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let parser = ConfigParser::new();
        let result = parser.load_template(temp.path().join("gitops.yaml"));

        assert!(matches!(
            result,
            Err(GitopsError::Config(ConfigError::TemplateNotFound { .. }))
        ));
    }
}
