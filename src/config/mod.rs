//! Configuration module for the manifest generator.
//!
//! This module handles all configuration-related functionality:
//! - Parsing the application config (`gitops.json`) and per-target cluster configs
//! - Aggregated validation of required fields
//! - Injection of the derived `version` and `deploy` bindings

mod parser;
mod spec;
mod validator;

pub use parser::{CLUSTER_CONFIG_FILES, ConfigParser};
pub use spec::{ApplicationConfig, ClusterConfig};
pub use validator::{ConfigValidator, REQUIRED_FIELDS, TARGETS_FIELD, ValidationError, ValidationResult};
