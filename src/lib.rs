// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Gitops Manifests
//!
//! Renders one deployment manifest per target from a single template and
//! reconciles the generated tree against the declared target list.
//!
//! ## Overview
//!
//! A repository holds an application config (`gitops.json`), a template
//! (`gitops.yaml`) and a `deploy/` directory with one subdirectory per
//! target cluster. Each target directory carries its own cluster config.
//! A run:
//!
//! 1. **Prunes** `<target>/<namespace>/<name>.yaml` under every directory
//!    of `deploy/`, declared or not
//! 2. **Creates** `<target>/<namespace>/namespace.yaml` once per target
//! 3. **Renders** the template with the application and cluster bindings
//! 4. **Validates** that no placeholder is left, then writes the manifest
//!
//! ## Modules
//!
//! - [`config`]: Application and cluster configuration loading
//! - [`context`]: Run context and on-disk layout
//! - [`render`]: Placeholder substitution and validation
//! - [`planner`]: Prune-then-create reconciliation and dry-run plans
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! apiVersion: apps/v1
//! kind: Deployment
//! metadata:
//!   name: {{gitops.name}}
//!   namespace: {{gitops.namespace}}
//! spec:
//!   template:
//!     spec:
//!       containers:
//!         - name: app
//!           image: {{gitops.imageName}}:{{gitops.version}}
//!           env:
//!             - name: REGION
//!               value: {{ gitops.config.region }}
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod planner;
pub mod render;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ApplicationConfig, ClusterConfig, ConfigParser, ConfigValidator};
pub use context::{DeployLayout, RunContext};
pub use error::{GitopsError, Result};
pub use planner::{DeploymentPlan, DeploymentPlanner, ManifestHasher, RunReport};
pub use render::{ManifestValidator, Scope, TemplateRenderer};
