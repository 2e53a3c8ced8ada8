//! Run context and on-disk layout.
//!
//! A [`RunContext`] is built once per invocation and handed to every
//! component: it carries the resolved paths, the build version and the
//! instant the run started, so nothing reads process-wide state.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, DeployError, GitopsError, Result};

/// Application configuration file name.
pub const APP_CONFIG_FILE: &str = "gitops.json";

/// Shared template file name.
pub const TEMPLATE_FILE: &str = "gitops.yaml";

/// Deploy root directory name, relative to the base directory.
pub const DEPLOY_DIR: &str = "deploy";

/// Namespace manifest file name inside each `<target>/<namespace>` directory.
pub const NAMESPACE_MANIFEST: &str = "namespace.yaml";

/// Relative hop tried when the configuration is not next to the start directory.
const FALLBACK_HOPS: &str = "../../../..";

/// Resolved locations of every input and the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployLayout {
    /// Root of the generated tree; each subdirectory is a potential target.
    pub deploy_root: PathBuf,
    /// Application configuration file.
    pub app_config: PathBuf,
    /// Shared manifest template.
    pub template: PathBuf,
}

impl DeployLayout {
    /// Builds the layout for an explicit deploy root.
    ///
    /// The application config and template live two levels above it.
    #[must_use]
    pub fn from_deploy_root(deploy_root: impl Into<PathBuf>) -> Self {
        let deploy_root = deploy_root.into();
        let upper = deploy_root.join("..").join("..");

        Self {
            app_config: upper.join(APP_CONFIG_FILE),
            template: upper.join(TEMPLATE_FILE),
            deploy_root,
        }
    }

    /// Finds the layout starting from a working directory.
    ///
    /// `start/../gitops.json` is tried first, then one fallback from
    /// `start/../../../..`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither location holds the configuration, or if
    /// the deploy directory does not exist.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        let primary = start.join("..").join(APP_CONFIG_FILE);

        let base = if primary.exists() {
            start.to_path_buf()
        } else {
            let fallback = start.join(FALLBACK_HOPS);
            if !fallback.join("..").join(APP_CONFIG_FILE).exists() {
                return Err(GitopsError::Config(ConfigError::ConfigNotFound {
                    path: primary,
                }));
            }
            debug!("Configuration not beside {}, using {}", start.display(), fallback.display());
            fallback
        };

        let deploy_root = base.join(DEPLOY_DIR);
        if !deploy_root.is_dir() {
            return Err(GitopsError::Deploy(DeployError::DeployRootMissing {
                path: deploy_root,
            }));
        }

        info!("Using deploy directory: {}", deploy_root.display());
        Ok(Self::from_deploy_root(deploy_root))
    }

    /// Replaces the application config path.
    #[must_use]
    pub fn with_app_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_config = path.into();
        self
    }

    /// Replaces the template path.
    #[must_use]
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = path.into();
        self
    }

    /// Directory holding the application config; `.env` is read from here.
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        self.app_config
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    /// Directory for a target.
    #[must_use]
    pub fn target_dir(&self, target: &str) -> PathBuf {
        self.deploy_root.join(target)
    }

    /// `<target>/<namespace>` directory.
    #[must_use]
    pub fn namespace_dir(&self, target: &str, namespace: &str) -> PathBuf {
        self.target_dir(target).join(namespace)
    }

    /// `<target>/<namespace>/namespace.yaml`.
    #[must_use]
    pub fn namespace_manifest(&self, target: &str, namespace: &str) -> PathBuf {
        self.namespace_dir(target, namespace).join(NAMESPACE_MANIFEST)
    }

    /// `<target>/<namespace>/<name>.yaml`.
    #[must_use]
    pub fn manifest(&self, target: &str, namespace: &str, name: &str) -> PathBuf {
        self.namespace_dir(target, namespace).join(format!("{name}.yaml"))
    }
}

/// Per-run values shared by every component.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Resolved paths.
    pub layout: DeployLayout,
    /// Build identifier injected as `version` when the config has none.
    pub version: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    /// Creates a context starting now.
    ///
    /// Without an explicit version, one is derived from the start time.
    #[must_use]
    pub fn new(layout: DeployLayout, version: Option<String>) -> Self {
        Self::at(layout, version, Utc::now())
    }

    /// Creates a context with a fixed start time.
    #[must_use]
    pub fn at(layout: DeployLayout, version: Option<String>, started_at: DateTime<Utc>) -> Self {
        let version = version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| started_at.format("%m%d-%H%M").to_string());

        Self {
            layout,
            version,
            started_at,
        }
    }

    /// Deploy stamp injected as `deploy` when the config has none.
    #[must_use]
    pub fn deploy_stamp(&self) -> String {
        self.started_at.format("%y-%m-%d-%H-%M-%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_layout_paths() {
        let layout = DeployLayout::from_deploy_root("/repo/app/deploy");

        assert_eq!(layout.app_config, Path::new("/repo/app/deploy/../../gitops.json"));
        assert_eq!(layout.template, Path::new("/repo/app/deploy/../../gitops.yaml"));
        assert_eq!(
            layout.manifest("azure", "ns1", "svc"),
            Path::new("/repo/app/deploy/azure/ns1/svc.yaml")
        );
        assert_eq!(
            layout.namespace_manifest("azure", "ns1"),
            Path::new("/repo/app/deploy/azure/ns1/namespace.yaml")
        );
    }

    #[test]
    fn test_default_version_and_stamp() {
        let layout = DeployLayout::from_deploy_root("deploy");
        let ctx = RunContext::at(layout, None, fixed_time());

        assert_eq!(ctx.version, "0307-0905");
        assert_eq!(ctx.deploy_stamp(), "24-03-07-09-05-02");
    }

    #[test]
    fn test_explicit_version_is_trimmed() {
        let layout = DeployLayout::from_deploy_root("deploy");
        let ctx = RunContext::at(layout, Some(String::from("  1.2.3 ")), fixed_time());

        assert_eq!(ctx.version, "1.2.3");
    }

    #[test]
    fn test_discover_primary() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let start = temp.path().join("app");
        std::fs::create_dir_all(start.join(DEPLOY_DIR)).expect("create deploy dir");
        std::fs::write(temp.path().join(APP_CONFIG_FILE), "{}").expect("write config");

        let layout = DeployLayout::discover(&start).expect("layout should resolve");
        assert_eq!(layout.deploy_root, start.join(DEPLOY_DIR));
        assert!(layout.app_config.exists());
        assert!(layout.base_dir().join(APP_CONFIG_FILE).is_file());
    }

    #[test]
    fn test_discover_fallback() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let base = temp.path().join("app");
        let nested = base.join("bin").join("Debug").join("net").join("out");
        std::fs::create_dir_all(&nested).expect("create nested dir");
        std::fs::create_dir_all(base.join(DEPLOY_DIR)).expect("create deploy dir");
        std::fs::write(temp.path().join(APP_CONFIG_FILE), "{}").expect("write config");

        let layout = DeployLayout::discover(&nested).expect("fallback should resolve");
        assert!(layout.deploy_root.is_dir());
        assert!(layout.app_config.exists());
    }

    #[test]
    fn test_discover_missing_config() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let start = temp.path().join("a").join("b").join("c").join("d").join("e");
        std::fs::create_dir_all(&start).expect("create dirs");

        let result = DeployLayout::discover(&start);
        assert!(matches!(
            result,
            Err(GitopsError::Config(ConfigError::ConfigNotFound { .. }))
        ));
    }

    #[test]
    fn test_discover_missing_deploy_dir() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let start = temp.path().join("app");
        std::fs::create_dir_all(&start).expect("create app dir");
        std::fs::write(temp.path().join(APP_CONFIG_FILE), "{}").expect("write config");

        let result = DeployLayout::discover(&start);
        assert!(matches!(
            result,
            Err(GitopsError::Deploy(DeployError::DeployRootMissing { .. }))
        ));
    }
}
