//! Engine configuration.
//!
//! Configuration is stored as YAML. Every key is optional; missing keys take
//! the defaults below.
//!
//! ```yaml
//! max-depth: 8
//! max-paths: 10000
//! scoring-version: weighted-v1
//! approval-version: threshold-v1
//! ```

use crate::approval::{self, DEFAULT_APPROVAL_VERSION};
use crate::error::{Error, Result};
use crate::scoring::{self, DEFAULT_SCORING_VERSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Default name of the configuration file
pub const CONFIG_FILE_NAME: &str = "impact.yaml";

/// Default traversal depth bound
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Default path-count bound
pub const DEFAULT_MAX_PATHS: usize = 10_000;

/// Settings for an [`ImpactAnalyzer`](crate::analyzer::ImpactAnalyzer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Longest path, in edges, to enumerate
    pub max_depth: usize,

    /// Maximum number of paths per analysis
    pub max_paths: usize,

    /// Scoring policy version
    pub scoring_version: String,

    /// Approval policy version
    pub approval_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_paths: DEFAULT_MAX_PATHS,
            scoring_version: DEFAULT_SCORING_VERSION.to_string(),
            approval_version: DEFAULT_APPROVAL_VERSION.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from YAML text and validate it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the YAML is malformed or a value is invalid.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// its content is malformed or invalid.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Check bounds and policy versions.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a zero bound or an unknown policy version.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max-depth must be positive".to_string()));
        }
        if self.max_paths == 0 {
            return Err(Error::Config("max-paths must be positive".to_string()));
        }
        scoring::evaluator_for_version(&self.scoring_version)?;
        approval::policy_for_version(&self.approval_version)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.scoring_version, "weighted-v1");
        assert_eq!(config.approval_version, "threshold-v1");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = EngineConfig::from_yaml("max-depth: 3\n").unwrap();

        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_paths, DEFAULT_MAX_PATHS);
    }

    #[rstest]
    #[case::zero_depth("max-depth: 0\n")]
    #[case::zero_paths("max-paths: 0\n")]
    #[case::unknown_scoring("scoring-version: magic\n")]
    #[case::unknown_approval("approval-version: always\n")]
    #[case::not_yaml("max-depth: [unclosed\n")]
    fn invalid_configs_are_rejected(#[case] content: &str) {
        assert!(matches!(
            EngineConfig::from_yaml(content),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn load_reads_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "max-depth: 4\nmax-paths: 250\n").await.unwrap();

        let loaded = EngineConfig::load(&path).await.unwrap();

        assert_eq!(
            loaded,
            EngineConfig {
                max_depth: 4,
                max_paths: 250,
                ..EngineConfig::default()
            }
        );
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();

        let err = EngineConfig::load(&dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }
}
