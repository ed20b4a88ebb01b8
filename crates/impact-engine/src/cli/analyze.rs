//! `impact analyze` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use impact_engine::analyzer::ImpactAnalyzer;
use impact_engine::cancel::CancellationToken;
use impact_engine::config::{CONFIG_FILE_NAME, EngineConfig};
use impact_engine::domain::{ChangeType, EntityRef};
use impact_engine::supplier::JsonlGraphSupplier;

use super::display::{print_impact_result, print_json};

/// Options for the analyze command.
#[derive(Debug)]
pub struct AnalyzeOptions {
    /// Directory holding graph files
    pub graph_dir: PathBuf,
    /// Project to analyze
    pub project: i64,
    /// Changed entity
    pub root: EntityRef,
    /// Kind of change
    pub change: ChangeType,
    /// Configuration file, `impact.yaml` in the working directory if present
    pub config: Option<PathBuf>,
    /// Depth bound override
    pub max_depth: Option<usize>,
    /// Path-count bound override
    pub max_paths: Option<usize>,
    /// List every path in text output
    pub show_paths: bool,
    /// Emit JSON instead of text
    pub json: bool,
}

/// Run the analyze command.
pub async fn run(options: AnalyzeOptions) -> Result<()> {
    let config_path = match options.config {
        Some(path) => Some(path),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            tokio::fs::try_exists(&local)
                .await
                .unwrap_or(false)
                .then_some(local)
        }
    };
    let mut config = match &config_path {
        Some(path) => EngineConfig::load(path)
            .await
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(max_depth) = options.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(max_paths) = options.max_paths {
        config.max_paths = max_paths;
    }
    config.validate()?;

    let supplier = Arc::new(JsonlGraphSupplier::new(&options.graph_dir));
    let analyzer = ImpactAnalyzer::from_config(supplier, &config)?;

    let result = analyzer
        .analyze(
            options.project,
            &options.root,
            options.change,
            &CancellationToken::new(),
        )
        .await
        .with_context(|| {
            format!(
                "impact analysis of {} in project {} failed",
                options.root, options.project
            )
        })?;

    if options.json {
        print_json(&result)?;
    } else {
        print_impact_result(&result, options.show_paths);
    }

    Ok(())
}
