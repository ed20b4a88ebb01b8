//! Path risk evaluation.
//!
//! A [`RiskEvaluator`] turns an enumerated path into a scored one. Evaluators
//! are versioned: the version string and a [`PolicySnapshot`] of the exact
//! parameters used travel with every analysis result, so a decision can be
//! reproduced later even after the default policy changes.
//!
//! # Contract
//!
//! - Pure: the same `(path, change type)` always yields the same score.
//! - Total: never fails for a well-formed path.
//! - Only the risk annotation changes; identity fields stay as they were.
//!
//! # Policies
//!
//! - `weighted-v1` ([`WeightedRiskEvaluator`]): multiplies dependency-type,
//!   criticality and change-type weights, then decays the product with depth.

use crate::domain::{ChangeType, DependencyPath, DependencyType, ImpactLevel};
use crate::error::{Error, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Version string of [`WeightedRiskEvaluator`].
pub const WEIGHTED_V1: &str = "weighted-v1";

/// Scoring policy used when none is configured.
pub const DEFAULT_SCORING_VERSION: &str = WEIGHTED_V1;

/// Scores dependency paths for a given change type.
pub trait RiskEvaluator: Send + Sync + std::fmt::Debug {
    /// Identifies the scoring formula.
    fn version(&self) -> &str;

    /// Parameters the formula uses, for audit records.
    fn policy_snapshot(&self) -> PolicySnapshot;

    /// Return `path` with its risk score and impact level populated.
    fn evaluate(&self, path: DependencyPath, change_type: ChangeType) -> DependencyPath;
}

/// Audit record of a scoring policy's parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySnapshot {
    /// Policy version the parameters belong to
    pub version: String,

    /// Parameter name -> value, in name order
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl PolicySnapshot {
    /// Create an empty snapshot for `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Record a parameter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// SHA-256 over the version and parameters, as lowercase hex.
    ///
    /// Two snapshots with equal content always have equal fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.version.as_bytes());
        for (name, value) in &self.parameters {
            hasher.update(b"|");
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.to_string().as_bytes());
        }

        hasher
            .finalize()
            .iter()
            .fold(String::with_capacity(64), |mut hex, byte| {
                let _ = write!(hex, "{byte:02x}");
                hex
            })
    }
}

/// Look up a scoring policy by version string.
///
/// # Errors
///
/// Returns `Error::Config` for an unknown version.
pub fn evaluator_for_version(version: &str) -> Result<Arc<dyn RiskEvaluator>> {
    match version {
        WEIGHTED_V1 => Ok(Arc::new(WeightedRiskEvaluator)),
        other => Err(Error::Config(format!(
            "unknown scoring version '{other}' (known: {WEIGHTED_V1})"
        ))),
    }
}

/// Percentage added to the divisor for each edge beyond the first.
const DEPTH_DECAY_PERCENT: u32 = 25;

/// Scores below this are `Low`.
const MEDIUM_THRESHOLD: u32 = 8;

/// Scores below this (and at least `MEDIUM_THRESHOLD`) are `Medium`.
const HIGH_THRESHOLD: u32 = 24;

/// Scores at or above this are `Critical`.
const CRITICAL_THRESHOLD: u32 = 48;

/// Version 1 of the weighted scoring policy.
///
/// ```text
/// base  = weight(max dependency type) × max criticality × weight(change type)
/// score = max(1, base × 100 / (100 + 25 × (depth − 1)))
/// ```
///
/// Levels: `< 8` Low, `< 24` Medium, `< 48` High, otherwise Critical. A scored
/// path is never `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRiskEvaluator;

impl WeightedRiskEvaluator {
    fn dependency_weight(dependency_type: DependencyType) -> u32 {
        match dependency_type {
            DependencyType::Unknown | DependencyType::Weak => 1,
            DependencyType::Normal => 2,
            DependencyType::Strong => 3,
            DependencyType::Critical => 5,
        }
    }

    fn change_weight(change_type: ChangeType) -> u32 {
        match change_type {
            ChangeType::Additive => 1,
            ChangeType::Modification => 2,
            ChangeType::Breaking => 4,
            ChangeType::Removal => 5,
        }
    }

    /// Raw score for a path, before level classification.
    #[must_use]
    pub fn score(path: &DependencyPath, change_type: ChangeType) -> u32 {
        let base = Self::dependency_weight(path.max_dependency_type())
            * u32::from(path.max_criticality().level())
            * Self::change_weight(change_type);

        let extra_edges = u32::try_from(path.depth().saturating_sub(1)).unwrap_or(u32::MAX);
        let divisor = 100_u32.saturating_add(DEPTH_DECAY_PERCENT.saturating_mul(extra_edges));

        (base * 100 / divisor).max(1)
    }

    /// Map a score onto the impact scale.
    #[must_use]
    pub fn level(score: u32) -> ImpactLevel {
        match score {
            0 => ImpactLevel::None,
            s if s < MEDIUM_THRESHOLD => ImpactLevel::Low,
            s if s < HIGH_THRESHOLD => ImpactLevel::Medium,
            s if s < CRITICAL_THRESHOLD => ImpactLevel::High,
            _ => ImpactLevel::Critical,
        }
    }
}

impl RiskEvaluator for WeightedRiskEvaluator {
    fn version(&self) -> &str {
        WEIGHTED_V1
    }

    fn policy_snapshot(&self) -> PolicySnapshot {
        let dependency_weights: BTreeMap<&str, u32> = [
            DependencyType::Unknown,
            DependencyType::Weak,
            DependencyType::Normal,
            DependencyType::Strong,
            DependencyType::Critical,
        ]
        .into_iter()
        .map(|d| (d.as_str(), Self::dependency_weight(d)))
        .collect();

        let change_weights: BTreeMap<&str, u32> = [
            ChangeType::Additive,
            ChangeType::Modification,
            ChangeType::Breaking,
            ChangeType::Removal,
        ]
        .into_iter()
        .map(|c| (c.as_str(), Self::change_weight(c)))
        .collect();

        PolicySnapshot::new(WEIGHTED_V1)
            .with("dependency_weights", serde_json::json!(dependency_weights))
            .with("change_weights", serde_json::json!(change_weights))
            .with("depth_decay_percent", DEPTH_DECAY_PERCENT)
            .with(
                "level_thresholds",
                serde_json::json!({
                    "medium": MEDIUM_THRESHOLD,
                    "high": HIGH_THRESHOLD,
                    "critical": CRITICAL_THRESHOLD,
                }),
            )
    }

    fn evaluate(&self, path: DependencyPath, change_type: ChangeType) -> DependencyPath {
        let score = Self::score(&path, change_type);
        path.with_risk(score, Self::level(score))
    }
}
