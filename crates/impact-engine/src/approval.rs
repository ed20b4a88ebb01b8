//! Approval policies.
//!
//! A policy maps the overall worst-case impact to a yes/no "requires human
//! sign-off" decision. Policies are versioned independently of scoring and
//! aggregation so either side can change without touching the other.

use crate::aggregator::OverallImpactSummary;
use crate::domain::ImpactLevel;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Version string of [`ThresholdApprovalPolicy`].
pub const THRESHOLD_V1: &str = "threshold-v1";

/// Approval policy used when none is configured.
pub const DEFAULT_APPROVAL_VERSION: &str = THRESHOLD_V1;

/// Decides whether an analysis outcome requires approval.
pub trait ApprovalPolicy: Send + Sync + std::fmt::Debug {
    /// Identifies the policy rules.
    fn version(&self) -> &str;

    /// Return `summary` with `requires_approval` recomputed; every other
    /// field is copied unchanged.
    fn evaluate(&self, summary: &OverallImpactSummary) -> OverallImpactSummary;
}

/// Look up an approval policy by version string.
///
/// # Errors
///
/// Returns `Error::Config` for an unknown version.
pub fn policy_for_version(version: &str) -> Result<Arc<dyn ApprovalPolicy>> {
    match version {
        THRESHOLD_V1 => Ok(Arc::new(ThresholdApprovalPolicy)),
        other => Err(Error::Config(format!(
            "unknown approval policy version '{other}' (known: {THRESHOLD_V1})"
        ))),
    }
}

/// Version 1: approval is required exactly when the worst impact level is
/// `High` or `Critical`.
///
/// Path counts, cumulative scores and entity identity are deliberately not
/// consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdApprovalPolicy;

impl ThresholdApprovalPolicy {
    /// Lowest level that requires approval.
    pub const THRESHOLD: ImpactLevel = ImpactLevel::High;
}

impl ApprovalPolicy for ThresholdApprovalPolicy {
    fn version(&self) -> &str {
        THRESHOLD_V1
    }

    fn evaluate(&self, summary: &OverallImpactSummary) -> OverallImpactSummary {
        OverallImpactSummary {
            requires_approval: summary.worst_impact_level >= Self::THRESHOLD,
            ..summary.clone()
        }
    }
}
