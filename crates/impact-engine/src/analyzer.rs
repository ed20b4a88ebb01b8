//! End-to-end impact analysis.
//!
//! [`ImpactAnalyzer`] wires the pipeline together:
//!
//! 1. load the project's graph from a [`GraphSupplier`]
//! 2. enumerate paths from the root ([`PathEnumerator`])
//! 3. score each path ([`RiskEvaluator`])
//! 4. aggregate per entity ([`aggregate`])
//! 5. apply the [`ApprovalPolicy`]
//! 6. assemble an [`ImpactResult`]
//!
//! Any failure aborts the whole call. Cancellation is checked before each of
//! steps 1-4; a token that is already cancelled short-circuits before the
//! graph is even loaded.

use crate::aggregator::{EntityImpact, OverallImpactSummary, aggregate};
use crate::approval::{self, ApprovalPolicy};
use crate::cancel::CancellationToken;
use crate::config::EngineConfig;
use crate::domain::{ChangeType, DependencyPath, EntityRef};
use crate::enumerator::{PathEnumerator, TruncationReason};
use crate::error::{Error, Result};
use crate::scoring::{self, PolicySnapshot, RiskEvaluator};
use crate::supplier::GraphSupplier;
use serde::Serialize;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};

/// Complete outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactResult {
    /// The changed entity
    pub root_entity: EntityRef,

    /// Kind of change analyzed
    pub change_type: ChangeType,

    /// Scoring policy version used
    pub scoring_version: String,

    /// Scoring parameters used
    pub scoring_policy_snapshot: PolicySnapshot,

    /// Approval policy version used
    pub approval_policy_version: String,

    /// Number of enumerated paths
    pub total_paths: usize,

    /// Number of distinct impacted entities
    pub total_entities: usize,

    /// Greatest path depth reached
    pub max_depth_reached: usize,

    /// Whether a traversal bound cut enumeration short
    pub is_truncated: bool,

    /// Which bound did, if any
    pub truncation_reason: Option<TruncationReason>,

    /// Overall worst case, with the approval decision
    pub overall_impact: OverallImpactSummary,

    /// Per-entity impact
    pub entity_impacts: Vec<EntityImpact>,

    /// Every scored path in discovery order
    pub paths: Vec<DependencyPath>,
}

/// Orchestrates graph loading, enumeration, scoring, aggregation and approval.
///
/// The analyzer holds no per-call state and can serve concurrent analyses.
pub struct ImpactAnalyzer {
    supplier: Arc<dyn GraphSupplier>,
    enumerator: PathEnumerator,
    evaluator: Arc<dyn RiskEvaluator>,
    approval: Arc<dyn ApprovalPolicy>,
}

impl std::fmt::Debug for ImpactAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactAnalyzer")
            .field("enumerator", &self.enumerator)
            .field("scoring_version", &self.evaluator.version())
            .field("approval_version", &self.approval.version())
            .finish_non_exhaustive()
    }
}

impl ImpactAnalyzer {
    /// Create an analyzer from explicit components.
    pub fn new(
        supplier: Arc<dyn GraphSupplier>,
        enumerator: PathEnumerator,
        evaluator: Arc<dyn RiskEvaluator>,
        approval: Arc<dyn ApprovalPolicy>,
    ) -> Self {
        Self {
            supplier,
            enumerator,
            evaluator,
            approval,
        }
    }

    /// Create an analyzer with bounds and policies taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid bounds or unknown policy versions.
    pub fn from_config(supplier: Arc<dyn GraphSupplier>, config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(
            supplier,
            PathEnumerator::new(config.max_depth, config.max_paths)?,
            scoring::evaluator_for_version(&config.scoring_version)?,
            approval::policy_for_version(&config.approval_version)?,
        ))
    }

    /// Analyze the impact of `change_type` applied to `root` in a project.
    ///
    /// # Errors
    ///
    /// - `Error::Cancelled` if `cancel` fires before scoring completes
    /// - `Error::GraphNotFound` or supplier errors from graph loading
    /// - `Error::RootNotFound` if `root` is not in the project's graph
    /// - `Error::EvaluatorContract` / `Error::UnscoredPath` if the risk
    ///   evaluator misbehaves
    pub async fn analyze(
        &self,
        project_id: i64,
        root: &EntityRef,
        change_type: ChangeType,
        cancel: &CancellationToken,
    ) -> Result<ImpactResult> {
        let span = info_span!(
            "impact_analysis",
            project_id,
            root = %root,
            change = %change_type
        );
        self.run(project_id, root, change_type, cancel)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        project_id: i64,
        root: &EntityRef,
        change_type: ChangeType,
        cancel: &CancellationToken,
    ) -> Result<ImpactResult> {
        cancel.check()?;
        let graph = self.supplier.load_graph(project_id).await?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Graph loaded"
        );

        cancel.check()?;
        let enumeration = self.enumerator.enumerate(&graph, root)?;

        cancel.check()?;
        let scored = self.score(enumeration.paths, change_type)?;

        cancel.check()?;
        let aggregation = aggregate(&scored)?;

        let overall_impact = self.approval.evaluate(&aggregation.overall_impact);
        let snapshot = self.evaluator.policy_snapshot();

        info!(
            scoring = %snapshot.version,
            policy_fingerprint = %snapshot.fingerprint(),
            paths = scored.len(),
            entities = aggregation.entity_impacts.len(),
            truncated = enumeration.is_truncated,
            worst = %overall_impact.worst_impact_level,
            requires_approval = overall_impact.requires_approval,
            "Impact analysis complete"
        );

        Ok(ImpactResult {
            root_entity: root.clone(),
            change_type,
            scoring_version: self.evaluator.version().to_string(),
            scoring_policy_snapshot: snapshot,
            approval_policy_version: self.approval.version().to_string(),
            total_paths: scored.len(),
            total_entities: aggregation.entity_impacts.len(),
            max_depth_reached: enumeration.max_depth_reached,
            is_truncated: enumeration.is_truncated,
            truncation_reason: enumeration.truncation_reason,
            overall_impact,
            entity_impacts: aggregation.entity_impacts,
            paths: scored,
        })
    }

    /// Score every path, rejecting evaluator output that changed a path's
    /// identity or left it unscored.
    fn score(
        &self,
        paths: Vec<DependencyPath>,
        change_type: ChangeType,
    ) -> Result<Vec<DependencyPath>> {
        paths
            .into_iter()
            .map(|path| {
                let path_id = path.path_id().to_string();
                let scored = self.evaluator.evaluate(path, change_type);
                if scored.path_id() != path_id {
                    return Err(Error::EvaluatorContract(format!(
                        "{} changed path id '{path_id}' to '{}'",
                        self.evaluator.version(),
                        scored.path_id()
                    )));
                }
                if !scored.is_scored() {
                    return Err(Error::UnscoredPath(path_id));
                }
                Ok(scored)
            })
            .collect()
    }
}
