//! Reduction of scored paths into per-entity and overall impact.
//!
//! Aggregation is worst-case dominant: an entity's headline severity is the
//! maximum over the paths that end at it, never an average. The cumulative
//! score is reported alongside as the exact sum.
//!
//! The aggregator never decides whether approval is required; that belongs to
//! the [`approval`](crate::approval) policy.

use crate::domain::{DependencyPath, EntityRef, ImpactLevel};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

/// Impact on a single entity, reduced over every path that ends at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityImpact {
    /// The affected entity
    pub entity: EntityRef,

    /// Highest impact level among the entity's paths
    pub worst_case_impact_level: ImpactLevel,

    /// Highest risk score among the entity's paths
    pub worst_case_risk_score: u32,

    /// Sum of the risk scores of the entity's paths
    pub cumulative_risk_score: u64,

    /// First path achieving the highest risk score
    pub dominant_path_id: String,

    /// Every path ending at the entity, in input order
    pub paths: Vec<DependencyPath>,
}

/// The single worst entity-level outcome of an analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverallImpactSummary {
    /// Worst impact level over all entities
    pub worst_impact_level: ImpactLevel,

    /// Risk score of the triggering entity
    pub worst_risk_score: u32,

    /// Entity responsible for the worst outcome, `None` if nothing was impacted
    pub triggering_entity: Option<EntityRef>,

    /// Dominant path of the triggering entity, empty if nothing was impacted
    pub triggering_path_id: String,

    /// Set by the approval policy, always `false` straight out of aggregation
    pub requires_approval: bool,
}

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImpactAggregationResult {
    /// Overall worst case
    pub overall_impact: OverallImpactSummary,

    /// Per-entity impact, ordered by first appearance of the entity as a
    /// path terminal
    pub entity_impacts: Vec<EntityImpact>,
}

/// Aggregate scored paths.
///
/// Paths are grouped by terminal entity. Empty input yields the zero-valued
/// result.
///
/// # Errors
///
/// Returns `Error::UnscoredPath` if any path has not been through a risk
/// evaluator.
pub fn aggregate(scored_paths: &[DependencyPath]) -> Result<ImpactAggregationResult> {
    let mut entity_impacts: Vec<EntityImpact> = Vec::new();
    let mut position: HashMap<&EntityRef, usize> = HashMap::new();

    for path in scored_paths {
        let Some(risk) = path.risk() else {
            return Err(Error::UnscoredPath(path.path_id().to_string()));
        };
        let Some(terminal) = path.terminal() else {
            continue;
        };

        if let Some(&i) = position.get(terminal) {
            let impact = &mut entity_impacts[i];
            impact.worst_case_impact_level = impact.worst_case_impact_level.max(risk.level);
            // Strictly greater keeps the first path on ties.
            if risk.score > impact.worst_case_risk_score {
                impact.worst_case_risk_score = risk.score;
                impact.dominant_path_id = path.path_id().to_string();
            }
            impact.cumulative_risk_score = impact
                .cumulative_risk_score
                .saturating_add(u64::from(risk.score));
            impact.paths.push(path.clone());
        } else {
            position.insert(terminal, entity_impacts.len());
            entity_impacts.push(EntityImpact {
                entity: terminal.clone(),
                worst_case_impact_level: risk.level,
                worst_case_risk_score: risk.score,
                cumulative_risk_score: u64::from(risk.score),
                dominant_path_id: path.path_id().to_string(),
                paths: vec![path.clone()],
            });
        }
    }

    let overall_impact = overall(&entity_impacts);

    trace!(
        paths = scored_paths.len(),
        entities = entity_impacts.len(),
        worst = %overall_impact.worst_impact_level,
        "Aggregated path impact"
    );

    Ok(ImpactAggregationResult {
        overall_impact,
        entity_impacts,
    })
}

/// Pick the entity with the highest `(level, score)`; first wins on a tie.
fn overall(entity_impacts: &[EntityImpact]) -> OverallImpactSummary {
    let worst = entity_impacts.iter().fold(None::<&EntityImpact>, |best, e| match best {
        Some(b)
            if (b.worst_case_impact_level, b.worst_case_risk_score)
                >= (e.worst_case_impact_level, e.worst_case_risk_score) =>
        {
            Some(b)
        }
        _ => Some(e),
    });

    worst.map_or_else(OverallImpactSummary::default, |e| OverallImpactSummary {
        worst_impact_level: e.worst_case_impact_level,
        worst_risk_score: e.worst_case_risk_score,
        triggering_entity: Some(e.entity.clone()),
        triggering_path_id: e.dominant_path_id.clone(),
        requires_approval: false,
    })
}
