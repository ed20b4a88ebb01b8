//! Dependency paths produced by enumeration and annotated by scoring.

use super::{Criticality, DependencyType, EntityRef, ImpactLevel};
use serde::Serialize;

/// Separator between node keys in a path identifier.
pub const PATH_ID_SEPARATOR: &str = "->";

/// Risk assigned to a path by a risk evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathRisk {
    /// Non-negative risk score
    pub score: u32,

    /// Discrete impact level
    pub level: ImpactLevel,
}

/// One cycle-free path from the root entity.
///
/// Nodes are ordered root first; `edges[i]` is the dependency type between
/// `nodes[i]` and `nodes[i + 1]`. Identity fields are fixed at construction,
/// only the risk annotation can be added afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyPath {
    path_id: String,
    nodes: Vec<EntityRef>,
    edges: Vec<DependencyType>,
    depth: usize,
    max_dependency_type: DependencyType,
    max_criticality: Criticality,
    risk: Option<PathRisk>,
}

impl DependencyPath {
    /// Create an unscored path, validating invariants.
    ///
    /// Returns `None` if:
    /// - `nodes` is empty
    /// - `edges.len()` does not equal `nodes.len() - 1`
    #[must_use]
    pub fn new(
        nodes: Vec<EntityRef>,
        edges: Vec<DependencyType>,
        max_criticality: Criticality,
    ) -> Option<Self> {
        if nodes.is_empty() || edges.len() != nodes.len() - 1 {
            return None;
        }
        let max_dependency_type = edges
            .iter()
            .copied()
            .fold(DependencyType::Unknown, DependencyType::max);
        Some(Self::from_parts(
            nodes,
            edges,
            max_dependency_type,
            max_criticality,
        ))
    }

    /// Build a path from parts whose invariants the caller already upholds.
    pub(crate) fn from_parts(
        nodes: Vec<EntityRef>,
        edges: Vec<DependencyType>,
        max_dependency_type: DependencyType,
        max_criticality: Criticality,
    ) -> Self {
        debug_assert_eq!(edges.len() + 1, nodes.len());
        let path_id = nodes
            .iter()
            .map(EntityRef::stable_key)
            .collect::<Vec<_>>()
            .join(PATH_ID_SEPARATOR);
        Self {
            path_id,
            depth: edges.len(),
            nodes,
            edges,
            max_dependency_type,
            max_criticality,
            risk: None,
        }
    }

    /// Return this path annotated with a risk score and level.
    #[must_use]
    pub fn with_risk(mut self, score: u32, level: ImpactLevel) -> Self {
        self.risk = Some(PathRisk { score, level });
        self
    }

    /// Deterministic identifier: node keys joined with `->`.
    #[must_use]
    pub fn path_id(&self) -> &str {
        &self.path_id
    }

    /// Nodes from root to terminal.
    #[must_use]
    pub fn nodes(&self) -> &[EntityRef] {
        &self.nodes
    }

    /// Dependency types between consecutive nodes.
    #[must_use]
    pub fn edges(&self) -> &[DependencyType] {
        &self.edges
    }

    /// Number of edges in the path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Strongest dependency type along the path.
    #[must_use]
    pub fn max_dependency_type(&self) -> DependencyType {
        self.max_dependency_type
    }

    /// Highest criticality among the path's nodes, root included.
    #[must_use]
    pub fn max_criticality(&self) -> Criticality {
        self.max_criticality
    }

    /// First node of the path.
    #[must_use]
    pub fn root(&self) -> Option<&EntityRef> {
        self.nodes.first()
    }

    /// Last node of the path.
    #[must_use]
    pub fn terminal(&self) -> Option<&EntityRef> {
        self.nodes.last()
    }

    /// The entity this path is attributed to (its terminal node).
    #[must_use]
    pub fn dominant_entity(&self) -> Option<&EntityRef> {
        self.terminal()
    }

    /// Same as [`max_dependency_type`](Self::max_dependency_type).
    #[must_use]
    pub fn dominant_dependency_type(&self) -> DependencyType {
        self.max_dependency_type
    }

    /// Risk annotation, if the path has been scored.
    #[must_use]
    pub fn risk(&self) -> Option<PathRisk> {
        self.risk
    }

    /// Whether a risk evaluator has scored this path.
    #[must_use]
    pub fn is_scored(&self) -> bool {
        self.risk.is_some()
    }

    /// Risk score, `0` while unscored.
    #[must_use]
    pub fn risk_score(&self) -> u32 {
        self.risk.map_or(0, |r| r.score)
    }

    /// Impact level, `ImpactLevel::None` while unscored.
    #[must_use]
    pub fn impact_level(&self) -> ImpactLevel {
        self.risk.map_or(ImpactLevel::None, |r| r.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str) -> EntityRef {
        EntityRef::new("svc", id)
    }

    #[test]
    fn new_computes_identity_and_maxima() {
        let path = DependencyPath::new(
            vec![entity("a"), entity("b"), entity("c")],
            vec![DependencyType::Weak, DependencyType::Strong],
            Criticality::new(4).unwrap(),
        )
        .unwrap();

        assert_eq!(path.path_id(), "svc:a->svc:b->svc:c");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.max_dependency_type(), DependencyType::Strong);
        assert_eq!(path.dominant_dependency_type(), DependencyType::Strong);
        assert_eq!(path.max_criticality().level(), 4);
        assert_eq!(path.dominant_entity(), Some(&entity("c")));
        assert_eq!(path.root(), Some(&entity("a")));
    }

    #[test]
    fn new_rejects_misaligned_edges() {
        assert!(DependencyPath::new(vec![], vec![], Criticality::default()).is_none());
        assert!(DependencyPath::new(
            vec![entity("a"), entity("b")],
            vec![],
            Criticality::default()
        )
        .is_none());
    }

    #[test]
    fn unscored_path_reports_placeholders() {
        let path = DependencyPath::new(
            vec![entity("a"), entity("b")],
            vec![DependencyType::Normal],
            Criticality::default(),
        )
        .unwrap();

        assert!(!path.is_scored());
        assert_eq!(path.risk_score(), 0);
        assert_eq!(path.impact_level(), ImpactLevel::None);
    }

    #[test]
    fn with_risk_keeps_identity() {
        let path = DependencyPath::new(
            vec![entity("a"), entity("b")],
            vec![DependencyType::Normal],
            Criticality::default(),
        )
        .unwrap();
        let id = path.path_id().to_string();

        let scored = path.with_risk(12, ImpactLevel::Medium);

        assert_eq!(scored.path_id(), id);
        assert!(scored.is_scored());
        assert_eq!(scored.risk_score(), 12);
        assert_eq!(scored.impact_level(), ImpactLevel::Medium);
    }
}
