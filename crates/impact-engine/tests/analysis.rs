//! End-to-end tests for impact analysis.
//!
//! Covers the full pipeline through the public API:
//! - Worked triangle scenario (paths, scores, aggregation, approval)
//! - Truncation by depth and by path count
//! - Graphs loaded from JSONL files
//! - Error paths: unknown root, unknown project, cancellation
//! - Concurrent analyses sharing one analyzer

use std::sync::Arc;

use async_trait::async_trait;
use impact_engine::analyzer::{ImpactAnalyzer, ImpactResult};
use impact_engine::cancel::CancellationToken;
use impact_engine::config::EngineConfig;
use impact_engine::domain::{ChangeType, Criticality, DependencyType, EntityRef, ImpactLevel};
use impact_engine::enumerator::TruncationReason;
use impact_engine::graph::ImpactGraph;
use impact_engine::supplier::{GraphSupplier, InMemoryGraphSupplier, JsonlGraphSupplier};
use impact_engine::Error;

const PROJECT: i64 = 1;

fn n(id: &str) -> EntityRef {
    EntityRef::new("n", id)
}

fn crit(level: u8) -> Criticality {
    Criticality::new(level).expect("valid criticality")
}

/// A -> B (Normal), B -> C (Strong), A -> C (Weak); C is the critical store.
fn triangle() -> ImpactGraph {
    ImpactGraph::builder()
        .node(n("A"), crit(3))
        .node(n("B"), crit(3))
        .node(n("C"), crit(5))
        .edge(n("A"), n("B"), DependencyType::Normal)
        .edge(n("B"), n("C"), DependencyType::Strong)
        .edge(n("A"), n("C"), DependencyType::Weak)
        .build()
}

fn analyzer_for(graph: ImpactGraph, config: &EngineConfig) -> ImpactAnalyzer {
    let supplier = Arc::new(InMemoryGraphSupplier::new().with_graph(PROJECT, graph));
    ImpactAnalyzer::from_config(supplier, config).expect("config should be valid")
}

async fn analyze(analyzer: &ImpactAnalyzer, root: &EntityRef, change: ChangeType) -> ImpactResult {
    analyzer
        .analyze(PROJECT, root, change, &CancellationToken::new())
        .await
        .expect("analysis should succeed")
}

// === Worked scenario ===

#[tokio::test]
async fn triangle_modification_requires_approval() {
    let analyzer = analyzer_for(triangle(), &EngineConfig::default());

    let result = analyze(&analyzer, &n("A"), ChangeType::Modification).await;

    let ids: Vec<_> = result.paths.iter().map(|p| p.path_id()).collect();
    assert_eq!(ids, vec!["n:A->n:B", "n:A->n:C", "n:A->n:B->n:C"]);

    let scores: Vec<_> = result.paths.iter().map(|p| p.risk_score()).collect();
    assert_eq!(scores, vec![12, 10, 24]);

    assert_eq!(result.total_paths, 3);
    assert_eq!(result.total_entities, 2);
    assert_eq!(result.max_depth_reached, 2);
    assert!(!result.is_truncated);
    assert_eq!(result.truncation_reason, None);

    let c = result
        .entity_impacts
        .iter()
        .find(|e| e.entity == n("C"))
        .expect("C should be impacted");
    assert_eq!(c.worst_case_impact_level, ImpactLevel::High);
    assert_eq!(c.worst_case_risk_score, 24);
    assert_eq!(c.cumulative_risk_score, 34);
    assert_eq!(c.dominant_path_id, "n:A->n:B->n:C");
    assert_eq!(c.paths.len(), 2);

    let overall = &result.overall_impact;
    assert_eq!(overall.worst_impact_level, ImpactLevel::High);
    assert_eq!(overall.worst_risk_score, 24);
    assert_eq!(overall.triggering_entity, Some(n("C")));
    assert_eq!(overall.triggering_path_id, "n:A->n:B->n:C");
    assert!(overall.requires_approval);

    assert_eq!(result.scoring_version, "weighted-v1");
    assert_eq!(result.approval_policy_version, "threshold-v1");
}

#[tokio::test]
async fn additive_change_stays_below_threshold() {
    let analyzer = analyzer_for(triangle(), &EngineConfig::default());

    let result = analyze(&analyzer, &n("A"), ChangeType::Additive).await;

    assert_eq!(result.overall_impact.worst_impact_level, ImpactLevel::Medium);
    assert!(!result.overall_impact.requires_approval);
}

#[tokio::test]
async fn leaf_root_has_no_impact() {
    let analyzer = analyzer_for(triangle(), &EngineConfig::default());

    let result = analyze(&analyzer, &n("C"), ChangeType::Removal).await;

    assert!(result.paths.is_empty());
    assert!(result.entity_impacts.is_empty());
    assert_eq!(result.overall_impact.worst_impact_level, ImpactLevel::None);
    assert_eq!(result.overall_impact.triggering_entity, None);
    assert!(!result.overall_impact.requires_approval);
    assert!(!result.is_truncated);
}

#[tokio::test]
async fn repeated_analysis_is_identical() {
    let analyzer = analyzer_for(triangle(), &EngineConfig::default());

    let first = analyze(&analyzer, &n("A"), ChangeType::Breaking).await;
    let second = analyze(&analyzer, &n("A"), ChangeType::Breaking).await;

    assert_eq!(first, second);
}

// === Truncation ===

#[tokio::test]
async fn depth_bound_truncates() {
    let config = EngineConfig {
        max_depth: 1,
        ..EngineConfig::default()
    };
    let analyzer = analyzer_for(triangle(), &config);

    let result = analyze(&analyzer, &n("A"), ChangeType::Modification).await;

    assert_eq!(result.total_paths, 2);
    assert!(result.is_truncated);
    assert_eq!(result.truncation_reason, Some(TruncationReason::MaxDepth));
    assert!(result.paths.iter().all(|p| p.depth() <= 1));
}

#[tokio::test]
async fn path_bound_truncates_and_wins_over_depth() {
    let config = EngineConfig {
        max_depth: 1,
        max_paths: 1,
        ..EngineConfig::default()
    };
    let analyzer = analyzer_for(triangle(), &config);

    let result = analyze(&analyzer, &n("A"), ChangeType::Modification).await;

    assert_eq!(result.total_paths, 1);
    assert_eq!(result.truncation_reason, Some(TruncationReason::MaxPaths));
}

#[tokio::test]
async fn truncated_result_serializes_reason() {
    let config = EngineConfig {
        max_paths: 2,
        ..EngineConfig::default()
    };
    let analyzer = analyzer_for(triangle(), &config);

    let result = analyze(&analyzer, &n("A"), ChangeType::Modification).await;
    let json = serde_json::to_value(&result).expect("result should serialize");

    assert_eq!(json["truncation_reason"], "max_paths");
    assert_eq!(json["is_truncated"], true);
    assert_eq!(json["total_paths"], 2);
}

// === Cyclic graphs ===

#[tokio::test]
async fn cycles_do_not_loop() {
    let graph = ImpactGraph::builder()
        .node(n("A"), crit(3))
        .node(n("B"), crit(3))
        .edge(n("A"), n("B"), DependencyType::Normal)
        .edge(n("B"), n("A"), DependencyType::Normal)
        .edge(n("B"), n("B"), DependencyType::Weak)
        .build();
    let analyzer = analyzer_for(graph, &EngineConfig::default());

    let result = analyze(&analyzer, &n("A"), ChangeType::Breaking).await;

    let ids: Vec<_> = result.paths.iter().map(|p| p.path_id()).collect();
    assert_eq!(ids, vec!["n:A->n:B"]);
    assert!(!result.is_truncated);
}

// === JSONL graphs ===

#[tokio::test]
async fn analyzes_graph_from_jsonl_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let graph = r#"{"record":"node","entity":"n:A"}
{"record":"node","entity":"n:B"}
{"record":"node","entity":"n:C","criticality":5}
{"record":"edge","from":"n:A","to":"n:B","dependency_type":"normal"}
{"record":"edge","from":"n:B","to":"n:C","dependency_type":"strong"}
{"record":"edge","from":"n:A","to":"n:C","dependency_type":"weak"}
"#;
    tokio::fs::write(dir.path().join("1.jsonl"), graph)
        .await
        .expect("should write graph file");

    let supplier = Arc::new(JsonlGraphSupplier::new(dir.path()));
    let analyzer =
        ImpactAnalyzer::from_config(supplier, &EngineConfig::default()).expect("valid config");
    let from_file = analyze(&analyzer, &n("A"), ChangeType::Modification).await;

    let in_memory = analyze(
        &analyzer_for(triangle(), &EngineConfig::default()),
        &n("A"),
        ChangeType::Modification,
    )
    .await;

    assert_eq!(from_file, in_memory);
}

#[tokio::test]
async fn malformed_jsonl_fails_analysis() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    tokio::fs::write(
        dir.path().join("1.jsonl"),
        "{\"record\":\"node\",\"entity\":\"n:A\"}\n{\"record\":\"edge\"}\n",
    )
    .await
    .expect("should write graph file");

    let supplier = Arc::new(JsonlGraphSupplier::new(dir.path()));
    let analyzer =
        ImpactAnalyzer::from_config(supplier, &EngineConfig::default()).expect("valid config");

    let err = analyzer
        .analyze(PROJECT, &n("A"), ChangeType::Breaking, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GraphFormat { line: 2, .. }), "got {err}");
    assert!(err.is_input_error());
}

// === Error paths ===

#[tokio::test]
async fn unknown_root_is_rejected() {
    let analyzer = analyzer_for(triangle(), &EngineConfig::default());

    let err = analyzer
        .analyze(PROJECT, &n("Z"), ChangeType::Breaking, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RootNotFound(ref e) if *e == n("Z")));
}

#[tokio::test]
async fn unknown_project_is_rejected() {
    let analyzer = analyzer_for(triangle(), &EngineConfig::default());

    let err = analyzer
        .analyze(99, &n("A"), ChangeType::Breaking, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GraphNotFound(99)));
}

#[tokio::test]
async fn cancelled_token_aborts_before_work() {
    let analyzer = analyzer_for(triangle(), &EngineConfig::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    // Cancellation wins even over an unknown project.
    let err = analyzer
        .analyze(99, &n("A"), ChangeType::Breaking, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
}

/// Serves a graph but cancels the caller's token while doing so.
struct CancelDuringLoad {
    inner: InMemoryGraphSupplier,
    cancel: CancellationToken,
}

#[async_trait]
impl GraphSupplier for CancelDuringLoad {
    async fn load_graph(&self, project_id: i64) -> impact_engine::Result<Arc<ImpactGraph>> {
        self.cancel.cancel();
        self.inner.load_graph(project_id).await
    }
}

#[tokio::test]
async fn cancellation_during_load_stops_before_enumeration() {
    let cancel = CancellationToken::new();
    let supplier = Arc::new(CancelDuringLoad {
        inner: InMemoryGraphSupplier::new().with_graph(PROJECT, triangle()),
        cancel: cancel.clone(),
    });
    let analyzer =
        ImpactAnalyzer::from_config(supplier, &EngineConfig::default()).expect("valid config");

    // An unknown root would fail enumeration; cancellation must be seen first.
    let err = analyzer
        .analyze(PROJECT, &n("Z"), ChangeType::Breaking, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled), "got {err}");
}

// === Concurrency ===

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_analyses_share_one_graph() {
    let analyzer = Arc::new(analyzer_for(triangle(), &EngineConfig::default()));
    let expected = analyze(&analyzer, &n("A"), ChangeType::Modification).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            tokio::spawn(async move {
                analyzer
                    .analyze(
                        PROJECT,
                        &n("A"),
                        ChangeType::Modification,
                        &CancellationToken::new(),
                    )
                    .await
            })
        })
        .collect();

    for handle in handles {
        let result = handle
            .await
            .expect("task should not panic")
            .expect("analysis should succeed");
        assert_eq!(result, expected);
    }
}
