//! # Impact Engine: Dependency-Path Risk Analysis
//!
//! Given a dependency graph of a project and a proposed change to one
//! entity, the engine enumerates every dependency path reachable from that
//! entity (bounded by depth and path count), scores each path, folds the
//! scores into worst-case per-entity impact, and decides whether the change
//! needs human approval.
//!
//! ## Design
//!
//! - **Paths, not nodes** - every distinct route is reported; a node reached
//!   twice yields two paths
//! - **Worst case dominates** - an entity is as impacted as its riskiest path
//! - **Versioned policy** - scoring and approval are swappable, versioned
//!   strategies recorded in every result
//! - **Bounded** - traversal stops at `max_depth` / `max_paths` and says so
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use impact_engine::analyzer::ImpactAnalyzer;
//! use impact_engine::cancel::CancellationToken;
//! use impact_engine::config::EngineConfig;
//! use impact_engine::domain::{ChangeType, Criticality, DependencyType, EntityRef};
//! use impact_engine::graph::ImpactGraph;
//! use impact_engine::supplier::InMemoryGraphSupplier;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> impact_engine::Result<()> {
//! let api = EntityRef::new("service", "api");
//! let db = EntityRef::new("table", "orders");
//! let graph = ImpactGraph::builder()
//!     .node(api.clone(), Criticality::default())
//!     .node(db.clone(), Criticality::new(5)?)
//!     .edge(api.clone(), db.clone(), DependencyType::Strong)
//!     .build();
//!
//! let supplier = Arc::new(InMemoryGraphSupplier::new().with_graph(1, graph));
//! let analyzer = ImpactAnalyzer::from_config(supplier, &EngineConfig::default())?;
//!
//! let result = analyzer
//!     .analyze(1, &api, ChangeType::Breaking, &CancellationToken::new())
//!     .await?;
//! println!(
//!     "{} paths, approval required: {}",
//!     result.total_paths, result.overall_impact.requires_approval
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod aggregator;
pub mod analyzer;
pub mod approval;
pub mod cancel;
pub mod config;
pub mod domain;
pub mod enumerator;
pub mod error;
pub mod graph;
pub mod scoring;
pub mod supplier;

pub use error::{Error, Result};
