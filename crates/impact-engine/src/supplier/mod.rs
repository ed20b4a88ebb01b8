//! Graph suppliers.
//!
//! The analyzer does not build graphs itself; it asks a [`GraphSupplier`] for
//! the materialized graph of a project. Graph retrieval is the only
//! asynchronous step of an analysis.
//!
//! Implementations:
//!
//! - [`InMemoryGraphSupplier`]: graphs registered up front, for tests and
//!   embedding
//! - [`JsonlGraphSupplier`]: one JSONL file per project in a directory

mod jsonl;

pub use jsonl::{JsonlGraphSupplier, load_graph_jsonl, read_graph_jsonl};

use crate::error::{Error, Result};
use crate::graph::ImpactGraph;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Source of materialized impact graphs, keyed by project id.
///
/// Implementations must be `Send + Sync` so one supplier can serve
/// concurrent analyses. Returned graphs are immutable and may be shared.
#[async_trait]
pub trait GraphSupplier: Send + Sync {
    /// Load the graph for `project_id`.
    ///
    /// # Errors
    ///
    /// - `Error::GraphNotFound` if the project has no graph
    /// - any error raised while reading or parsing the graph
    async fn load_graph(&self, project_id: i64) -> Result<Arc<ImpactGraph>>;
}

/// Supplier backed by graphs registered in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphSupplier {
    graphs: HashMap<i64, Arc<ImpactGraph>>,
}

impl InMemoryGraphSupplier {
    /// Create an empty supplier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the graph for a project.
    pub fn insert(&mut self, project_id: i64, graph: ImpactGraph) {
        self.graphs.insert(project_id, Arc::new(graph));
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with_graph(mut self, project_id: i64, graph: ImpactGraph) -> Self {
        self.insert(project_id, graph);
        self
    }
}

#[async_trait]
impl GraphSupplier for InMemoryGraphSupplier {
    async fn load_graph(&self, project_id: i64) -> Result<Arc<ImpactGraph>> {
        self.graphs
            .get(&project_id)
            .cloned()
            .ok_or(Error::GraphNotFound(project_id))
    }
}
