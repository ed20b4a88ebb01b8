//! Bounded breadth-first path enumeration.
//!
//! The enumerator walks *path states* rather than nodes: the same entity can
//! be reached along many distinct paths and each of them is a result. Every
//! extension of length ≥ 1 is emitted as soon as it is discovered, so shorter
//! paths always precede their extensions.
//!
//! # Algorithm
//!
//! 1. Fail with `RootNotFound` if the root is not a node of the graph
//! 2. Seed a FIFO queue with the root-only state
//! 3. For each dequeued state, follow its last node's outgoing edges in
//!    insertion order, skipping edges that would revisit a node already on
//!    this path (cycle), exceed the depth bound, or lead to a missing node
//! 4. Emit each extension, enqueue it while it is shorter than `max_depth`
//! 5. Stop everything once `max_paths` paths have been emitted
//!
//! The result is truncated when the path cap is reached, or when a path ends
//! at `max_depth` on a node that still has outgoing edges. The paths already
//! emitted remain valid.

use crate::domain::{Criticality, DependencyPath, DependencyType, EntityRef, GraphNode};
use crate::error::{Error, Result};
use crate::graph::ImpactGraph;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// Why an enumeration stopped before covering the whole reachable graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// A path at the depth bound could have been extended further.
    MaxDepth,

    /// The path-count bound was reached.
    MaxPaths,
}

impl TruncationReason {
    /// Machine-readable reason code
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaxDepth => "max_depth",
            Self::MaxPaths => "max_paths",
        }
    }
}

impl fmt::Display for TruncationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`PathEnumerator::enumerate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEnumerationResult {
    /// Paths in BFS discovery order
    pub paths: Vec<DependencyPath>,

    /// Whether a bound stopped the traversal early
    pub is_truncated: bool,

    /// Which bound did, if any. `MaxPaths` wins when both were hit.
    pub truncation_reason: Option<TruncationReason>,

    /// Greatest depth among emitted paths
    pub max_depth_reached: usize,
}

/// Partial path waiting in the BFS queue.
#[derive(Debug, Clone)]
struct PathState {
    nodes: Vec<EntityRef>,
    edges: Vec<DependencyType>,
    max_dependency_type: DependencyType,
    max_criticality: Criticality,
}

impl PathState {
    fn root(node: &GraphNode) -> Self {
        Self {
            nodes: vec![node.entity.clone()],
            edges: Vec::new(),
            max_dependency_type: DependencyType::Unknown,
            max_criticality: node.criticality,
        }
    }

    fn depth(&self) -> usize {
        self.edges.len()
    }

    fn current(&self) -> &EntityRef {
        // Invariant: a state always holds at least the root.
        &self.nodes[self.nodes.len() - 1]
    }

    /// Linear scan of this path only; other paths may share the node.
    fn visits(&self, entity: &EntityRef) -> bool {
        self.nodes.contains(entity)
    }

    fn extend(&self, target: &GraphNode, dependency_type: DependencyType) -> Self {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(target.entity.clone());

        let mut edges = Vec::with_capacity(self.edges.len() + 1);
        edges.extend_from_slice(&self.edges);
        edges.push(dependency_type);

        Self {
            nodes,
            edges,
            max_dependency_type: self.max_dependency_type.max(dependency_type),
            max_criticality: self.max_criticality.max(target.criticality),
        }
    }

    fn to_path(&self) -> DependencyPath {
        DependencyPath::from_parts(
            self.nodes.clone(),
            self.edges.clone(),
            self.max_dependency_type,
            self.max_criticality,
        )
    }
}

/// Breadth-first path enumerator with fixed safety bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathEnumerator {
    max_depth: usize,
    max_paths: usize,
}

impl PathEnumerator {
    /// Create an enumerator.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if either bound is zero.
    pub fn new(max_depth: usize, max_paths: usize) -> Result<Self> {
        if max_depth == 0 {
            return Err(Error::Config("max_depth must be positive".to_string()));
        }
        if max_paths == 0 {
            return Err(Error::Config("max_paths must be positive".to_string()));
        }
        Ok(Self {
            max_depth,
            max_paths,
        })
    }

    /// Enumerate every simple path from `root`, within bounds.
    ///
    /// The root alone is not a path; a root without outgoing edges yields an
    /// empty, non-truncated result.
    ///
    /// # Errors
    ///
    /// Returns `Error::RootNotFound` if `root` is not a node of `graph`.
    pub fn enumerate(
        &self,
        graph: &ImpactGraph,
        root: &EntityRef,
    ) -> Result<PathEnumerationResult> {
        let root_node = graph
            .node(root)
            .ok_or_else(|| Error::RootNotFound(root.clone()))?;

        debug!(
            root = %root,
            max_depth = self.max_depth,
            max_paths = self.max_paths,
            "Enumerating dependency paths"
        );

        let mut paths = Vec::new();
        let mut queue = VecDeque::from([PathState::root(root_node)]);
        let mut depth_limited = false;
        let mut path_limited = false;
        let mut max_depth_reached = 0;

        'states: while let Some(state) = queue.pop_front() {
            for edge in graph.outgoing(state.current()) {
                if state.visits(&edge.to) {
                    continue;
                }

                if state.depth() + 1 > self.max_depth {
                    depth_limited = true;
                    continue;
                }

                // Dangling edge: target outside the materialized graph.
                let Some(target) = graph.node(&edge.to) else {
                    continue;
                };

                let next = state.extend(target, edge.dependency_type);
                let depth = next.depth();
                paths.push(next.to_path());
                max_depth_reached = max_depth_reached.max(depth);

                if depth < self.max_depth {
                    queue.push_back(next);
                } else if graph.has_outgoing(&target.entity) {
                    depth_limited = true;
                }

                // The queue may still hold work; it is abandoned either way.
                if paths.len() >= self.max_paths {
                    path_limited = true;
                    break 'states;
                }
            }
        }

        let truncation_reason = if path_limited {
            Some(TruncationReason::MaxPaths)
        } else if depth_limited {
            Some(TruncationReason::MaxDepth)
        } else {
            None
        };

        debug!(
            root = %root,
            paths = paths.len(),
            max_depth_reached,
            truncated = ?truncation_reason,
            abandoned_states = queue.len(),
            "Path enumeration complete"
        );

        Ok(PathEnumerationResult {
            paths,
            is_truncated: truncation_reason.is_some(),
            truncation_reason,
            max_depth_reached,
        })
    }
}
