//! Immutable impact graph.
//!
//! An [`ImpactGraph`] is frozen on construction: nodes and edges are moved in
//! once and only read views are exposed afterwards, so a graph can be shared
//! across concurrent analyses behind an `Arc` without locking.
//!
//! Outgoing edges keep their insertion order. Traversal relies on this for
//! deterministic path ordering, so callers control edge order by the order in
//! which they add edges.
//!
//! # Edge Direction
//!
//! Edges point from the changed entity to the affected entity: `from -> to`
//! means "a change to `from` may impact `to`". The target of an edge does not
//! have to be a node of the graph; such dangling edges are kept and skipped by
//! traversal.

use crate::domain::{Criticality, DependencyType, EntityRef, GraphEdge, GraphNode};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Index;

/// Immutable directed dependency graph.
#[derive(Debug, Clone, Default)]
pub struct ImpactGraph {
    /// Nodes in insertion order
    nodes: Vec<GraphNode>,
    /// Entity -> position in `nodes`
    index: HashMap<EntityRef, usize>,
    /// Entity -> outgoing edges in insertion order
    adjacency: HashMap<EntityRef, Vec<GraphEdge>>,
    edge_count: usize,
}

impl ImpactGraph {
    /// Build a graph from nodes and edges.
    ///
    /// A node listed twice keeps its first position and takes the later
    /// criticality. Edges are grouped under their `from` entity in the order
    /// given.
    pub fn new(
        nodes: impl IntoIterator<Item = GraphNode>,
        edges: impl IntoIterator<Item = GraphEdge>,
    ) -> Self {
        let mut graph = Self::default();

        for node in nodes {
            if let Some(&position) = graph.index.get(&node.entity) {
                graph.nodes[position] = node;
            } else {
                graph.index.insert(node.entity.clone(), graph.nodes.len());
                graph.nodes.push(node);
            }
        }

        for edge in edges {
            graph
                .adjacency
                .entry(edge.from.clone())
                .or_default()
                .push(edge);
            graph.edge_count += 1;
        }

        graph
    }

    /// Start building a graph incrementally.
    #[must_use]
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Look up a node without failing.
    #[must_use]
    pub fn node(&self, entity: &EntityRef) -> Option<&GraphNode> {
        self.index.get(entity).map(|&i| &self.nodes[i])
    }

    /// Whether the entity is a node of this graph.
    #[must_use]
    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.index.contains_key(entity)
    }

    /// All nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Outgoing edges of `entity` in insertion order (empty if none).
    #[must_use]
    pub fn outgoing(&self, entity: &EntityRef) -> &[GraphEdge] {
        self.adjacency
            .get(entity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether `entity` has at least one outgoing edge.
    #[must_use]
    pub fn has_outgoing(&self, entity: &EntityRef) -> bool {
        !self.outgoing(entity).is_empty()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, dangling ones included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Iterate over every edge, grouped by source node in node order.
    ///
    /// Edges whose source is not a node come last.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        let orphan_sources = self
            .adjacency
            .iter()
            .filter(|(from, _)| !self.contains(from))
            .flat_map(|(_, edges)| edges);
        self.nodes
            .iter()
            .flat_map(|node| self.outgoing(&node.entity))
            .chain(orphan_sources)
    }

    /// Edges whose target is not a node of the graph.
    #[must_use]
    pub fn dangling_edges(&self) -> Vec<&GraphEdge> {
        self.edges().filter(|e| !self.contains(&e.to)).collect()
    }

    /// Find dependency cycles.
    ///
    /// Uses petgraph's Tarjan SCC to locate cyclic components, then reports
    /// one concrete cycle per component: the shortest walk back to the
    /// component's earliest-inserted member, following edges in insertion
    /// order. Consecutive entries (and last to first) are always real edges.
    /// A self-loop yields a one-entry cycle.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<EntityRef>> {
        let graph = self.to_petgraph();

        algo::tarjan_scc(&graph)
            .into_iter()
            .filter_map(|component| {
                let members: HashSet<&EntityRef> =
                    component.iter().map(|&n| &graph[n]).collect();
                let start = self
                    .nodes
                    .iter()
                    .map(|node| &node.entity)
                    .find(|entity| members.contains(entity))?;
                self.cycle_through(start, &members)
            })
            .collect()
    }

    /// Shortest cycle through `start` using only edges between `members`.
    fn cycle_through<'a>(
        &'a self,
        start: &'a EntityRef,
        members: &HashSet<&EntityRef>,
    ) -> Option<Vec<EntityRef>> {
        let mut parent: HashMap<&'a EntityRef, &'a EntityRef> = HashMap::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for edge in self.outgoing(current) {
                if !members.contains(&edge.to) {
                    continue;
                }
                if edge.to == *start {
                    let mut cycle = vec![current.clone()];
                    let mut node = current;
                    while let Some(&previous) = parent.get(node) {
                        cycle.push(previous.clone());
                        node = previous;
                    }
                    cycle.reverse();
                    return Some(cycle);
                }
                if !parent.contains_key(&edge.to) {
                    parent.insert(&edge.to, current);
                    queue.push_back(&edge.to);
                }
            }
        }

        None
    }

    /// Summarize the graph's shape for diagnostics.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            dangling_edge_count: self.dangling_edges().len(),
            cycles: self
                .cycles()
                .into_iter()
                .map(|cycle| cycle.iter().map(EntityRef::stable_key).collect())
                .collect(),
        }
    }

    /// Project onto a petgraph graph, dropping dangling edges.
    fn to_petgraph(&self) -> DiGraph<EntityRef, DependencyType> {
        let mut graph = DiGraph::with_capacity(self.node_count(), self.edge_count());
        let mut node_map: HashMap<&EntityRef, NodeIndex> =
            HashMap::with_capacity(self.node_count());

        for node in &self.nodes {
            let idx = graph.add_node(node.entity.clone());
            node_map.insert(&node.entity, idx);
        }

        for edge in self.edges() {
            if let (Some(&from), Some(&to)) = (node_map.get(&edge.from), node_map.get(&edge.to)) {
                graph.add_edge(from, to, edge.dependency_type);
            }
        }

        graph
    }
}

/// Indexed lookup of a node that must exist.
///
/// # Panics
///
/// Panics if `entity` is not a node of the graph. Use
/// [`ImpactGraph::node`] when the entity may be absent.
impl Index<&EntityRef> for ImpactGraph {
    type Output = GraphNode;

    fn index(&self, entity: &EntityRef) -> &GraphNode {
        self.node(entity)
            .unwrap_or_else(|| panic!("entity {entity} is not a node of the impact graph"))
    }
}

/// Incremental builder for [`ImpactGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl GraphBuilder {
    /// Add a node.
    pub fn node(&mut self, entity: EntityRef, criticality: Criticality) -> &mut Self {
        self.nodes.push(GraphNode::new(entity, criticality));
        self
    }

    /// Add an edge. Edge order per source node is preserved.
    pub fn edge(
        &mut self,
        from: EntityRef,
        to: EntityRef,
        dependency_type: DependencyType,
    ) -> &mut Self {
        self.edges.push(GraphEdge::new(from, to, dependency_type));
        self
    }

    /// Freeze into an immutable graph.
    #[must_use]
    pub fn build(&mut self) -> ImpactGraph {
        ImpactGraph::new(
            std::mem::take(&mut self.nodes),
            std::mem::take(&mut self.edges),
        )
    }
}

/// Shape of a graph, as reported by `impact inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    /// Number of nodes
    pub node_count: usize,
    /// Number of edges
    pub edge_count: usize,
    /// Edges whose target is not a node
    pub dangling_edge_count: usize,
    /// Cycles, each as a list of stable keys
    pub cycles: Vec<Vec<String>>,
}
