//! JSONL graph files.
//!
//! One record per line; blank lines are ignored:
//!
//! ```text
//! {"record":"node","entity":"service:billing","name":"Billing","criticality":5}
//! {"record":"edge","from":"service:billing","to":"table:invoices","dependency_type":"strong"}
//! ```
//!
//! `name` and `criticality` (default 3) are optional on nodes;
//! `dependency_type` (default `unknown`) is optional on edges. Edge order in
//! the file becomes outgoing-edge order in the graph.
//!
//! Loading is strict: the first malformed line fails the whole load with its
//! line number.

use super::GraphSupplier;
use crate::domain::{Criticality, DependencyType, EntityRef, GraphEdge, GraphNode};
use crate::error::{Error, Result};
use crate::graph::ImpactGraph;
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

/// File extension of graph files
pub const GRAPH_FILE_EXTENSION: &str = "jsonl";

#[derive(Debug, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum GraphRecord {
    Node {
        entity: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        criticality: Option<u8>,
    },
    Edge {
        from: String,
        to: String,
        #[serde(default)]
        dependency_type: DependencyType,
    },
}

fn parse_entity(text: &str, line: usize) -> Result<EntityRef> {
    text.parse().map_err(|e: Error| Error::GraphFormat {
        line,
        message: e.to_string(),
    })
}

/// Read a graph from any async JSONL source.
///
/// # Errors
///
/// Returns `Error::GraphFormat` for the first malformed line and `Error::Io`
/// if reading fails.
pub async fn read_graph_jsonl<R: AsyncRead + Unpin>(reader: R) -> Result<ImpactGraph> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_number += 1;

        let line = std::str::from_utf8(&buf).map_err(|e| Error::GraphFormat {
            line: line_number,
            message: format!("invalid UTF-8: {e}"),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: GraphRecord =
            serde_json::from_str(trimmed).map_err(|e| Error::GraphFormat {
                line: line_number,
                message: e.to_string(),
            })?;

        match record {
            GraphRecord::Node {
                entity,
                name,
                criticality,
            } => {
                let mut entity = parse_entity(&entity, line_number)?;
                entity.name = name;
                let criticality = match criticality {
                    Some(level) => Criticality::new(level).map_err(|e| Error::GraphFormat {
                        line: line_number,
                        message: e.to_string(),
                    })?,
                    None => Criticality::default(),
                };
                nodes.push(GraphNode::new(entity, criticality));
            }
            GraphRecord::Edge {
                from,
                to,
                dependency_type,
            } => {
                edges.push(GraphEdge::new(
                    parse_entity(&from, line_number)?,
                    parse_entity(&to, line_number)?,
                    dependency_type,
                ));
            }
        }
    }

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        lines = line_number,
        "Read graph from JSONL"
    );

    Ok(ImpactGraph::new(nodes, edges))
}

/// Load a graph from a JSONL file.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read, and
/// `Error::GraphFormat` for malformed content.
pub async fn load_graph_jsonl(path: &Path) -> Result<ImpactGraph> {
    let file = File::open(path).await?;
    read_graph_jsonl(file).await
}

/// Supplier reading `{dir}/{project_id}.jsonl`.
///
/// Every call reads the file afresh; caching is left to callers.
#[derive(Debug, Clone)]
pub struct JsonlGraphSupplier {
    dir: PathBuf,
}

impl JsonlGraphSupplier {
    /// Create a supplier over a directory of graph files.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the graph file for a project.
    #[must_use]
    pub fn graph_path(&self, project_id: i64) -> PathBuf {
        self.dir
            .join(format!("{project_id}.{GRAPH_FILE_EXTENSION}"))
    }
}

#[async_trait]
impl GraphSupplier for JsonlGraphSupplier {
    async fn load_graph(&self, project_id: i64) -> Result<Arc<ImpactGraph>> {
        let path = self.graph_path(project_id);
        debug!(project_id, path = %path.display(), "Loading graph file");

        match load_graph_jsonl(&path).await {
            Ok(graph) => Ok(Arc::new(graph)),
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(Error::GraphNotFound(project_id))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_nodes_and_edges_in_order() {
        let data = r#"{"record":"node","entity":"svc:a","name":"A","criticality":5}
{"record":"node","entity":"svc:b"}

{"record":"edge","from":"svc:a","to":"svc:b","dependency_type":"strong"}
{"record":"edge","from":"svc:a","to":"svc:gone"}
"#;

        let graph = read_graph_jsonl(Cursor::new(data)).await.unwrap();

        let a = EntityRef::new("svc", "a");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph[&a].criticality.level(), 5);
        assert_eq!(graph[&a].entity.name.as_deref(), Some("A"));
        assert_eq!(
            graph[&EntityRef::new("svc", "b")].criticality,
            Criticality::default()
        );

        let out = graph.outgoing(&a);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].dependency_type, DependencyType::Strong);
        assert_eq!(out[1].dependency_type, DependencyType::Unknown);
        assert_eq!(graph.dangling_edges().len(), 1);
    }

    #[rstest]
    #[case::not_json(b"{not json", 1)]
    #[case::unknown_record(br#"{"record":"vertex","entity":"svc:a"}"#, 1)]
    #[case::bad_entity(br#"{"record":"node","entity":"nocolon"}"#, 1)]
    #[case::bad_criticality(br#"{"record":"node","entity":"svc:a","criticality":9}"#, 1)]
    #[case::invalid_utf8(
        b"{\"record\":\"node\",\"entity\":\"svc:a\"}\n\
          {\"record\":\"node\",\"entity\":\"svc:\xFF\"}",
        2
    )]
    #[case::bad_dependency(
        b"{\"record\":\"node\",\"entity\":\"svc:a\"}\n\
          {\"record\":\"edge\",\"from\":\"svc:a\",\"to\":\"svc:b\",\"dependency_type\":\"huge\"}",
        2
    )]
    #[tokio::test]
    async fn malformed_lines_report_line_number(
        #[case] data: &[u8],
        #[case] expected_line: usize,
    ) {
        let err = read_graph_jsonl(Cursor::new(data.to_vec()))
            .await
            .unwrap_err();

        assert!(err.is_input_error());
        assert!(
            matches!(err, Error::GraphFormat { line, .. } if line == expected_line),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn supplier_reads_project_file() {
        let dir = tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("42.jsonl"),
            "{\"record\":\"node\",\"entity\":\"svc:a\"}\n",
        )
        .await
        .unwrap();

        let supplier = JsonlGraphSupplier::new(dir.path());
        let graph = supplier.load_graph(42).await.unwrap();

        assert_eq!(graph.node_count(), 1);
    }

    #[tokio::test]
    async fn supplier_missing_file_is_graph_not_found() {
        let dir = tempdir().unwrap();
        let supplier = JsonlGraphSupplier::new(dir.path());

        assert!(matches!(
            supplier.load_graph(3).await,
            Err(Error::GraphNotFound(3))
        ));
    }
}
