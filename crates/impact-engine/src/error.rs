//! Error types for impact analysis.
//!
//! Errors fall into three groups:
//!
//! - **Configuration**: invalid bounds or unknown policy versions. These are
//!   detected when the engine is constructed and never at analysis time.
//! - **Input**: the caller asked about something that does not exist
//!   (`RootNotFound`, `GraphNotFound`) or supplied malformed data.
//! - **Integrity**: a collaborator broke its contract (`UnscoredPath`,
//!   `EvaluatorContract`). These indicate a bug, not bad input.
//!
//! Dangling edges and exhausted traversal bounds are *not* errors; they are
//! reported on the enumeration result instead.

use crate::domain::EntityRef;
use std::io;
use thiserror::Error;

/// The error type for impact analysis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (bounds, policy versions, config file contents).
    #[error("configuration error: {0}")]
    Config(String),

    /// The root entity is not a node of the supplied graph.
    #[error("root entity not found in graph: {0}")]
    RootNotFound(EntityRef),

    /// The supplier has no graph for the requested project.
    #[error("no graph available for project {0}")]
    GraphNotFound(i64),

    /// A graph file record could not be parsed.
    #[error("malformed graph record at line {line}: {message}")]
    GraphFormat {
        /// 1-based line number of the offending record.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// Entity reference text was not of the form `type:id`.
    #[error("invalid entity reference '{0}': expected 'type:id'")]
    InvalidEntityRef(String),

    /// Criticality outside the 1-5 range.
    #[error("invalid criticality {0}: must be between 1 and 5")]
    InvalidCriticality(u8),

    /// A path reached aggregation without having been scored.
    #[error("path '{0}' reached aggregation without a risk score")]
    UnscoredPath(String),

    /// A risk evaluator returned a path that violates its contract.
    #[error("risk evaluator contract violated: {0}")]
    EvaluatorContract(String),

    /// The analysis was cancelled by the caller.
    #[error("analysis cancelled")]
    Cancelled,

    /// IO error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the error was caused by caller input rather than
    /// by the engine or its collaborators.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::RootNotFound(_)
                | Self::GraphNotFound(_)
                | Self::InvalidEntityRef(_)
                | Self::InvalidCriticality(_)
                | Self::GraphFormat { .. }
        )
    }
}

/// A specialized Result type for impact analysis operations.
pub type Result<T> = std::result::Result<T, Error>;
