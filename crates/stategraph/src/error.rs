//! Error types for stategraph operations.
//!
//! Referential failures during graph editing (an edge naming a missing node)
//! are not errors: they surface as `None` from the store. The variants here
//! cover failures that halt an operation outright.

use crate::domain::NodeId;
use std::io;
use thiserror::Error;

/// The error type for stategraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing a snapshot or config file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input was not valid JSON, or a graph could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input was valid JSON but not shaped like a graph snapshot.
    #[error("Invalid graph shape: {0}")]
    InvalidShape(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Layout options that cannot describe a canvas.
    #[error("Invalid layout options: {0}")]
    InvalidLayoutOptions(String),

    /// Hierarchical layout was asked to place a graph containing a cycle.
    #[error("Hierarchical layout requires an acyclic graph; cycle through {}", format_path(.path))]
    CyclicGraph {
        /// Ids along one offending cycle, closing back on its first id.
        path: Vec<NodeId>,
    },

    /// Node not found.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
}

fn format_path(path: &[NodeId]) -> String {
    path.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A specialized Result type for stategraph operations.
pub type Result<T> = std::result::Result<T, Error>;
