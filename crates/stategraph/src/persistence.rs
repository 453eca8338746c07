//! JSON snapshot export and import.
//!
//! A snapshot is a single JSON document:
//!
//! ```json
//! {
//!   "nodes": [{"id": "node-3k9x", "label": "cartStore", "kind": "store", "x": 600.0, "y": 50.0}],
//!   "edges": [{"id": "edge-0fa2", "source": "node-a1b2", "target": "node-3k9x", "weight": 1.0}]
//! }
//! ```
//!
//! Nodes and edges appear in insertion order. Import replaces the whole graph.
//!
//! # Error Handling
//!
//! - **Not JSON**: [`Error::Json`]; the graph is untouched
//! - **Top level not an object**: [`Error::InvalidShape`]; the graph is untouched
//! - **A node or edge record that does not parse**: [`Error::InvalidShape`]; the graph is untouched
//! - **`nodes` / `edges` missing**: treated as empty
//! - **`nodes` / `edges` not an array**: treated as empty, reported as a warning
//! - **Duplicate IDs, edges with missing endpoints**: the record is skipped and
//!   reported as a warning

use crate::config::EngineConfig;
use crate::domain::{Edge, EdgeId, Node, NodeId};
use crate::error::{Error, Result};
use crate::graph::{DependencyGraph, EdgeInsert};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Serializable form of a whole graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Every node, in insertion order
    pub nodes: Vec<Node>,

    /// Every edge, in insertion order
    pub edges: Vec<Edge>,
}

/// Non-fatal problems met while importing a snapshot.
///
/// The import still completes; the affected records are skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportWarning {
    /// `nodes` or `edges` was present but not an array
    ///
    /// **Effect**: the collection is treated as empty.
    NotAnArray {
        /// Which key ("nodes" or "edges")
        key: &'static str,
        /// JSON type that was found instead
        found: &'static str,
    },

    /// A second node with an already-imported ID
    ///
    /// **Effect**: the later record is skipped; the first one wins.
    DuplicateNode {
        /// The repeated ID
        id: NodeId,
    },

    /// A second edge with an already-imported ID
    ///
    /// **Effect**: the later record is skipped; the first one wins.
    DuplicateEdge {
        /// The repeated ID
        id: EdgeId,
    },

    /// An edge naming a node the snapshot does not contain
    ///
    /// **Effect**: the edge is skipped; both existing endpoints are still loaded.
    OrphanedEdge {
        /// The skipped edge
        id: EdgeId,
        /// Its source
        source: NodeId,
        /// Its target
        target: NodeId,
    },
}

impl DependencyGraph {
    /// Snapshot of every node and edge
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.all_nodes(),
            edges: self.all_edges(),
        }
    }

    /// Serialize the graph to compact JSON
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Serialize the graph to indented JSON
    pub fn export_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Replace the graph with the contents of a JSON snapshot
    ///
    /// Parsing completes before anything is removed, so on error the graph
    /// is left exactly as it was.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] for malformed JSON, [`Error::InvalidShape`] for a
    /// non-object top level or an unparseable node/edge record.
    pub fn import_json(&mut self, json: &str) -> Result<Vec<ImportWarning>> {
        let (snapshot, mut warnings) = parse_snapshot(json)?;

        self.clear();

        for node in snapshot.nodes {
            let id = node.id.clone();
            if !self.insert_node_record(node) {
                warn!(node_id = %id, "Skipping duplicate node in snapshot");
                warnings.push(ImportWarning::DuplicateNode { id });
            }
        }

        for edge in snapshot.edges {
            let (id, source, target) = (edge.id.clone(), edge.source.clone(), edge.target.clone());
            match self.insert_edge_record(edge) {
                EdgeInsert::Inserted => {}
                EdgeInsert::DuplicateId => {
                    warn!(edge_id = %id, "Skipping duplicate edge in snapshot");
                    warnings.push(ImportWarning::DuplicateEdge { id });
                }
                EdgeInsert::MissingEndpoint => {
                    warn!(edge_id = %id, %source, %target, "Skipping orphaned edge in snapshot");
                    warnings.push(ImportWarning::OrphanedEdge { id, source, target });
                }
            }
        }

        debug!(
            nodes = self.node_count(),
            edges = self.edge_count(),
            warnings = warnings.len(),
            "Imported snapshot"
        );

        Ok(warnings)
    }
}

fn parse_snapshot(json: &str) -> Result<(GraphSnapshot, Vec<ImportWarning>)> {
    let mut root = match serde_json::from_str::<Value>(json)? {
        Value::Object(root) => root,
        other => {
            return Err(Error::InvalidShape(format!(
                "expected an object with \"nodes\" and \"edges\", found {}",
                json_type(&other)
            )));
        }
    };

    let mut warnings = Vec::new();
    let nodes = parse_collection(root.remove("nodes"), "nodes", &mut warnings)?;
    let edges = parse_collection(root.remove("edges"), "edges", &mut warnings)?;

    Ok((GraphSnapshot { nodes, edges }, warnings))
}

fn parse_collection<T: DeserializeOwned>(
    value: Option<Value>,
    key: &'static str,
    warnings: &mut Vec<ImportWarning>,
) -> Result<Vec<T>> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item)
                    .map_err(|e| Error::InvalidShape(format!("{}[{}]: {}", key, index, e)))
            })
            .collect(),
        Some(other) => {
            let found = json_type(&other);
            warn!(key, found, "Snapshot collection is not an array; treating as empty");
            warnings.push(ImportWarning::NotAnArray { key, found });
            Ok(Vec::new())
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Save a graph snapshot to a file with atomic writes.
///
/// # Atomicity
///
/// The snapshot is written to a temporary sibling file first, then renamed
/// over `path`. If the process is interrupted, the original file remains
/// unchanged.
pub fn save_to_file(graph: &DependencyGraph, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &graph.snapshot())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    drop(writer);

    fs::rename(&temp_path, path)?;

    debug!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Saved snapshot"
    );
    Ok(())
}

/// Load a graph from a snapshot file.
///
/// The new graph allocates IDs with the prefixes from `config`; every ID in
/// the snapshot is reserved so it will not be reissued.
///
/// # Returns
///
/// The graph and all non-fatal warnings met while importing.
pub fn load_from_file(
    path: &Path,
    config: &EngineConfig,
) -> Result<(DependencyGraph, Vec<ImportWarning>)> {
    let content = fs::read_to_string(path)?;
    let mut graph = DependencyGraph::with_config(config);
    let warnings = graph.import_json(&content)?;
    Ok((graph, warnings))
}
