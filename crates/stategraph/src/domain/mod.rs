//! Domain types for dependency graphs.
//!
//! This module contains the records the engine stores and hands back to
//! renderers: nodes for runtime entities, directed edges between them, and the
//! JSON-compatible metadata either may carry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create a new edge ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of runtime entity a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A state container
    Store,

    /// A UI component
    Component,

    /// A slice of a store
    Slice,

    /// A hook reading or writing state
    Hook,
}

impl NodeKind {
    /// Lowercase name, as it appears in JSON
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Component => "component",
            Self::Slice => "slice",
            Self::Hook => "hook",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON-compatible metadata value
///
/// Serialized untagged, so a metadata map reads and writes as a plain JSON
/// object. Numbers keep their JSON form: integers land in [`Self::Integer`]
/// (or [`Self::Unsigned`] above `i64::MAX`), everything else in
/// [`Self::Float`]. Variant order matters for untagged matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// JSON `null`
    Null,

    /// JSON boolean
    Bool(bool),

    /// JSON integer that fits an `i64`
    Integer(i64),

    /// JSON integer above `i64::MAX`
    Unsigned(u64),

    /// JSON number with a fraction or exponent
    Float(f64),

    /// JSON string
    String(String),

    /// JSON array
    List(Vec<MetadataValue>),

    /// JSON object
    Map(BTreeMap<String, MetadataValue>),
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for MetadataValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for MetadataValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(signed) => Self::Integer(signed),
            Err(_) => Self::Unsigned(value),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<MetadataValue>> From<Vec<T>> for MetadataValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Metadata attached to a node or edge
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A vertex: one store, component, slice or hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for the node
    pub id: NodeId,

    /// Display label
    pub label: String,

    /// Entity kind
    pub kind: NodeKind,

    /// Horizontal position, set by a layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    /// Vertical position, set by a layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Node {
    /// Position as a pair, if a layout has placed this node
    pub fn position(&self) -> Option<(f64, f64)> {
        self.x.zip(self.y)
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A directed relation from a node to a dependency it relies on
///
/// Edge direction: `source` depends on `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for the edge
    pub id: EdgeId,

    /// The dependent node
    pub source: NodeId,

    /// The dependency
    pub target: NodeId,

    /// Optional display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Multiplicity or strength of the relation
    #[serde(default = "default_weight")]
    pub weight: f64,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Optional attributes for creating a new edge
#[derive(Debug, Clone, PartialEq)]
pub struct NewEdge {
    /// Display label
    pub label: Option<String>,

    /// Weight (defaults to 1.0)
    pub weight: f64,

    /// Metadata
    pub metadata: Option<Metadata>,
}

impl Default for NewEdge {
    fn default() -> Self {
        Self {
            label: None,
            weight: default_weight(),
            metadata: None,
        }
    }
}
