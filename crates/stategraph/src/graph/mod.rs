//! In-memory dependency graph store.
//!
//! [`DependencyGraph`] owns every node and edge and is the only way to create,
//! mutate or destroy them. Renderers and live topology sources drive it through
//! the add/remove API, run a layout, then read the annotated records back.
//!
//! # Architecture
//!
//! The implementation uses:
//! - `HashMap<NodeId, Node>` and `HashMap<EdgeId, Edge>` for O(1) record lookups,
//!   each entry tagged with its insertion sequence
//! - `petgraph::StableDiGraph` for adjacency, so edge and node removal never
//!   invalidates the indices of surviving entries
//! - `HashMap<NodeId, NodeIndex>` / `HashMap<EdgeId, EdgeIndex>` mapping records
//!   to graph indices
//! - Hash-based ID generation that never reissues an ID
//!
//! ## Edge Direction Convention
//!
//! Edges point from **dependent -> dependency**:
//!
//! - **Edge source**: the entity that relies on something (e.g. a component)
//! - **Edge target**: the entity it relies on (e.g. the store it reads)
//!
//! Parallel edges between the same pair are kept; they encode multiplicity.
//!
//! # Ownership
//!
//! There is no process-wide default graph. Each session owns its own
//! `DependencyGraph`; every mutation takes `&mut self`, so a graph cannot be
//! mutated from two places at once.
//!
//! # Performance Characteristics
//!
//! - Add node / edge: O(1) amortized
//! - Remove edge: O(1)
//! - Remove node: O(d) where d is the number of incident edges
//! - Label and kind lookups: O(n) linear scan
//! - Snapshots: O(n log n) (ordered by insertion)

mod cycles;
mod ordering;
mod query;

pub use cycles::Cycle;
pub use query::GraphMetrics;

use crate::config::EngineConfig;
use crate::domain::{Edge, EdgeId, Metadata, NewEdge, Node, NodeId, NodeKind};
use crate::id_generation::IdGenerator;
use ordering::{Sequenced, in_insertion_order};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::debug;

/// Outcome of inserting a pre-built edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeInsert {
    Inserted,
    DuplicateId,
    MissingEndpoint,
}

/// Directed dependency graph of stores, components, slices and hooks.
///
/// # Example
///
/// ```
/// use stategraph::{DependencyGraph, NodeKind};
///
/// let mut graph = DependencyGraph::new();
/// let cart = graph.add_node("CartView", NodeKind::Component);
/// let store = graph.add_node("cartStore", NodeKind::Store);
///
/// let edge = graph.add_edge(&cart.id, &store.id).expect("both endpoints exist");
/// assert_eq!(edge.source, cart.id);
/// assert_eq!(graph.dependencies(&cart.id)[0].id, store.id);
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Nodes indexed by ID.
    nodes: HashMap<NodeId, Sequenced<Node>>,

    /// Edges indexed by ID.
    edges: HashMap<EdgeId, Sequenced<Edge>>,

    /// Adjacency. Node weights are `NodeId`s, edge weights are `EdgeId`s.
    /// Edge direction: source (dependent) -> target (dependency).
    topology: StableDiGraph<NodeId, EdgeId>,

    /// Every node in `nodes` has an entry here and vice versa.
    node_index: HashMap<NodeId, NodeIndex>,

    /// Every edge in `edges` has an entry here and vice versa.
    edge_index: HashMap<EdgeId, EdgeIndex>,

    node_ids: IdGenerator,
    edge_ids: IdGenerator,

    /// Next insertion sequence number, shared by nodes and edges.
    next_sequence: u64,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraph {
    /// Create an empty graph with the default ID prefixes
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create an empty graph using the ID prefixes from `config`
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            topology: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            node_ids: IdGenerator::new(config.node_prefix.clone()),
            edge_ids: IdGenerator::new(config.edge_prefix.clone()),
            next_sequence: 0,
        }
    }

    fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Add a node without metadata
    pub fn add_node(&mut self, label: impl Into<String>, kind: NodeKind) -> Node {
        self.insert_new_node(label.into(), kind, None)
    }

    /// Add a node carrying metadata
    pub fn add_node_with_metadata(
        &mut self,
        label: impl Into<String>,
        kind: NodeKind,
        metadata: Metadata,
    ) -> Node {
        self.insert_new_node(label.into(), kind, Some(metadata))
    }

    fn insert_new_node(&mut self, label: String, kind: NodeKind, metadata: Option<Metadata>) -> Node {
        let id = NodeId::new(
            self.node_ids
                .generate(&label, kind.as_str(), self.nodes.len()),
        );

        let node = Node {
            id,
            label,
            kind,
            x: None,
            y: None,
            metadata,
        };

        debug!(node_id = %node.id, kind = %node.kind, label = %node.label, "Added node");
        self.attach_node(node.clone());
        node
    }

    fn attach_node(&mut self, node: Node) {
        let index = self.topology.add_node(node.id.clone());
        self.node_index.insert(node.id.clone(), index);
        let sequence = self.take_sequence();
        self.nodes
            .insert(node.id.clone(), Sequenced { sequence, value: node });
    }

    /// Remove a node and every edge incident to it
    ///
    /// Returns whether the node existed.
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        let Some(index) = self.node_index.get(id).copied() else {
            return false;
        };

        // Detach incident edges first so no edge ever names a missing node
        let incident: Vec<EdgeId> = self
            .topology
            .edges_directed(index, Direction::Outgoing)
            .chain(self.topology.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().clone())
            .collect();

        let removed_edges = incident
            .iter()
            .filter(|edge_id| self.detach_edge(edge_id))
            .count();

        self.topology.remove_node(index);
        self.node_index.remove(id);
        self.nodes.remove(id);

        debug!(node_id = %id, removed_edges, "Removed node");
        true
    }

    /// Add an edge with weight 1 and no label or metadata
    ///
    /// Returns `None` if either endpoint does not exist; the graph is left
    /// unchanged in that case.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> Option<Edge> {
        self.add_edge_with(source, target, NewEdge::default())
    }

    /// Add an edge with a label, weight and/or metadata
    ///
    /// Returns `None` if either endpoint does not exist; the graph is left
    /// unchanged in that case.
    pub fn add_edge_with(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        attributes: NewEdge,
    ) -> Option<Edge> {
        if !self.node_index.contains_key(source) || !self.node_index.contains_key(target) {
            debug!(%source, %target, "Rejected edge with missing endpoint");
            return None;
        }

        let id = EdgeId::new(self.edge_ids.generate(
            &format!("{}->{}", source, target),
            "edge",
            self.edges.len(),
        ));

        let edge = Edge {
            id,
            source: source.clone(),
            target: target.clone(),
            label: attributes.label,
            weight: attributes.weight,
            metadata: attributes.metadata,
        };

        debug!(edge_id = %edge.id, %source, %target, "Added edge");
        self.attach_edge(edge.clone());
        Some(edge)
    }

    /// Wire an edge whose endpoints are known to exist.
    fn attach_edge(&mut self, edge: Edge) {
        let from = self.node_index[&edge.source];
        let to = self.node_index[&edge.target];
        let index = self.topology.add_edge(from, to, edge.id.clone());
        self.edge_index.insert(edge.id.clone(), index);
        let sequence = self.take_sequence();
        self.edges
            .insert(edge.id.clone(), Sequenced { sequence, value: edge });
    }

    /// Remove an edge
    ///
    /// Returns whether the edge existed.
    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        let removed = self.detach_edge(id);
        if removed {
            debug!(edge_id = %id, "Removed edge");
        }
        removed
    }

    fn detach_edge(&mut self, id: &EdgeId) -> bool {
        let Some(index) = self.edge_index.remove(id) else {
            return false;
        };
        self.topology.remove_edge(index);
        self.edges.remove(id);
        true
    }

    /// Look up a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id).map(|entry| &entry.value)
    }

    /// Look up an edge by ID
    pub fn get_edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id).map(|entry| &entry.value)
    }

    /// Nodes whose label is exactly `label`, in insertion order
    pub fn find_nodes(&self, label: &str) -> Vec<&Node> {
        self.ordered_nodes()
            .into_iter()
            .filter(|node| node.label == label)
            .collect()
    }

    /// Nodes of the given kind, in insertion order
    pub fn nodes_by_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.ordered_nodes()
            .into_iter()
            .filter(|node| node.kind == kind)
            .collect()
    }

    /// Snapshot of every node, in insertion order
    pub fn all_nodes(&self) -> Vec<Node> {
        self.ordered_nodes().into_iter().cloned().collect()
    }

    /// Snapshot of every edge, in insertion order
    pub fn all_edges(&self) -> Vec<Edge> {
        self.ordered_edges().into_iter().cloned().collect()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove every node and edge
    ///
    /// IDs issued before the clear stay reserved and will not be handed out
    /// again by this graph.
    pub fn clear(&mut self) {
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "Clearing graph"
        );
        self.nodes.clear();
        self.edges.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.topology.clear();
    }

    /// Set a node's coordinates
    ///
    /// Returns whether the node exists.
    pub fn set_position(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        match self.nodes.get_mut(id) {
            Some(entry) => {
                entry.value.x = Some(x);
                entry.value.y = Some(y);
                true
            }
            None => false,
        }
    }

    pub(crate) fn ordered_nodes(&self) -> Vec<&Node> {
        in_insertion_order(&self.nodes)
    }

    pub(crate) fn ordered_edges(&self) -> Vec<&Edge> {
        in_insertion_order(&self.edges)
    }

    pub(crate) fn ordered_node_ids(&self) -> Vec<NodeId> {
        self.ordered_nodes()
            .into_iter()
            .map(|node| node.id.clone())
            .collect()
    }

    /// Insert a node record that already has an ID (snapshot import).
    ///
    /// Returns `false` without mutating if a node with that ID exists.
    pub(crate) fn insert_node_record(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.node_ids.register_id(node.id.as_str());
        self.attach_node(node);
        true
    }

    /// Insert an edge record that already has an ID (snapshot import).
    pub(crate) fn insert_edge_record(&mut self, edge: Edge) -> EdgeInsert {
        if self.edges.contains_key(&edge.id) {
            return EdgeInsert::DuplicateId;
        }
        if !self.node_index.contains_key(&edge.source)
            || !self.node_index.contains_key(&edge.target)
        {
            return EdgeInsert::MissingEndpoint;
        }
        self.edge_ids.register_id(edge.id.as_str());
        self.attach_edge(edge);
        EdgeInsert::Inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generation::validate_id;

    #[test]
    fn test_side_maps_stay_in_sync() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_node("a", NodeKind::Store);
        let b = graph.add_node("b", NodeKind::Hook);
        let ab = graph.add_edge(&a.id, &b.id).unwrap();
        graph.add_edge(&b.id, &b.id).unwrap();

        assert_eq!(graph.topology.node_count(), 2);
        assert_eq!(graph.topology.edge_count(), 2);

        graph.remove_edge(&ab.id);
        assert_eq!(graph.topology.edge_count(), 1);
        assert!(!graph.edge_index.contains_key(&ab.id));

        // Self-loop is listed both as outgoing and incoming; removed once
        graph.remove_node(&b.id);
        assert_eq!(graph.topology.node_count(), 1);
        assert_eq!(graph.topology.edge_count(), 0);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.node_index.len(), 1);
    }

    #[test]
    fn test_ids_use_configured_prefixes() {
        let config = EngineConfig {
            node_prefix: "ent".to_string(),
            edge_prefix: "rel".to_string(),
            ..EngineConfig::default()
        };
        let mut graph = DependencyGraph::with_config(&config);
        let a = graph.add_node("a", NodeKind::Slice);
        let b = graph.add_node("b", NodeKind::Slice);
        let edge = graph.add_edge(&a.id, &b.id).unwrap();

        assert!(validate_id(a.id.as_str(), "ent"));
        assert!(validate_id(edge.id.as_str(), "rel"));
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut graph = DependencyGraph::new();
        let first = graph.add_node("same", NodeKind::Store);
        graph.clear();
        let second = graph.add_node("same", NodeKind::Store);

        assert_ne!(first.id, second.id);
        assert!(graph.node_ids.is_reserved(first.id.as_str()));
    }

    #[test]
    fn test_insert_records_reject_duplicates_and_orphans() {
        let mut graph = DependencyGraph::new();
        let node = Node {
            id: NodeId::new("a"),
            label: "a".to_string(),
            kind: NodeKind::Store,
            x: None,
            y: None,
            metadata: None,
        };
        assert!(graph.insert_node_record(node.clone()));
        assert!(!graph.insert_node_record(node));

        let edge = Edge {
            id: EdgeId::new("e"),
            source: NodeId::new("a"),
            target: NodeId::new("missing"),
            label: None,
            weight: 1.0,
            metadata: None,
        };
        assert_eq!(
            graph.insert_edge_record(edge.clone()),
            EdgeInsert::MissingEndpoint
        );

        let looped = Edge {
            target: NodeId::new("a"),
            ..edge
        };
        assert_eq!(graph.insert_edge_record(looped.clone()), EdgeInsert::Inserted);
        assert_eq!(graph.insert_edge_record(looped), EdgeInsert::DuplicateId);
    }
}
