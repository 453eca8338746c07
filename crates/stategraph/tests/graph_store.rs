//! Integration tests for the graph store.
//!
//! These tests cover node and edge CRUD, referential integrity, cascading
//! removal and snapshot ordering.

mod common;

use common::{init_tracing, sample_app};
use rstest::rstest;
use stategraph::id_generation::validate_id;
use stategraph::{DependencyGraph, EdgeId, Metadata, MetadataValue, NewEdge, NodeId, NodeKind};
use std::collections::HashSet;

// ========== Node CRUD Tests ==========

#[test]
fn test_add_node() {
    init_tracing();
    let mut graph = DependencyGraph::new();

    let node = graph.add_node("cartStore", NodeKind::Store);

    assert!(validate_id(node.id.as_str(), "node"));
    assert_eq!(node.label, "cartStore");
    assert_eq!(node.kind, NodeKind::Store);
    assert_eq!(node.position(), None);
    assert_eq!(graph.get_node(&node.id), Some(&node));
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_add_node_with_metadata() {
    let mut graph = DependencyGraph::new();
    let mut metadata = Metadata::new();
    metadata.insert("file".to_string(), "src/cart.ts".into());
    metadata.insert("subscribers".to_string(), 3_i32.into());

    let node = graph.add_node_with_metadata("cartStore", NodeKind::Store, metadata.clone());

    let stored = graph.get_node(&node.id).unwrap();
    assert_eq!(stored.metadata.as_ref(), Some(&metadata));
    assert_eq!(
        stored.metadata.as_ref().unwrap()["subscribers"],
        MetadataValue::Integer(3)
    );
}

#[test]
fn test_ids_are_unique_and_never_reused() {
    let mut graph = DependencyGraph::new();
    let mut seen = HashSet::new();

    for round in 0..50 {
        let node = graph.add_node("same", NodeKind::Hook);
        assert!(seen.insert(node.id.clone()), "ID reissued in round {round}");
        assert!(graph.remove_node(&node.id));
    }
}

#[test]
fn test_remove_node() {
    let mut graph = DependencyGraph::new();
    let node = graph.add_node("Header", NodeKind::Component);

    assert!(graph.remove_node(&node.id));
    assert!(graph.get_node(&node.id).is_none());
    assert!(!graph.remove_node(&node.id));
    assert!(graph.is_empty());
}

#[test]
fn test_remove_unknown_node() {
    let mut graph = DependencyGraph::new();
    assert!(!graph.remove_node(&NodeId::new("node-zzzz")));
}

// ========== Edge CRUD Tests ==========

#[test]
fn test_add_edge() {
    let mut graph = DependencyGraph::new();
    let view = graph.add_node("CartView", NodeKind::Component);
    let store = graph.add_node("cartStore", NodeKind::Store);

    let edge = graph.add_edge(&view.id, &store.id).unwrap();

    assert!(validate_id(edge.id.as_str(), "edge"));
    assert_eq!(edge.source, view.id);
    assert_eq!(edge.target, store.id);
    assert!((edge.weight - 1.0).abs() < f64::EPSILON);
    assert!(edge.label.is_none());
    assert_eq!(graph.get_edge(&edge.id), Some(&edge));
}

#[test]
fn test_add_edge_with_attributes() {
    let mut graph = DependencyGraph::new();
    let view = graph.add_node("CartView", NodeKind::Component);
    let store = graph.add_node("cartStore", NodeKind::Store);
    let mut metadata = Metadata::new();
    metadata.insert("selector".to_string(), "items".into());

    let edge = graph
        .add_edge_with(
            &view.id,
            &store.id,
            NewEdge {
                label: Some("reads".to_string()),
                weight: 4.0,
                metadata: Some(metadata.clone()),
            },
        )
        .unwrap();

    assert_eq!(edge.label.as_deref(), Some("reads"));
    assert!((edge.weight - 4.0).abs() < f64::EPSILON);
    assert_eq!(edge.metadata, Some(metadata));
}

#[rstest]
#[case::missing_source(false, true)]
#[case::missing_target(true, false)]
#[case::missing_both(false, false)]
fn test_add_edge_with_missing_endpoint(#[case] source_exists: bool, #[case] target_exists: bool) {
    let mut graph = DependencyGraph::new();
    let existing = graph.add_node("present", NodeKind::Slice).id;
    let missing = NodeId::new("node-gone");

    let source = if source_exists { &existing } else { &missing };
    let target = if target_exists { &existing } else { &missing };

    assert!(graph.add_edge(source, target).is_none());
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_parallel_edges_are_kept() {
    let mut graph = DependencyGraph::new();
    let a = graph.add_node("a", NodeKind::Component).id;
    let b = graph.add_node("b", NodeKind::Store).id;

    let first = graph.add_edge(&a, &b).unwrap();
    let second = graph.add_edge(&a, &b).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.outgoing_edges(&a).len(), 2);
}

#[test]
fn test_remove_edge() {
    let mut graph = DependencyGraph::new();
    let a = graph.add_node("a", NodeKind::Component).id;
    let b = graph.add_node("b", NodeKind::Store).id;
    let edge = graph.add_edge(&a, &b).unwrap();

    assert!(graph.remove_edge(&edge.id));
    assert!(graph.get_edge(&edge.id).is_none());
    assert!(!graph.remove_edge(&edge.id));
    assert!(!graph.remove_edge(&EdgeId::new("edge-none")));

    // Endpoints survive
    assert_eq!(graph.node_count(), 2);
}

// ========== Referential Integrity Tests ==========

#[test]
fn test_remove_node_cascades_to_incident_edges() {
    let mut app = sample_app();
    let edges_before = app.graph.edge_count();

    assert!(app.graph.remove_node(&app.use_cart));

    // useCart had two incoming edges and one outgoing edge
    assert_eq!(app.graph.edge_count(), edges_before - 3);
    assert!(app.graph.outgoing_edges(&app.use_cart).is_empty());
    assert!(app.graph.incoming_edges(&app.use_cart).is_empty());
    assert!(app.graph.outgoing_edges(&app.cart_view).is_empty());
    assert!(app.graph.incoming_edges(&app.cart_store).is_empty());
}

#[test]
fn test_every_edge_references_live_nodes() {
    let mut app = sample_app();
    app.graph.remove_node(&app.cart_store);
    app.graph.remove_node(&app.header);

    for edge in app.graph.all_edges() {
        assert!(app.graph.get_node(&edge.source).is_some());
        assert!(app.graph.get_node(&edge.target).is_some());
    }
    assert_eq!(app.graph.edge_count(), 1);
}

#[test]
fn test_remove_node_with_self_loop() {
    let mut graph = DependencyGraph::new();
    let a = graph.add_node("a", NodeKind::Store).id;
    graph.add_edge(&a, &a).unwrap();

    assert!(graph.remove_node(&a));
    assert_eq!(graph.edge_count(), 0);
}

// ========== Lookup Tests ==========

#[test]
fn test_find_nodes_exact_match() {
    let mut graph = DependencyGraph::new();
    let first = graph.add_node("useCart", NodeKind::Hook).id;
    graph.add_node("useCartTotal", NodeKind::Hook);
    let second = graph.add_node("useCart", NodeKind::Hook).id;

    let found: Vec<&NodeId> = graph.find_nodes("useCart").iter().map(|n| &n.id).collect();
    assert_eq!(found, vec![&first, &second]);
    assert!(graph.find_nodes("usecart").is_empty());
}

#[rstest]
#[case(NodeKind::Component, &["CartView", "Header"])]
#[case(NodeKind::Hook, &["useCart"])]
#[case(NodeKind::Store, &["cartStore"])]
#[case(NodeKind::Slice, &["itemsSlice"])]
fn test_nodes_by_kind(#[case] kind: NodeKind, #[case] expected: &[&str]) {
    let app = sample_app();
    let labels: Vec<&str> = app
        .graph
        .nodes_by_kind(kind)
        .iter()
        .map(|n| n.label.as_str())
        .collect();
    assert_eq!(labels, expected);
}

#[test]
fn test_snapshots_follow_insertion_order() {
    let mut graph = DependencyGraph::new();
    let labels = ["e", "d", "c", "b", "a"];
    for label in labels {
        graph.add_node(label, NodeKind::Slice);
    }

    let listed: Vec<String> = graph.all_nodes().into_iter().map(|n| n.label).collect();
    assert_eq!(listed, labels);
}

#[test]
fn test_snapshot_is_detached_from_graph() {
    let mut graph = DependencyGraph::new();
    let node = graph.add_node("a", NodeKind::Slice);
    let snapshot = graph.all_nodes();

    graph.set_position(&node.id, 1.0, 2.0);

    assert_eq!(snapshot[0].position(), None);
    assert_eq!(graph.get_node(&node.id).unwrap().position(), Some((1.0, 2.0)));
}

#[test]
fn test_set_position_unknown_node() {
    let mut graph = DependencyGraph::new();
    assert!(!graph.set_position(&NodeId::new("node-none"), 1.0, 1.0));
}

#[test]
fn test_clear() {
    let mut app = sample_app();
    app.graph.clear();

    assert!(app.graph.is_empty());
    assert_eq!(app.graph.edge_count(), 0);
    assert!(app.graph.get_node(&app.cart_view).is_none());

    let fresh = app.graph.add_node("CartView", NodeKind::Component);
    assert_ne!(fresh.id, app.cart_view);
}
