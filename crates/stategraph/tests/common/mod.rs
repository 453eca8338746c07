//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use stategraph::{DependencyGraph, NodeId, NodeKind};
use tracing_subscriber::EnvFilter;

/// Route library tracing to the test harness; `RUST_LOG=stategraph=debug` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Add one component node per label and link them `labels[0] -> labels[1] -> ...`.
pub fn chain(graph: &mut DependencyGraph, labels: &[&str]) -> Vec<NodeId> {
    let ids: Vec<NodeId> = labels
        .iter()
        .map(|label| graph.add_node(*label, NodeKind::Component).id)
        .collect();

    for pair in ids.windows(2) {
        graph
            .add_edge(&pair[0], &pair[1])
            .expect("chain endpoints exist");
    }

    ids
}

/// A small app: two views sharing a hook over one store, plus a slice.
///
/// ```text
/// CartView ──► useCart ──► cartStore ──► itemsSlice
/// Header   ──► useCart
/// ```
pub struct SampleApp {
    pub graph: DependencyGraph,
    pub cart_view: NodeId,
    pub header: NodeId,
    pub use_cart: NodeId,
    pub cart_store: NodeId,
    pub items_slice: NodeId,
}

pub fn sample_app() -> SampleApp {
    let mut graph = DependencyGraph::new();
    let cart_view = graph.add_node("CartView", NodeKind::Component).id;
    let header = graph.add_node("Header", NodeKind::Component).id;
    let use_cart = graph.add_node("useCart", NodeKind::Hook).id;
    let cart_store = graph.add_node("cartStore", NodeKind::Store).id;
    let items_slice = graph.add_node("itemsSlice", NodeKind::Slice).id;

    graph.add_edge(&cart_view, &use_cart).unwrap();
    graph.add_edge(&header, &use_cart).unwrap();
    graph.add_edge(&use_cart, &cart_store).unwrap();
    graph.add_edge(&cart_store, &items_slice).unwrap();

    SampleApp {
        graph,
        cart_view,
        header,
        use_cart,
        cart_store,
        items_slice,
    }
}
