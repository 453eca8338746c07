//! Stategraph - dependency graph analysis and layout.
//!
//! This crate models the dependency relationships between the runtime
//! entities of an application (stores, components, slices and hooks) and
//! computes what a debugging UI needs to draw them: cycle reports, transitive
//! closures, aggregate metrics, and 2D coordinates from either a hierarchical
//! or a force-directed layout.
//!
//! A live topology source feeds the graph through [`DependencyGraph`]'s
//! add/remove API; a renderer runs a [`layout::Layout`] and reads the
//! positioned records back. Snapshots travel as JSON ([`persistence`]).
//!
//! ```
//! use stategraph::{DependencyGraph, HierarchicalOptions, NodeKind};
//!
//! let mut graph = DependencyGraph::new();
//! let view = graph.add_node("CartView", NodeKind::Component);
//! let hook = graph.add_node("useCart", NodeKind::Hook);
//! let store = graph.add_node("cartStore", NodeKind::Store);
//! graph.add_edge(&view.id, &hook.id);
//! graph.add_edge(&hook.id, &store.id);
//!
//! assert!(graph.detect_circular_dependencies().is_empty());
//! graph.layout_hierarchical(&HierarchicalOptions::default())?;
//!
//! let placed = graph.get_node(&store.id).unwrap();
//! assert!(placed.y > graph.get_node(&view.id).unwrap().y);
//! # Ok::<(), stategraph::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod layout;
pub mod persistence;

pub use config::{EngineConfig, ForceOptions, HierarchicalOptions};
pub use domain::{Edge, EdgeId, Metadata, MetadataValue, NewEdge, Node, NodeId, NodeKind};
pub use error::{Error, Result};
pub use graph::{Cycle, DependencyGraph, GraphMetrics};
pub use layout::{ForceDirectedLayout, HierarchicalLayout, Layout, Levels};
pub use persistence::{GraphSnapshot, ImportWarning, load_from_file, save_to_file};
