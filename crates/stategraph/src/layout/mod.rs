//! 2D layout algorithms.
//!
//! Both algorithms write coordinates straight into the graph's nodes
//! (`Node::x` / `Node::y`); a renderer reads them back with
//! [`DependencyGraph::all_nodes`].
//!
//! - [`HierarchicalLayout`]: longest-path levels, rows centered on the canvas.
//!   Acyclic graphs only.
//! - [`ForceDirectedLayout`]: Fruchterman-Reingold spring embedder with linear
//!   cooling. Works on any graph; nondeterministic unless seeded.
//!
//! Hosts that pick the algorithm from configuration use the [`Layout`] trait
//! (see [`crate::config::EngineConfig::layout`]).

mod force;
mod hierarchical;

pub use crate::config::{ForceOptions, HierarchicalOptions};
pub use force::ForceDirectedLayout;
pub use hierarchical::{HierarchicalLayout, Levels};

use crate::error::Result;
use crate::graph::DependencyGraph;

/// Distance kept between placed nodes and the canvas border.
pub const LAYOUT_MARGIN: f64 = 50.0;

/// A layout algorithm that assigns coordinates to every node of a graph.
pub trait Layout {
    /// Short identifier (e.g. "hierarchical")
    fn name(&self) -> &'static str;

    /// Compute positions and write them into `graph`
    fn apply(&self, graph: &mut DependencyGraph) -> Result<()>;
}

/// Inclusive coordinate range that keeps `LAYOUT_MARGIN` from both edges of a
/// canvas dimension, collapsing to the midpoint when the canvas is narrower
/// than two margins.
pub(crate) fn inner_range(extent: f64) -> (f64, f64) {
    let low = LAYOUT_MARGIN.min(extent / 2.0);
    let high = (extent - LAYOUT_MARGIN).max(low);
    (low, high)
}
