//! Level-based hierarchical layout.
//!
//! # Algorithm
//!
//! 1. Reject cyclic input. Longest-path levels do not exist on a cycle, and the
//!    relaxation below would never settle.
//! 2. Roots (no incoming edges) start at level 0, in insertion order.
//! 3. Queue-driven relaxation: dequeue a node at level `l`; every dependency
//!    whose level is below `l + 1` is raised to `l + 1`, moved to the end of
//!    that level's row and re-queued. When the queue drains each node sits at
//!    the length of the longest root-to-node path.
//! 4. Rows are spaced `node_spacing` apart and centered within `width`; level
//!    `L` sits at `y = LAYOUT_MARGIN + L * level_spacing`.

use super::{LAYOUT_MARGIN, Layout};
use crate::config::HierarchicalOptions;
use crate::domain::NodeId;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Level assignment produced by [`DependencyGraph::calculate_levels`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Levels {
    level_of: HashMap<NodeId, usize>,
    rows: Vec<Vec<NodeId>>,
}

impl Levels {
    /// Level of a node, if it was assigned one
    pub fn level_of(&self, id: &NodeId) -> Option<usize> {
        self.level_of.get(id).copied()
    }

    /// Nodes per level, level 0 first
    pub fn rows(&self) -> &[Vec<NodeId>] {
        &self.rows
    }

    /// Number of levels
    pub fn depth(&self) -> usize {
        self.rows.len()
    }

    /// Put `id` at `level`, moving it out of its previous row.
    fn assign(&mut self, id: &NodeId, level: usize) {
        if let Some(previous) = self.level_of.insert(id.clone(), level) {
            self.rows[previous].retain(|member| member != id);
        }
        if self.rows.len() <= level {
            self.rows.resize_with(level + 1, Vec::new);
        }
        self.rows[level].push(id.clone());
    }
}

impl DependencyGraph {
    /// Assign every node the length of its longest path from a root
    ///
    /// # Errors
    ///
    /// [`Error::CyclicGraph`] if the graph contains a cycle.
    pub fn calculate_levels(&self) -> Result<Levels> {
        if let Some(cycle) = self.detect_circular_dependencies().into_iter().next() {
            return Err(Error::CyclicGraph { path: cycle.path });
        }

        let mut levels = Levels::default();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

        for root in self.roots() {
            levels.assign(&root.id, 0);
            queue.push_back((root.id.clone(), 0));
        }

        while let Some((current, level)) = queue.pop_front() {
            // Stale entry: the node was raised after this one was queued
            if levels.level_of(&current) != Some(level) {
                continue;
            }

            for dependency in self.dependencies(&current) {
                let candidate = level + 1;
                if levels
                    .level_of(&dependency.id)
                    .is_none_or(|existing| existing < candidate)
                {
                    levels.assign(&dependency.id, candidate);
                    queue.push_back((dependency.id.clone(), candidate));
                }
            }
        }

        Ok(levels)
    }

    /// Place nodes in rows by level
    ///
    /// Mutates every node's `x`/`y` and returns the level assignment used.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLayoutOptions`] for unusable options,
    /// [`Error::CyclicGraph`] for cyclic graphs. Positions are untouched on
    /// error.
    #[allow(clippy::cast_precision_loss)]
    pub fn layout_hierarchical(&mut self, options: &HierarchicalOptions) -> Result<Levels> {
        options.validate()?;
        let levels = self.calculate_levels()?;

        debug!(
            nodes = self.node_count(),
            levels = levels.depth(),
            "Running hierarchical layout"
        );

        for (level, row) in levels.rows().iter().enumerate() {
            let row_width = row.len().saturating_sub(1) as f64 * options.node_spacing;
            let start_x = (options.width - row_width) / 2.0;
            let y = LAYOUT_MARGIN + level as f64 * options.level_spacing;

            for (slot, id) in row.iter().enumerate() {
                self.set_position(id, start_x + slot as f64 * options.node_spacing, y);
            }
        }

        let bottom = LAYOUT_MARGIN + levels.depth().saturating_sub(1) as f64 * options.level_spacing;
        if bottom > options.height {
            debug!(
                bottom,
                height = options.height,
                "Hierarchical layout extends below the canvas"
            );
        }

        Ok(levels)
    }
}

/// [`Layout`] adapter for [`DependencyGraph::layout_hierarchical`].
#[derive(Debug, Clone, Default)]
pub struct HierarchicalLayout {
    options: HierarchicalOptions,
}

impl HierarchicalLayout {
    /// Create a layout with the given options
    pub fn new(options: HierarchicalOptions) -> Self {
        Self { options }
    }

    /// The options this layout runs with
    pub fn options(&self) -> &HierarchicalOptions {
        &self.options
    }
}

impl Layout for HierarchicalLayout {
    fn name(&self) -> &'static str {
        "hierarchical"
    }

    fn apply(&self, graph: &mut DependencyGraph) -> Result<()> {
        graph.layout_hierarchical(&self.options).map(|_| ())
    }
}
