//! Circular dependency detection.
//!
//! Depth-first search with a visited set and a recursion stack. Roots are tried
//! in insertion order; a node finished from one root is never explored again,
//! so each DFS back edge is examined exactly once and yields exactly one
//! report. Parallel edges do not produce duplicate reports because the walk
//! follows distinct dependencies.
//!
//! The search keeps its own frame stack instead of recursing, so very deep
//! dependency chains cannot overflow the thread stack.

use super::DependencyGraph;
use crate::domain::{Node, NodeId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::iter;
use tracing::debug;

/// A closed dependency loop.
///
/// `path` starts and ends with the same ID, e.g. `[a, b, c, a]`. `nodes` holds
/// the resolved record for every entry of `path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cycle {
    /// Resolved nodes along the loop, closing node included
    pub nodes: Vec<Node>,

    /// IDs along the loop, closing back on the first
    pub path: Vec<NodeId>,
}

impl Cycle {
    /// Number of distinct nodes on the loop
    pub fn len(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Whether the loop is empty (never true for detected cycles)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` lies on the loop
    pub fn contains(&self, id: &NodeId) -> bool {
        self.path.contains(id)
    }
}

/// One suspended DFS call: the node being explored and how far through its
/// dependencies the walk has got.
struct Frame<'a> {
    node: &'a NodeId,
    dependencies: Vec<&'a NodeId>,
    next: usize,
}

struct Walk<'a> {
    graph: &'a DependencyGraph,
    visited: HashSet<&'a NodeId>,
    /// Nodes on the current path, mapped to their position in it.
    on_stack: HashMap<&'a NodeId, usize>,
    stack: Vec<Frame<'a>>,
}

impl<'a> Walk<'a> {
    fn enter(&mut self, node: &'a NodeId) {
        self.visited.insert(node);
        self.on_stack.insert(node, self.stack.len());
        self.stack.push(Frame {
            node,
            dependencies: self
                .graph
                .dependencies(node)
                .into_iter()
                .map(|dependency| &dependency.id)
                .collect(),
            next: 0,
        });
    }

    /// Run DFS from `root` until its frame is popped, appending closed loops.
    fn explore(&mut self, root: &'a NodeId, cycles: &mut Vec<Vec<NodeId>>) {
        self.enter(root);

        while let Some(frame) = self.stack.last_mut() {
            let Some(&next) = frame.dependencies.get(frame.next) else {
                let node = frame.node;
                self.stack.pop();
                self.on_stack.remove(node);
                continue;
            };
            frame.next += 1;

            if let Some(&position) = self.on_stack.get(next) {
                let path = self.stack[position..]
                    .iter()
                    .map(|frame| frame.node.clone())
                    .chain(iter::once(next.clone()))
                    .collect();
                cycles.push(path);
            } else if !self.visited.contains(next) {
                self.enter(next);
            }
        }
    }
}

impl DependencyGraph {
    /// Find circular dependencies
    ///
    /// Returns an empty list for any acyclic graph.
    pub fn detect_circular_dependencies(&self) -> Vec<Cycle> {
        let mut walk = Walk {
            graph: self,
            visited: HashSet::new(),
            on_stack: HashMap::new(),
            stack: Vec::new(),
        };
        let mut paths = Vec::new();

        for root in self.ordered_nodes() {
            if !walk.visited.contains(&root.id) {
                walk.explore(&root.id, &mut paths);
            }
        }

        debug!(
            nodes = self.node_count(),
            cycles = paths.len(),
            "Cycle detection finished"
        );

        paths
            .into_iter()
            .map(|path: Vec<NodeId>| Cycle {
                nodes: path
                    .iter()
                    .filter_map(|id| self.get_node(id))
                    .cloned()
                    .collect(),
                path,
            })
            .collect()
    }

    /// Whether the graph contains at least one cycle
    pub fn has_cycles(&self) -> bool {
        !self.detect_circular_dependencies().is_empty()
    }
}
