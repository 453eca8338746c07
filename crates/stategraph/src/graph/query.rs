//! Dependency and dependent lookups, transitive closure and metrics.

use super::DependencyGraph;
use super::ordering::sort_by_insertion;
use crate::domain::{Edge, EdgeId, Node, NodeId};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::algo;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Aggregate figures for a diagnostic overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetrics {
    /// Number of nodes
    pub node_count: usize,

    /// Number of edges, parallel edges included
    pub edge_count: usize,

    /// Mean out-degree per node, parallel edges included (0 for an empty graph)
    pub avg_dependencies: f64,

    /// Largest out-degree of any node, parallel edges included
    pub max_dependencies: usize,

    /// Number of cycles reported by cycle detection
    pub circular_count: usize,
}

impl DependencyGraph {
    /// Edges whose source is `id`, in insertion order
    ///
    /// Empty for unknown nodes.
    pub fn outgoing_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.incident_edges(id, Direction::Outgoing)
    }

    /// Edges whose target is `id`, in insertion order
    ///
    /// Empty for unknown nodes.
    pub fn incoming_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.incident_edges(id, Direction::Incoming)
    }

    fn incident_edges(&self, id: &NodeId, direction: Direction) -> Vec<&Edge> {
        let Some(&index) = self.node_index.get(id) else {
            return Vec::new();
        };

        let mut edge_ids: Vec<EdgeId> = self
            .topology
            .edges_directed(index, direction)
            .map(|edge| edge.weight().clone())
            .collect();
        sort_by_insertion(&mut edge_ids, &self.edges);

        edge_ids
            .iter()
            .filter_map(|edge_id| self.get_edge(edge_id))
            .collect()
    }

    /// Nodes `id` depends on directly
    ///
    /// Each dependency appears once, however many parallel edges lead to it,
    /// in the order of the first edge reaching it.
    pub fn dependencies(&self, id: &NodeId) -> Vec<&Node> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Nodes that depend on `id` directly
    pub fn dependents(&self, id: &NodeId) -> Vec<&Node> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &NodeId, direction: Direction) -> Vec<&Node> {
        let mut seen: HashSet<&NodeId> = HashSet::new();

        self.incident_edges(id, direction)
            .into_iter()
            .map(|edge| match direction {
                Direction::Outgoing => &edge.target,
                Direction::Incoming => &edge.source,
            })
            .filter(|neighbor| seen.insert(*neighbor))
            .filter_map(|neighbor| self.get_node(neighbor))
            .collect()
    }

    /// Every node reachable from `id` through outgoing edges
    ///
    /// Breadth-first order. The start node is never included, even when it
    /// lies on a cycle.
    pub fn transitive_dependencies(&self, id: &NodeId) -> Vec<&Node> {
        self.reachable(id, Direction::Outgoing)
    }

    /// Every node that reaches `id` through outgoing edges
    pub fn transitive_dependents(&self, id: &NodeId) -> Vec<&Node> {
        self.reachable(id, Direction::Incoming)
    }

    fn reachable(&self, id: &NodeId, direction: Direction) -> Vec<&Node> {
        let Some(start) = self.get_node(id) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited: HashSet<&NodeId> = HashSet::from([&start.id]);
        let mut queue: VecDeque<&NodeId> = VecDeque::from([&start.id]);

        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current, direction) {
                if visited.insert(&next.id) {
                    queue.push_back(&next.id);
                    result.push(next);
                }
            }
        }

        result
    }

    /// Transitive dependencies of `id` paired with their BFS depth
    ///
    /// Direct dependencies have depth 1. With `max_depth`, nodes deeper than
    /// the limit are not returned.
    pub fn dependency_tree(
        &self,
        id: &NodeId,
        max_depth: Option<usize>,
    ) -> Result<Vec<(NodeId, usize)>> {
        let start = self
            .get_node(id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;

        let mut result = Vec::new();
        let mut visited: HashSet<&NodeId> = HashSet::from([&start.id]);
        let mut queue: VecDeque<(&NodeId, usize)> = VecDeque::from([(&start.id, 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            for next in self.dependencies(current) {
                if visited.insert(&next.id) {
                    queue.push_back((&next.id, depth + 1));
                    result.push((next.id.clone(), depth + 1));
                }
            }
        }

        Ok(result)
    }

    /// Nodes nothing depends on, in insertion order
    pub fn roots(&self) -> Vec<&Node> {
        self.ordered_nodes()
            .into_iter()
            .filter(|node| !self.has_edges(&node.id, Direction::Incoming))
            .collect()
    }

    /// Nodes that depend on nothing, in insertion order
    pub fn leaves(&self) -> Vec<&Node> {
        self.ordered_nodes()
            .into_iter()
            .filter(|node| !self.has_edges(&node.id, Direction::Outgoing))
            .collect()
    }

    pub(crate) fn has_edges(&self, id: &NodeId, direction: Direction) -> bool {
        self.node_index.get(id).is_some_and(|&index| {
            self.topology
                .edges_directed(index, direction)
                .next()
                .is_some()
        })
    }

    /// Whether adding an edge `source -> target` would close a cycle
    ///
    /// True when `target` already reaches `source` (or they are the same node).
    pub fn would_create_cycle(&self, source: &NodeId, target: &NodeId) -> Result<bool> {
        let from = self
            .node_index
            .get(source)
            .ok_or_else(|| Error::NodeNotFound(source.clone()))?;
        let to = self
            .node_index
            .get(target)
            .ok_or_else(|| Error::NodeNotFound(target.clone()))?;

        Ok(algo::has_path_connecting(&self.topology, *to, *from, None))
    }

    /// Aggregate metrics over the whole graph
    ///
    /// Dependency figures count edges, so parallel edges each add to a node's
    /// out-degree. Runs a full cycle detection pass.
    pub fn metrics(&self) -> GraphMetrics {
        let node_count = self.node_count();

        let out_degrees: Vec<usize> = self
            .node_index
            .values()
            .map(|&index| {
                self.topology
                    .edges_directed(index, Direction::Outgoing)
                    .count()
            })
            .collect();

        let total: usize = out_degrees.iter().sum();
        let max_dependencies = out_degrees.iter().copied().max().unwrap_or(0);

        #[allow(clippy::cast_precision_loss)]
        let avg_dependencies = if node_count == 0 {
            0.0
        } else {
            total as f64 / node_count as f64
        };

        GraphMetrics {
            node_count,
            edge_count: self.edge_count(),
            avg_dependencies,
            max_dependencies,
            circular_count: self.detect_circular_dependencies().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{NodeId, NodeKind};
    use crate::error::Error;
    use crate::graph::DependencyGraph;

    fn chain(graph: &mut DependencyGraph, len: usize) -> Vec<NodeId> {
        let ids: Vec<NodeId> = (0..len)
            .map(|i| graph.add_node(format!("n{i}"), NodeKind::Hook).id)
            .collect();
        for pair in ids.windows(2) {
            graph.add_edge(&pair[0], &pair[1]).unwrap();
        }
        ids
    }

    #[test]
    fn test_dependency_tree_depths() {
        let mut graph = DependencyGraph::new();
        let ids = chain(&mut graph, 4);

        let tree = graph.dependency_tree(&ids[0], None).unwrap();
        assert_eq!(
            tree,
            vec![(ids[1].clone(), 1), (ids[2].clone(), 2), (ids[3].clone(), 3)]
        );

        let shallow = graph.dependency_tree(&ids[0], Some(2)).unwrap();
        assert_eq!(shallow, vec![(ids[1].clone(), 1), (ids[2].clone(), 2)]);
    }

    #[test]
    fn test_dependency_tree_unknown_node() {
        let graph = DependencyGraph::new();
        let err = graph
            .dependency_tree(&NodeId::new("node-none"), None)
            .unwrap_err();
        assert!(matches!(err, Error::NodeNotFound(_)));
    }

    #[test]
    fn test_would_create_cycle() {
        let mut graph = DependencyGraph::new();
        let ids = chain(&mut graph, 3);

        assert!(graph.would_create_cycle(&ids[2], &ids[0]).unwrap());
        assert!(graph.would_create_cycle(&ids[1], &ids[1]).unwrap());
        assert!(!graph.would_create_cycle(&ids[0], &ids[2]).unwrap());
        assert!(
            graph
                .would_create_cycle(&ids[0], &NodeId::new("node-none"))
                .is_err()
        );
    }

    #[test]
    fn test_metrics_count_parallel_edges() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_node("a", NodeKind::Component).id;
        let b = graph.add_node("b", NodeKind::Store).id;
        graph.add_edge(&a, &b).unwrap();
        graph.add_edge(&a, &b).unwrap();

        let metrics = graph.metrics();
        assert_eq!(metrics.edge_count, 2);
        assert_eq!(metrics.max_dependencies, 2);
        assert!((metrics.avg_dependencies - 1.0).abs() < f64::EPSILON);
        assert_eq!(metrics.circular_count, 0);
    }
}
