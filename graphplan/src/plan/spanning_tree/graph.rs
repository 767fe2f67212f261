// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Weighted directed planning graph

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

/// An edge between two node arena indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectedEdge {
    pub source: usize,
    pub destination: usize,
}

impl DirectedEdge {
    pub fn new(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weighted<T> {
    pub val: T,
    pub weight: f64,
}

impl<T> Weighted<T> {
    pub fn new(val: T, weight: f64) -> Self {
        Self { val, weight }
    }
}

/// The planning graph of one connected fragment set
///
/// Edges keep their insertion order; an edge's position is its index and is
/// used to break ties.
#[derive(Debug, Clone, Default)]
pub struct SparseWeightedGraph {
    graph: DiGraph<usize, usize>,
    indices: BTreeMap<usize, NodeIndex>,
    edges: Vec<Weighted<DirectedEdge>>,
}

impl SparseWeightedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges(edges: impl IntoIterator<Item = Weighted<DirectedEdge>>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    pub fn add_node(&mut self, node: usize) -> NodeIndex {
        if let Some(index) = self.indices.get(&node) {
            return *index;
        }
        let index = self.graph.add_node(node);
        self.indices.insert(node, index);
        index
    }

    pub fn add_edge(&mut self, edge: Weighted<DirectedEdge>) {
        let source = self.add_node(edge.val.source);
        let destination = self.add_node(edge.val.destination);
        self.graph.add_edge(source, destination, self.edges.len());
        self.edges.push(edge);
    }

    pub fn contains_node(&self, node: usize) -> bool {
        self.indices.contains_key(&node)
    }

    pub fn nodes(&self) -> BTreeSet<usize> {
        self.indices.keys().copied().collect()
    }

    pub fn edges(&self) -> &[Weighted<DirectedEdge>] {
        &self.edges
    }

    /// Every node reachable from `root`, `root` included
    pub fn reachable_from(&self, root: usize) -> BTreeSet<usize> {
        let Some(&start) = self.indices.get(&root) else {
            return BTreeSet::new();
        };
        let mut reachable = BTreeSet::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(index) = bfs.next(&self.graph) {
            reachable.insert(self.graph[index]);
        }
        reachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reachability_follows_direction() {
        let graph = SparseWeightedGraph::from_edges([
            Weighted::new(DirectedEdge::new(0, 1), -1.0),
            Weighted::new(DirectedEdge::new(1, 2), 0.0),
            Weighted::new(DirectedEdge::new(3, 2), -1.0),
        ]);
        assert_eq!(graph.reachable_from(0), BTreeSet::from([0, 1, 2]));
        assert_eq!(graph.reachable_from(2), BTreeSet::from([2]));
        assert!(graph.reachable_from(9).is_empty());
        assert_eq!(graph.nodes().len(), 4);
    }
}
