// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Chu-Liu/Edmonds maximum spanning arborescence
//!
//! Each node picks its heaviest incoming edge. A cycle among those picks is
//! contracted into a single node, with the weight of every edge entering the
//! cycle reduced by the weight of the pick it would replace, and the smaller
//! problem is solved recursively. Expanding the result keeps every pick of
//! the cycle except the one displaced by the entering edge.
//!
//! Ties go to the edge inserted first, so equal graphs give equal trees.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::graph::{DirectedEdge, SparseWeightedGraph, Weighted};

/// A directed spanning tree hanging from `root`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arborescence {
    root: usize,
    parents: BTreeMap<usize, usize>,
}

impl Arborescence {
    pub fn root(&self) -> usize {
        self.root
    }

    pub fn parents(&self) -> &BTreeMap<usize, usize> {
        &self.parents
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(&node).copied()
    }

    pub fn contains(&self, node: usize) -> bool {
        node == self.root || self.parents.contains_key(&node)
    }

    /// Children of `node`, in index order
    pub fn children(&self, node: usize) -> Vec<usize> {
        self.parents
            .iter()
            .filter(|(_, parent)| **parent == node)
            .map(|(child, _)| *child)
            .collect()
    }

    pub fn edges(&self) -> Vec<DirectedEdge> {
        self.parents
            .iter()
            .map(|(child, parent)| DirectedEdge::new(*parent, *child))
            .collect()
    }

    /// Number of nodes spanned, root included
    pub fn node_count(&self) -> usize {
        self.parents.len() + 1
    }
}

#[derive(Debug, Clone, Copy)]
struct CandidateEdge {
    id: usize,
    source: usize,
    destination: usize,
    weight: f64,
}

pub struct ChuLiuEdmonds;

impl ChuLiuEdmonds {
    /// The maximum-weight arborescence spanning every node reachable from `root`
    ///
    /// Returns `None` when `root` is not in the graph.
    pub fn max_arborescence(
        graph: &SparseWeightedGraph,
        root: usize,
    ) -> Option<Weighted<Arborescence>> {
        if !graph.contains_node(root) {
            return None;
        }
        let nodes = graph.reachable_from(root);
        let edges: Vec<CandidateEdge> = graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, edge)| {
                let DirectedEdge {
                    source,
                    destination,
                } = edge.val;
                source != destination
                    && destination != root
                    && nodes.contains(&source)
                    && nodes.contains(&destination)
            })
            .map(|(id, edge)| CandidateEdge {
                id,
                source: edge.val.source,
                destination: edge.val.destination,
                weight: edge.weight,
            })
            .collect();

        let next_id = nodes.iter().next_back().map(|max| max + 1).unwrap_or(0);
        let chosen = solve(&nodes, root, &edges, next_id);

        let mut parents = BTreeMap::new();
        let mut weight = 0.0;
        for id in chosen {
            let edge = &graph.edges()[id];
            parents.insert(edge.val.destination, edge.val.source);
            weight += edge.weight;
        }
        Some(Weighted::new(Arborescence { root, parents }, weight))
    }
}

/// Ids of the chosen edges
fn solve(
    nodes: &BTreeSet<usize>,
    root: usize,
    edges: &[CandidateEdge],
    next_id: usize,
) -> Vec<usize> {
    let best = best_incoming(edges, root);
    let Some(cycle) = find_cycle(nodes, &best) else {
        return best.values().map(|edge| edge.id).collect();
    };

    let contracted = next_id;
    let mut contracted_nodes: BTreeSet<usize> = nodes.difference(&cycle).copied().collect();
    contracted_nodes.insert(contracted);

    let contracted_edges: Vec<CandidateEdge> = edges
        .iter()
        .filter_map(|edge| {
            let from_cycle = cycle.contains(&edge.source);
            let into_cycle = cycle.contains(&edge.destination);
            match (from_cycle, into_cycle) {
                (true, true) => None,
                (false, true) => {
                    let displaced = best.get(&edge.destination)?;
                    Some(CandidateEdge {
                        destination: contracted,
                        weight: edge.weight - displaced.weight,
                        ..*edge
                    })
                }
                (true, false) => Some(CandidateEdge {
                    source: contracted,
                    ..*edge
                }),
                (false, false) => Some(*edge),
            }
        })
        .collect();

    let chosen = solve(&contracted_nodes, root, &contracted_edges, next_id + 1);

    let by_id: BTreeMap<usize, &CandidateEdge> = edges.iter().map(|edge| (edge.id, edge)).collect();
    let entering = chosen
        .iter()
        .filter_map(|id| by_id.get(id))
        .find(|edge| cycle.contains(&edge.destination))
        .map(|edge| edge.destination);

    let mut result = chosen;
    for node in &cycle {
        if Some(*node) != entering {
            if let Some(edge) = best.get(node) {
                result.push(edge.id);
            }
        }
    }
    result
}

/// Heaviest incoming edge of every non-root node, lowest id on ties
fn best_incoming(edges: &[CandidateEdge], root: usize) -> BTreeMap<usize, CandidateEdge> {
    let mut best: BTreeMap<usize, CandidateEdge> = BTreeMap::new();
    for edge in edges {
        if edge.destination == root {
            continue;
        }
        match best.get(&edge.destination) {
            Some(current)
                if current.weight > edge.weight
                    || (current.weight == edge.weight && current.id < edge.id) => {}
            _ => {
                best.insert(edge.destination, *edge);
            }
        }
    }
    best
}

/// The first cycle formed by the picked edges, scanning nodes in order
fn find_cycle(
    nodes: &BTreeSet<usize>,
    best: &BTreeMap<usize, CandidateEdge>,
) -> Option<BTreeSet<usize>> {
    let mut settled = BTreeSet::new();
    for &start in nodes {
        let mut path = Vec::new();
        let mut on_path = BTreeSet::new();
        let mut current = start;
        loop {
            if settled.contains(&current) {
                break;
            }
            if on_path.contains(&current) {
                let position = path.iter().position(|node| *node == current)?;
                return Some(path[position..].iter().copied().collect());
            }
            path.push(current);
            on_path.insert(current);
            match best.get(&current) {
                Some(edge) => current = edge.source,
                None => break,
            }
        }
        settled.extend(path);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: usize, destination: usize, weight: f64) -> Weighted<DirectedEdge> {
        Weighted::new(DirectedEdge::new(source, destination), weight)
    }

    #[test]
    fn test_picks_heaviest_tree() {
        let graph = SparseWeightedGraph::from_edges([
            edge(0, 1, 5.0),
            edge(0, 2, 1.0),
            edge(1, 2, 10.0),
            edge(2, 3, 2.0),
            edge(1, 3, 1.0),
        ]);
        let tree = ChuLiuEdmonds::max_arborescence(&graph, 0).unwrap();
        assert_eq!(tree.weight, 17.0);
        assert_eq!(tree.val.parent(1), Some(0));
        assert_eq!(tree.val.parent(2), Some(1));
        assert_eq!(tree.val.parent(3), Some(2));
    }

    #[test]
    fn test_contracts_cycles() {
        // 1 and 2 prefer each other; the cheaper way into the pair must be taken
        let graph = SparseWeightedGraph::from_edges([
            edge(0, 1, 1.0),
            edge(0, 2, 3.0),
            edge(1, 2, 10.0),
            edge(2, 1, 10.0),
        ]);
        let tree = ChuLiuEdmonds::max_arborescence(&graph, 0).unwrap();
        assert_eq!(tree.val.parent(2), Some(0));
        assert_eq!(tree.val.parent(1), Some(2));
        assert_eq!(tree.weight, 13.0);
    }

    #[test]
    fn test_only_reachable_nodes_are_spanned() {
        let graph = SparseWeightedGraph::from_edges([edge(0, 1, -1.0), edge(2, 1, -0.5)]);
        let tree = ChuLiuEdmonds::max_arborescence(&graph, 0).unwrap();
        assert_eq!(tree.val.node_count(), 2);
        assert!(!tree.val.contains(2));
        assert!(ChuLiuEdmonds::max_arborescence(&graph, 7).is_none());
    }

    #[test]
    fn test_ties_go_to_first_edge() {
        let graph = SparseWeightedGraph::from_edges([
            edge(0, 1, -1.0),
            edge(0, 2, -1.0),
            edge(1, 3, 0.0),
            edge(2, 3, 0.0),
        ]);
        let first = ChuLiuEdmonds::max_arborescence(&graph, 0).unwrap();
        let second = ChuLiuEdmonds::max_arborescence(&graph, 0).unwrap();
        assert_eq!(first.val.parent(3), Some(1));
        assert_eq!(first, second);
    }
}
