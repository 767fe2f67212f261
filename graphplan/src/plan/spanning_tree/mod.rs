// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! The planning graph and spanning-tree selection over it

pub mod edmonds;
pub mod graph;
pub mod node;

pub use edmonds::{Arborescence, ChuLiuEdmonds};
pub use graph::{DirectedEdge, SparseWeightedGraph, Weighted};
pub use node::{Node, NodeArena, NodeId, NodeKind, NodeType};
