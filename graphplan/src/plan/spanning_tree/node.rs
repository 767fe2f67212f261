// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Planning-graph nodes and the arena that owns them

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pattern::Variable;

/// What a node stands for
///
/// The type is part of the identity so that, for example, the sub edge and the
/// has edge between the same two variables get distinct middle nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    Var,
    Isa,
    Sub,
    Plays,
    Relates,
    Has,
    Key,
    Attribute,
    RolePlayer,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    node_type: NodeType,
    vars: BTreeSet<Variable>,
}

impl NodeId {
    /// The node of a pattern variable
    pub fn var(var: &Variable) -> Self {
        Self {
            node_type: NodeType::Var,
            vars: BTreeSet::from([var.clone()]),
        }
    }

    /// A middle node keyed by the unordered pair of endpoints
    pub fn edge(node_type: NodeType, a: &Variable, b: &Variable) -> Self {
        Self {
            node_type,
            vars: BTreeSet::from([a.clone(), b.clone()]),
        }
    }

    /// A middle node keyed by the variable naming one physical edge
    pub fn edge_instance(node_type: NodeType, edge: &Variable) -> Self {
        Self {
            node_type,
            vars: BTreeSet::from([edge.clone()]),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn vars(&self) -> &BTreeSet<Variable> {
        &self.vars
    }

    /// The variable of a `Var` node
    pub fn as_var(&self) -> Option<&Variable> {
        match self.node_type {
            NodeType::Var => self.vars.iter().next(),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vars: Vec<String> = self.vars.iter().map(|v| v.to_string()).collect();
        match self.node_type {
            NodeType::Var => write!(f, "{}", vars.join(",")),
            other => write!(f, "{:?}[{}]", other, vars.join(",")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A data instance
    Instance,
    /// A type, role or rule
    Schema,
    /// A concept pinned by id
    Id,
    /// A graph-native edge with no identity of its own in the pattern
    Edge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self { id, kind }
    }

    pub fn instance(var: &Variable) -> Self {
        Self::new(NodeId::var(var), NodeKind::Instance)
    }

    pub fn schema(var: &Variable) -> Self {
        Self::new(NodeId::var(var), NodeKind::Schema)
    }

    pub fn id_node(var: &Variable) -> Self {
        Self::new(NodeId::var(var), NodeKind::Id)
    }

    pub fn middle(id: NodeId) -> Self {
        Self::new(id, NodeKind::Edge)
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Middle nodes can never root a traversal
    pub fn is_valid_starting_point(&self) -> bool {
        self.kind != NodeKind::Edge
    }
}

/// Nodes addressed by index, plus a lookup by identity
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    index: BTreeMap<NodeId, usize>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless one with the same id exists; returns its index either way
    ///
    /// The first registration wins, except that a more specific kind (schema
    /// or id) replaces a plain instance registration of the same variable.
    pub fn add(&mut self, node: Node) -> usize {
        if let Some(&index) = self.index.get(node.id()) {
            let existing = &mut self.nodes[index];
            if existing.kind == NodeKind::Instance
                && matches!(node.kind, NodeKind::Schema | NodeKind::Id)
            {
                existing.kind = node.kind;
            }
            return index;
        }
        let index = self.nodes.len();
        self.index.insert(node.id().clone(), index);
        self.nodes.push(node);
        index
    }

    pub fn get(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_nodes_are_keyed_by_type_and_unordered_pair() {
        let a = Variable::named("a");
        let b = Variable::named("b");
        assert_eq!(
            NodeId::edge(NodeType::Sub, &a, &b),
            NodeId::edge(NodeType::Sub, &b, &a)
        );
        assert_ne!(
            NodeId::edge(NodeType::Sub, &a, &b),
            NodeId::edge(NodeType::Has, &a, &b)
        );
    }

    #[test]
    fn test_arena_deduplicates() {
        let x = Variable::named("x");
        let mut arena = NodeArena::new();
        let first = arena.add(Node::instance(&x));
        let second = arena.add(Node::schema(&x));
        assert_eq!(first, second);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.node(first).map(|n| n.kind()), Some(NodeKind::Schema));

        let middle = arena.add(Node::middle(NodeId::edge(NodeType::Isa, &x, &x)));
        assert!(!arena.node(middle).map(|n| n.is_valid_starting_point()).unwrap_or(true));
    }
}
