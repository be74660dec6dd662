// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node selection predicates used by merge and copy/paste.

use crate::node::NodeId;
use indexmap::IndexSet;

/// Decides which nodes a merge processes
pub trait NodeFilter {
    /// Whether the node is part of the selection
    fn need_to_process_node(&self, node_id: NodeId) -> bool;
}

/// Selects every node
#[derive(Debug, Clone, Copy, Default)]
pub struct AllNodesFilter;

impl NodeFilter for AllNodesFilter {
    fn need_to_process_node(&self, _node_id: NodeId) -> bool {
        true
    }
}

impl<F: Fn(NodeId) -> bool> NodeFilter for F {
    fn need_to_process_node(&self, node_id: NodeId) -> bool {
        self(node_id)
    }
}

/// An ordered set of node IDs; membership only, no ownership
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeCollection {
    nodes: IndexSet<NodeId>,
}

impl NodeCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; returns false if it was already present
    pub fn insert(&mut self, node_id: NodeId) -> bool {
        self.nodes.insert(node_id)
    }

    /// Remove a node; returns false if it was absent
    pub fn erase(&mut self, node_id: NodeId) -> bool {
        self.nodes.shift_remove(&node_id)
    }

    /// Check membership
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains(&node_id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node IDs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl FromIterator<NodeId> for NodeCollection {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl NodeFilter for NodeCollection {
    fn need_to_process_node(&self, node_id: NodeId) -> bool {
        self.contains(node_id)
    }
}
