// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named node groups.

use crate::node::NodeId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    /// Create a new random group ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

/// A named set of nodes, drawn as one frame in the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroup {
    /// Display name
    pub name: String,
    nodes: IndexSet<NodeId>,
}

impl NodeGroup {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexSet::new(),
        }
    }

    /// Member nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Check membership
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains(&node_id)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn insert(&mut self, node_id: NodeId) -> bool {
        self.nodes.insert(node_id)
    }

    pub(crate) fn remove(&mut self, node_id: NodeId) -> bool {
        self.nodes.shift_remove(&node_id)
    }
}
