// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use crate::slot::{InputSlotRef, OutputSlotRef, SlotId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A directed connection from an output slot to an input slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub from_node: NodeId,
    /// Source output slot
    pub from_slot: SlotId,
    /// Target node ID
    pub to_node: NodeId,
    /// Target input slot
    pub to_slot: SlotId,
}

impl Connection {
    /// Create a new connection
    pub fn new(output: &OutputSlotRef, input: &InputSlotRef) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node: output.node,
            from_slot: output.slot.clone(),
            to_node: input.node,
            to_slot: input.slot.clone(),
        }
    }

    /// Source side as a slot reference
    pub fn output(&self) -> OutputSlotRef {
        OutputSlotRef::new(self.from_node, self.from_slot.clone())
    }

    /// Target side as a slot reference
    pub fn input(&self) -> InputSlotRef {
        InputSlotRef::new(self.to_node, self.to_slot.clone())
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection starts at the given output slot
    pub fn starts_at(&self, output: &OutputSlotRef) -> bool {
        self.from_node == output.node && self.from_slot == output.slot
    }

    /// Check if this connection ends at the given input slot
    pub fn ends_at(&self, input: &InputSlotRef) -> bool {
        self.to_node == input.node && self.to_slot == input.slot
    }
}
