// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot declarations for node inputs/outputs.

use crate::node::NodeId;
use crate::value::{NodeValue, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a slot, unique within a node and direction
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub String);

impl SlotId {
    /// Create a slot ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// How many connections a slot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// At most one connection
    #[default]
    Single,
    /// Any number of connections
    Multiple,
}

/// An input slot on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSlot {
    /// Slot ID
    pub id: SlotId,
    /// Display name
    pub name: String,
    /// Value used while the slot is unconnected
    pub default_value: NodeValue,
    /// Connection mode
    pub mode: ConnectionMode,
}

impl InputSlot {
    /// Create a single-connection input slot
    pub fn new(id: impl Into<String>, name: impl Into<String>, default_value: NodeValue) -> Self {
        Self {
            id: SlotId::new(id),
            name: name.into(),
            default_value,
            mode: ConnectionMode::Single,
        }
    }

    /// Create a multi-connection input slot
    pub fn multiple(id: impl Into<String>, name: impl Into<String>, default_value: NodeValue) -> Self {
        Self {
            mode: ConnectionMode::Multiple,
            ..Self::new(id, name, default_value)
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// An output slot on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSlot {
    /// Slot ID
    pub id: SlotId,
    /// Display name
    pub name: String,
    /// Connection mode
    pub mode: ConnectionMode,
}

impl OutputSlot {
    /// Create an output slot; outputs fan out by default
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: SlotId::new(id),
            name: name.into(),
            mode: ConnectionMode::Multiple,
        }
    }

    /// Restrict the slot to a single outgoing connection
    pub fn single(mut self) -> Self {
        self.mode = ConnectionMode::Single;
        self
    }
}

/// Reference to an output slot of a node in a graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputSlotRef {
    /// Owning node
    pub node: NodeId,
    /// Slot on that node
    pub slot: SlotId,
}

impl OutputSlotRef {
    /// Create an output slot reference
    pub fn new(node: NodeId, slot: impl Into<SlotId>) -> Self {
        Self { node, slot: slot.into() }
    }
}

/// Reference to an input slot of a node in a graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSlotRef {
    /// Owning node
    pub node: NodeId,
    /// Slot on that node
    pub slot: SlotId,
}

impl InputSlotRef {
    /// Create an input slot reference
    pub fn new(node: NodeId, slot: impl Into<SlotId>) -> Self {
        Self { node, slot: slot.into() }
    }
}
