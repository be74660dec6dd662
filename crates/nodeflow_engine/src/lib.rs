// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph evaluation and editor state engine.
//!
//! This crate provides the engine behind a visual node editor:
//! - Nodes with named input/output slots and pluggable behaviors
//! - Connections with single/multiple connection modes and cycle rejection
//! - Incremental, dependency-ordered recalculation
//! - Per-node features such as enable/disable
//! - Copy/paste and merge between independent graphs
//! - Editor info snapshots for renderers
//!
//! ## Architecture
//!
//! A [`NodeGraph`] owns nodes, connections and groups, and tracks which
//! nodes are dirty. [`NodeGraph::update`] recalculates them in topological
//! order and publishes visible values into a caller-owned
//! [`EvaluationContext`]. Everything runs synchronously on the caller's
//! thread.

pub mod value;
pub mod slot;
pub mod feature;
pub mod node;
pub mod connection;
pub mod group;
pub mod graph;
pub mod evaluation;
pub mod filter;
pub mod merge;
pub mod copy_paste;
pub mod geometry;
pub mod editor_info;
pub mod config;

#[cfg(test)]
pub(crate) mod test_nodes;

pub use value::{NodeValue, Value};
pub use slot::{ConnectionMode, InputSlot, InputSlotRef, OutputSlot, OutputSlotRef, SlotId};
pub use feature::{EnableDisableFeature, FeatureError, FeatureId, FeatureReaction, FeatureSet, NodeFeature, ValueVisibility};
pub use node::{Node, NodeBehavior, NodeBuilder, NodeError, NodeId, NodeRegistry};
pub use connection::{Connection, ConnectionId};
pub use group::{GroupId, NodeGroup};
pub use graph::{ConnectionError, GraphEvent, NodeGraph, UpdateRequest};
pub use evaluation::{CalculationError, EvaluationContext, EvaluationError, EvaluationReport, SlotValues};
pub use filter::{AllNodesFilter, NodeCollection, NodeFilter};
pub use merge::{MergeError, MergeResult};
pub use copy_paste::CopyPasteHandler;
pub use geometry::{EditorGeometry, LayoutGeometry, ViewBox};
pub use editor_info::{CanvasInfo, ConnectionInfo, GroupInfo, NodeEditorInfo, NodeInfo, SlotInfo};
pub use config::{ConfigError, EditorConfig, SkinParams};
