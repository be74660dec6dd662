// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph engine.

use crate::evaluation::{CalculationError, EvaluationContext, SlotValues};
use crate::feature::{FeatureId, FeatureReaction, FeatureSet, NodeFeature, ValueVisibility};
use crate::slot::{InputSlot, OutputSlot, SlotId};
use crate::value::NodeValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Polymorphic calculation behind a node.
///
/// Implementations declare their slots and features in [`initialize`] and
/// compute one value per pass in [`calculate`]. The value is shared by every
/// output slot of the node.
///
/// [`initialize`]: NodeBehavior::initialize
/// [`calculate`]: NodeBehavior::calculate
pub trait NodeBehavior: fmt::Debug {
    /// Stable type tag used for registration and reconstruction
    fn type_tag(&self) -> &'static str;

    /// Declare slots and features
    fn initialize(&self, builder: &mut NodeBuilder);

    /// Compute the node's value from its gathered inputs
    fn calculate(&self, inputs: &SlotValues, ctx: &mut EvaluationContext) -> Result<NodeValue, CalculationError>;

    /// Decide whether a freshly calculated value becomes visible
    fn process_value(&self, features: &FeatureSet, value: &NodeValue) -> ValueVisibility {
        features.process_value(value)
    }

    /// React to a feature state change outside the evaluation pass
    fn on_feature_change(
        &self,
        feature_id: &FeatureId,
        features: &FeatureSet,
        value: &NodeValue,
    ) -> FeatureReaction {
        features
            .on_feature_change(feature_id, value)
            .unwrap_or(FeatureReaction::Ignore)
    }

    /// Clone into a box
    fn clone_box(&self) -> Box<dyn NodeBehavior>;
}

impl Clone for Box<dyn NodeBehavior> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Collects slot and feature declarations during [`NodeBehavior::initialize`]
#[derive(Debug, Default)]
pub struct NodeBuilder {
    inputs: Vec<InputSlot>,
    outputs: Vec<OutputSlot>,
    features: Vec<Box<dyn NodeFeature>>,
}

impl NodeBuilder {
    /// Declare an input slot
    pub fn input(&mut self, slot: InputSlot) -> &mut Self {
        self.inputs.push(slot);
        self
    }

    /// Declare an output slot
    pub fn output(&mut self, slot: OutputSlot) -> &mut Self {
        self.outputs.push(slot);
        self
    }

    /// Attach a feature
    pub fn feature(&mut self, feature: impl NodeFeature + 'static) -> &mut Self {
        self.features.push(Box::new(feature));
        self
    }

    /// Validate the declarations and build the node parts
    fn finish(self) -> Result<(IndexMap<SlotId, InputSlot>, IndexMap<SlotId, OutputSlot>, FeatureSet), NodeError> {
        let mut inputs = IndexMap::new();
        for slot in self.inputs {
            if inputs.contains_key(&slot.id) {
                return Err(NodeError::DuplicateSlot(slot.id));
            }
            inputs.insert(slot.id.clone(), slot);
        }

        let mut outputs = IndexMap::new();
        for slot in self.outputs {
            if outputs.contains_key(&slot.id) {
                return Err(NodeError::DuplicateSlot(slot.id));
            }
            outputs.insert(slot.id.clone(), slot);
        }

        let mut features = FeatureSet::new();
        for feature in self.features {
            features
                .register(feature)
                .map_err(|_| NodeError::DuplicateFeature)?;
        }

        Ok((inputs, outputs, features))
    }
}

/// A node instance in a graph
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique instance ID
    pub(crate) id: NodeId,
    /// Display name
    pub name: String,
    /// Position in model space
    pub position: [f32; 2],
    pub(crate) behavior: Box<dyn NodeBehavior>,
    pub(crate) inputs: IndexMap<SlotId, InputSlot>,
    pub(crate) outputs: IndexMap<SlotId, OutputSlot>,
    pub(crate) features: FeatureSet,
    /// Raw value of the last calculation
    pub(crate) calculated: NodeValue,
    /// Whether any pass has calculated this node yet
    pub(crate) evaluated: bool,
}

impl Node {
    /// Initialize a behavior into a node; the ID is assigned by the graph
    pub(crate) fn initialize(
        behavior: Box<dyn NodeBehavior>,
        name: impl Into<String>,
        position: [f32; 2],
    ) -> Result<Self, NodeError> {
        let mut builder = NodeBuilder::default();
        behavior.initialize(&mut builder);
        let (inputs, outputs, features) = builder.finish()?;

        Ok(Self {
            id: NodeId::new(),
            name: name.into(),
            position,
            behavior,
            inputs,
            outputs,
            features,
            calculated: None,
            evaluated: false,
        })
    }

    /// Copy this node under a fresh ID, keeping slots, features and layout
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            id: NodeId::new(),
            calculated: None,
            evaluated: false,
            ..self.clone()
        }
    }

    /// Node ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Type tag of the behavior
    pub fn type_tag(&self) -> &'static str {
        self.behavior.type_tag()
    }

    /// Behavior object
    pub fn behavior(&self) -> &dyn NodeBehavior {
        self.behavior.as_ref()
    }

    /// Get an input slot
    pub fn input(&self, slot_id: &SlotId) -> Option<&InputSlot> {
        self.inputs.get(slot_id)
    }

    /// Get an output slot
    pub fn output(&self, slot_id: &SlotId) -> Option<&OutputSlot> {
        self.outputs.get(slot_id)
    }

    /// Input slots in declaration order
    pub fn inputs(&self) -> impl Iterator<Item = &InputSlot> {
        self.inputs.values()
    }

    /// Output slots in declaration order
    pub fn outputs(&self) -> impl Iterator<Item = &OutputSlot> {
        self.outputs.values()
    }

    /// Index of an input slot in declaration order
    pub fn input_index(&self, slot_id: &SlotId) -> Option<usize> {
        self.inputs.get_index_of(slot_id)
    }

    /// Index of an output slot in declaration order
    pub fn output_index(&self, slot_id: &SlotId) -> Option<usize> {
        self.outputs.get_index_of(slot_id)
    }

    /// Attached features
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Raw value of the last calculation
    pub fn calculated_value(&self) -> &NodeValue {
        &self.calculated
    }

    /// Whether the node has been through an evaluation pass
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }
}

/// Factory producing a fresh behavior
pub type NodeFactory = fn() -> Box<dyn NodeBehavior>;

/// Registry of available node types by type tag
pub struct NodeRegistry {
    factories: IndexMap<&'static str, NodeFactory>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Register a factory under the tag of the behavior it produces
    pub fn register(&mut self, factory: NodeFactory) {
        let tag = factory().type_tag();
        self.factories.insert(tag, factory);
    }

    /// Check whether a type tag is registered
    pub fn contains(&self, type_tag: &str) -> bool {
        self.factories.contains_key(type_tag)
    }

    /// Registered type tags
    pub fn type_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Create a behavior from a type tag
    pub fn create(&self, type_tag: &str) -> Option<Box<dyn NodeBehavior>> {
        self.factories.get(type_tag).map(|factory| factory())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Error when creating or addressing a node
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Two slots with the same ID in one direction
    #[error("Duplicate slot: {0}")]
    DuplicateSlot(SlotId),

    /// Same feature attached twice
    #[error("Duplicate feature")]
    DuplicateFeature,

    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Slot not found
    #[error("Slot not found: {0}")]
    SlotNotFound(SlotId),

    /// Type tag not registered
    #[error("Unknown node type: {0}")]
    UnknownType(String),
}
