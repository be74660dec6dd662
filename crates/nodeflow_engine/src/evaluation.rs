// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph evaluation.
//!
//! An evaluation pass recalculates the dirty nodes of a [`NodeGraph`] in
//! topological order. Each node's raw value is cached on the node; what the
//! node's features let through is published into the caller's
//! [`EvaluationContext`].

use crate::feature::{EnableDisableFeature, FeatureError, FeatureId, FeatureReaction, ValueVisibility};
use crate::graph::{GraphEvent, NodeGraph};
use crate::node::{Node, NodeId};
use crate::slot::{ConnectionMode, InputSlotRef, SlotId};
use crate::value::{NodeValue, Value};
use indexmap::IndexMap;
use std::any::Any;

/// Caller-owned state threaded through an evaluation pass.
///
/// Holds the externally visible value of every published node plus an
/// optional piece of user data that calculations may read and update.
#[derive(Default)]
pub struct EvaluationContext {
    values: IndexMap<NodeId, NodeValue>,
    data: Option<Box<dyn Any>>,
    current: Option<NodeId>,
}

impl EvaluationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context carrying user data
    pub fn with_data<T: Any>(data: T) -> Self {
        Self {
            values: IndexMap::new(),
            data: Some(Box::new(data)),
            current: None,
        }
    }

    /// Node being calculated, while inside a calculation
    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    /// Access the user data
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_ref()?.downcast_ref::<T>()
    }

    /// Mutably access the user data
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.as_mut()?.downcast_mut::<T>()
    }

    /// Visible value of a node, if published
    pub fn value(&self, node_id: NodeId) -> Option<&NodeValue> {
        self.values.get(&node_id)
    }

    /// Check whether a node has a visible value
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.values.contains_key(&node_id)
    }

    /// Number of published nodes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is published
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Published values in publication order
    pub fn values(&self) -> impl Iterator<Item = (NodeId, &NodeValue)> {
        self.values.iter().map(|(id, v)| (*id, v))
    }

    /// Publish a value
    pub fn insert_value(&mut self, node_id: NodeId, value: NodeValue) {
        self.values.insert(node_id, value);
    }

    /// Withdraw a value
    pub fn remove_value(&mut self, node_id: NodeId) -> Option<NodeValue> {
        self.values.shift_remove(&node_id)
    }

    /// Withdraw everything
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl std::fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("values", &self.values)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

/// Input values gathered for one calculation
#[derive(Debug, Clone, Default)]
pub struct SlotValues {
    values: IndexMap<SlotId, NodeValue>,
}

impl SlotValues {
    /// Build from explicit values
    pub fn from_values(values: impl IntoIterator<Item = (SlotId, NodeValue)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Value of a slot; `None` when unavailable or undeclared
    pub fn get(&self, slot_id: &SlotId) -> Option<&Value> {
        self.values.get(slot_id)?.as_ref()
    }

    /// Value of a slot, or `MissingInput`
    pub fn value(&self, slot_id: &SlotId) -> Result<&Value, CalculationError> {
        self.get(slot_id)
            .ok_or_else(|| CalculationError::MissingInput(slot_id.clone()))
    }

    /// Integer value of a slot
    pub fn int(&self, slot_id: &SlotId) -> Result<i64, CalculationError> {
        let value = self.value(slot_id)?;
        value.as_int().ok_or_else(|| CalculationError::TypeMismatch {
            slot: slot_id.clone(),
            expected: "Int",
            found: value.type_name(),
        })
    }

    /// Floating point value of a slot
    pub fn double(&self, slot_id: &SlotId) -> Result<f64, CalculationError> {
        let value = self.value(slot_id)?;
        value.as_double().ok_or_else(|| CalculationError::TypeMismatch {
            slot: slot_id.clone(),
            expected: "Double",
            found: value.type_name(),
        })
    }

    /// All values of a slot, flattening multi-connection lists
    pub fn list(&self, slot_id: &SlotId) -> Vec<&Value> {
        self.get(slot_id).map(Value::flatten).unwrap_or_default()
    }

    /// Whether a slot carries a value
    pub fn is_available(&self, slot_id: &SlotId) -> bool {
        self.get(slot_id).is_some()
    }
}

/// Summary of one evaluation pass
#[derive(Debug, Clone, Default)]
pub struct EvaluationReport {
    /// Nodes calculated, in calculation order
    pub calculated: Vec<NodeId>,
    /// Nodes whose calculation failed and were recorded as unavailable
    pub failed: Vec<NodeId>,
}

impl EvaluationReport {
    /// Whether the pass did nothing
    pub fn is_empty(&self) -> bool {
        self.calculated.is_empty()
    }
}

impl NodeGraph {
    /// Recalculate every dirty node in dependency order.
    ///
    /// A failing node is recorded as unavailable and the pass continues.
    pub fn update(&mut self, ctx: &mut EvaluationContext) -> Result<EvaluationReport, EvaluationError> {
        for node_id in self.removed.drain(..) {
            ctx.remove_value(node_id);
        }
        self.take_recalculate_request();

        let mut report = EvaluationReport::default();
        if self.dirty.is_empty() {
            return Ok(report);
        }

        let order = self
            .topological_order()
            .map_err(|_| EvaluationError::CyclicGraph)?;

        for node_id in order {
            if !self.dirty.contains(&node_id) {
                continue;
            }
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };

            let inputs = self.gather_inputs(node);
            ctx.current = Some(node_id);
            let calculation = node.behavior.calculate(&inputs, ctx);
            ctx.current = None;
            let result = match calculation {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Calculation of node {} ({}) failed: {}", node_id, node.type_tag(), e);
                    report.failed.push(node_id);
                    None
                }
            };
            tracing::trace!("Calculated node {}: {:?}", node_id, result);

            match node.behavior.process_value(&node.features, &result) {
                ValueVisibility::Publish(value) => ctx.insert_value(node_id, value),
                ValueVisibility::Suppress => {
                    ctx.remove_value(node_id);
                }
            }

            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.calculated = result;
                node.evaluated = true;
            }
            report.calculated.push(node_id);
        }

        self.dirty.clear();
        tracing::debug!(
            "Evaluation pass calculated {} node(s), {} failed",
            report.calculated.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Collect the effective value of every input slot of a node
    fn gather_inputs(&self, node: &Node) -> SlotValues {
        let mut values = IndexMap::new();
        for slot in node.inputs.values() {
            let input = InputSlotRef::new(node.id, slot.id.clone());
            let upstream: Vec<&NodeValue> = self
                .connections_to_input(&input)
                .filter_map(|c| self.nodes.get(&c.from_node))
                .map(|n| &n.calculated)
                .collect();

            // One unavailable upstream makes the whole slot unavailable
            let value = match (upstream.first(), slot.mode) {
                (None, _) => slot.default_value.clone(),
                (Some(first), ConnectionMode::Single) => (*first).clone(),
                (Some(_), ConnectionMode::Multiple) => upstream
                    .into_iter()
                    .cloned()
                    .collect::<Option<Vec<Value>>>()
                    .map(Value::List),
            };
            values.insert(slot.id.clone(), value);
        }
        SlotValues { values }
    }

    /// Let a node react to a feature state change right away.
    ///
    /// The node's visible value is inserted or withdrawn immediately; the
    /// node and its dependents are also marked dirty so the next pass is
    /// consistent. A node no pass has calculated yet publishes nothing.
    pub fn on_feature_change(
        &mut self,
        node_id: NodeId,
        feature_id: &FeatureId,
        ctx: &mut EvaluationContext,
    ) -> Result<FeatureReaction, FeatureError> {
        let node = self
            .nodes
            .get(&node_id)
            .ok_or(FeatureError::NodeNotFound(node_id))?;
        if !node.features.contains(feature_id) {
            return Err(FeatureError::UnknownFeature(feature_id.clone()));
        }

        let mut reaction = node
            .behavior
            .on_feature_change(feature_id, &node.features, &node.calculated);
        if !node.evaluated && matches!(reaction, FeatureReaction::Publish(_)) {
            // Nothing calculated yet; the next pass publishes the real value
            reaction = FeatureReaction::Ignore;
        }
        match &reaction {
            FeatureReaction::Publish(value) => ctx.insert_value(node_id, value.clone()),
            FeatureReaction::Withdraw => {
                ctx.remove_value(node_id);
            }
            FeatureReaction::Ignore => {}
        }

        tracing::debug!("Feature {} changed on node {}", feature_id, node_id);
        self.mark_dirty(node_id);
        self.push_event(GraphEvent::FeatureChanged(node_id, feature_id.clone()));
        Ok(reaction)
    }

    /// Set a node's enable/disable state and notify it
    pub fn set_node_enabled(
        &mut self,
        node_id: NodeId,
        enabled: bool,
        ctx: &mut EvaluationContext,
    ) -> Result<FeatureReaction, FeatureError> {
        let feature_id = EnableDisableFeature::feature_id();
        self.feature_mut::<EnableDisableFeature>(node_id, &feature_id)?
            .set_enabled(enabled);
        self.on_feature_change(node_id, &feature_id, ctx)
    }

    /// Current enable/disable state of a node
    pub fn is_node_enabled(&self, node_id: NodeId) -> Result<bool, FeatureError> {
        let feature_id = EnableDisableFeature::feature_id();
        let node = self
            .nodes
            .get(&node_id)
            .ok_or(FeatureError::NodeNotFound(node_id))?;
        Ok(node
            .features
            .get_as::<EnableDisableFeature>(&feature_id)?
            .is_enabled())
    }
}

/// Per-node calculation failure; contained by the pass
#[derive(Debug, thiserror::Error)]
pub enum CalculationError {
    /// Input has no value
    #[error("Missing input: {0}")]
    MissingInput(SlotId),

    /// Input has a value of the wrong type
    #[error("Type mismatch on {slot}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Offending slot
        slot: SlotId,
        /// Expected type name
        expected: &'static str,
        /// Actual type name
        found: &'static str,
    },

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

/// Error during evaluation
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// Graph contains a cycle
    #[error("Graph contains a cycle")]
    CyclicGraph,
}
