// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-node features.
//!
//! A feature is a behavior object attached to a node under a [`FeatureId`].
//! Features see every calculated value before it becomes visible in the
//! evaluation context, and they react when their own state is changed from
//! outside the evaluation pass.

use crate::value::NodeValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Identifier of a feature kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub String);

impl FeatureId {
    /// Create a feature ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw ID of the enable/disable feature
pub const ENABLE_DISABLE_FEATURE_ID: &str = "EnableDisableFeature";

/// What happens to a freshly calculated value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueVisibility {
    /// Store the value in the evaluation context
    Publish(NodeValue),
    /// Keep the value out of the evaluation context
    Suppress,
}

/// Immediate reaction to a feature state change
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureReaction {
    /// Insert (or replace) the node's visible value
    Publish(NodeValue),
    /// Remove the node's visible value
    Withdraw,
    /// Leave the context alone
    Ignore,
}

/// Behavior attachable to a node
pub trait NodeFeature: fmt::Debug {
    /// Feature ID
    fn id(&self) -> FeatureId;

    /// Post-calculation hook
    fn process_value(&self, value: &NodeValue) -> ValueVisibility {
        ValueVisibility::Publish(value.clone())
    }

    /// Called after the feature's state was changed; `value` is the node's
    /// cached raw value.
    fn on_feature_change(&self, value: &NodeValue) -> FeatureReaction {
        let _ = value;
        FeatureReaction::Ignore
    }

    /// Clone into a box
    fn clone_box(&self) -> Box<dyn NodeFeature>;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Clone for Box<dyn NodeFeature> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Gates whether a node's calculated values are externally visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnableDisableFeature {
    enabled: bool,
}

impl EnableDisableFeature {
    /// Create an enabled feature
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Feature ID of this kind
    pub fn feature_id() -> FeatureId {
        FeatureId::new(ENABLE_DISABLE_FEATURE_ID)
    }

    /// Current state
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Change the state. Does not notify anything; call
    /// `NodeGraph::on_feature_change` afterwards.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Default for EnableDisableFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeFeature for EnableDisableFeature {
    fn id(&self) -> FeatureId {
        Self::feature_id()
    }

    fn process_value(&self, value: &NodeValue) -> ValueVisibility {
        if self.enabled {
            ValueVisibility::Publish(value.clone())
        } else {
            ValueVisibility::Suppress
        }
    }

    fn on_feature_change(&self, value: &NodeValue) -> FeatureReaction {
        if self.enabled {
            FeatureReaction::Publish(value.clone())
        } else {
            FeatureReaction::Withdraw
        }
    }

    fn clone_box(&self) -> Box<dyn NodeFeature> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Features attached to one node, in registration order
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    features: IndexMap<FeatureId, Box<dyn NodeFeature>>,
}

impl FeatureSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a feature
    pub fn register(&mut self, feature: Box<dyn NodeFeature>) -> Result<(), FeatureError> {
        let id = feature.id();
        if self.features.contains_key(&id) {
            return Err(FeatureError::DuplicateFeature(id));
        }
        self.features.insert(id, feature);
        Ok(())
    }

    /// Check whether a feature is attached
    pub fn contains(&self, id: &FeatureId) -> bool {
        self.features.contains_key(id)
    }

    /// Look up a feature
    pub fn get(&self, id: &FeatureId) -> Result<&dyn NodeFeature, FeatureError> {
        self.features
            .get(id)
            .map(|feature| feature.as_ref())
            .ok_or_else(|| FeatureError::UnknownFeature(id.clone()))
    }

    /// Look up a feature as its concrete type
    pub fn get_as<T: NodeFeature + 'static>(&self, id: &FeatureId) -> Result<&T, FeatureError> {
        self.get(id)?
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| FeatureError::FeatureTypeMismatch(id.clone()))
    }

    /// Look up a feature mutably as its concrete type
    pub fn get_as_mut<T: NodeFeature + 'static>(&mut self, id: &FeatureId) -> Result<&mut T, FeatureError> {
        let feature = self
            .features
            .get_mut(id)
            .ok_or_else(|| FeatureError::UnknownFeature(id.clone()))?;
        feature
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| FeatureError::FeatureTypeMismatch(id.clone()))
    }

    /// IDs of attached features
    pub fn ids(&self) -> impl Iterator<Item = &FeatureId> {
        self.features.keys()
    }

    /// Number of attached features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no features are attached
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Run every feature's post-calculation hook in registration order.
    /// The first feature that suppresses the value wins.
    pub fn process_value(&self, value: &NodeValue) -> ValueVisibility {
        let mut current = value.clone();
        for feature in self.features.values() {
            match feature.process_value(&current) {
                ValueVisibility::Publish(next) => current = next,
                ValueVisibility::Suppress => return ValueVisibility::Suppress,
            }
        }
        ValueVisibility::Publish(current)
    }

    /// Dispatch a state change to the named feature
    pub fn on_feature_change(&self, id: &FeatureId, value: &NodeValue) -> Result<FeatureReaction, FeatureError> {
        Ok(self.get(id)?.on_feature_change(value))
    }
}

/// Error when accessing features
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Feature not attached to the node
    #[error("Unknown feature: {0}")]
    UnknownFeature(FeatureId),

    /// Feature attached but of another type
    #[error("Feature type mismatch: {0}")]
    FeatureTypeMismatch(FeatureId),

    /// Feature registered twice
    #[error("Duplicate feature: {0}")]
    DuplicateFeature(FeatureId),

    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(crate::node::NodeId),
}
