// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure owning nodes, connections and groups.

use crate::connection::{Connection, ConnectionId};
use crate::feature::{FeatureError, FeatureId, NodeFeature};
use crate::group::{GroupId, NodeGroup};
use crate::node::{Node, NodeBehavior, NodeError, NodeId, NodeRegistry};
use crate::slot::{ConnectionMode, InputSlotRef, OutputSlotRef, SlotId};
use crate::value::NodeValue;
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, VecDeque};

/// Structural change recorded by the graph, drained by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// Node added
    NodeAdded(NodeId),
    /// Node removed
    NodeRemoved(NodeId),
    /// Connection created
    Connected(ConnectionId),
    /// Connection removed
    Disconnected(ConnectionId),
    /// Input default value changed
    ParameterChanged(NodeId),
    /// Feature state changed
    FeatureChanged(NodeId, FeatureId),
    /// Group created, removed or changed
    GroupsChanged,
}

/// Pending recalculate/redraw requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Values need recalculation
    pub recalculate: bool,
    /// Editor needs redraw
    pub redraw: bool,
}

/// A node graph (node manager)
#[derive(Debug, Clone)]
pub struct NodeGraph {
    /// Graph name
    pub name: String,
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) connections: IndexMap<ConnectionId, Connection>,
    pub(crate) groups: IndexMap<GroupId, NodeGroup>,
    /// Nodes whose cached value is stale
    pub(crate) dirty: IndexSet<NodeId>,
    /// Removed nodes whose visible values are withdrawn on the next pass
    pub(crate) removed: Vec<NodeId>,
    events: Vec<GraphEvent>,
    request: UpdateRequest,
}

impl NodeGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            groups: IndexMap::new(),
            dirty: IndexSet::new(),
            removed: Vec::new(),
            events: Vec::new(),
            request: UpdateRequest::default(),
        }
    }

    /// Remove every node, connection and group
    pub fn clear(&mut self) {
        self.removed.extend(self.nodes.keys().copied());
        self.nodes.clear();
        self.connections.clear();
        self.groups.clear();
        self.dirty.clear();
        self.request_recalculate_and_redraw();
    }

    /// Add a node named after its type tag
    pub fn add_node(&mut self, behavior: Box<dyn NodeBehavior>) -> Result<NodeId, NodeError> {
        let name = behavior.type_tag().to_string();
        self.add_node_at(behavior, name, [0.0, 0.0])
    }

    /// Add a node with a display name and model-space position
    pub fn add_node_at(
        &mut self,
        behavior: Box<dyn NodeBehavior>,
        name: impl Into<String>,
        position: [f32; 2],
    ) -> Result<NodeId, NodeError> {
        let node = Node::initialize(behavior, name, position)?;
        Ok(self.insert_node(node))
    }

    /// Create a node from a registered type tag
    pub fn add_node_from_registry(
        &mut self,
        registry: &NodeRegistry,
        type_tag: &str,
        position: [f32; 2],
    ) -> Result<NodeId, NodeError> {
        let behavior = registry
            .create(type_tag)
            .ok_or_else(|| NodeError::UnknownType(type_tag.to_string()))?;
        self.add_node_at(behavior, type_tag, position)
    }

    /// Register an initialized node; it starts dirty
    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        tracing::debug!("Adding node {} ({})", id, node.type_tag());
        self.nodes.insert(id, node);
        self.dirty.insert(id);
        self.push_event(GraphEvent::NodeAdded(id));
        id
    }

    /// Remove a node, its connections and its group membership
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        if !self.nodes.contains_key(&node_id) {
            return None;
        }

        let dependents = self.downstream_closure(node_id);
        self.connections.retain(|_, c| !c.involves_node(node_id));
        for dependent in dependents {
            if dependent != node_id {
                self.dirty.insert(dependent);
            }
        }
        self.dirty.shift_remove(&node_id);

        let before = self.groups.len();
        for group in self.groups.values_mut() {
            group.remove(node_id);
        }
        self.groups.retain(|_, g| !g.is_empty());
        if self.groups.len() != before {
            self.push_event(GraphEvent::GroupsChanged);
        }

        tracing::debug!("Removing node {}", node_id);
        self.removed.push(node_id);
        self.push_event(GraphEvent::NodeRemoved(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Check if a node is in the graph
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID (name and position only)
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.request.redraw = true;
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connect an output slot to an input slot.
    ///
    /// Fails without touching the graph if either slot is missing, a slot's
    /// connection mode would be violated, or the edge would close a cycle.
    pub fn connect(
        &mut self,
        output: &OutputSlotRef,
        input: &InputSlotRef,
    ) -> Result<ConnectionId, ConnectionError> {
        let source_node = self
            .nodes
            .get(&output.node)
            .ok_or(ConnectionError::NodeNotFound(output.node))?;
        let target_node = self
            .nodes
            .get(&input.node)
            .ok_or(ConnectionError::NodeNotFound(input.node))?;

        let source_slot = source_node
            .output(&output.slot)
            .ok_or_else(|| ConnectionError::SlotNotFound(output.slot.clone()))?;
        let target_slot = target_node
            .input(&input.slot)
            .ok_or_else(|| ConnectionError::SlotNotFound(input.slot.clone()))?;

        if self.has_connection(output, input) {
            return Err(ConnectionError::AlreadyConnected);
        }

        if target_slot.mode == ConnectionMode::Single && self.connections_to_input(input).next().is_some() {
            return Err(ConnectionError::ConnectionModeViolation(input.slot.clone()));
        }

        if source_slot.mode == ConnectionMode::Single && self.connections_from_output(output).next().is_some() {
            return Err(ConnectionError::ConnectionModeViolation(output.slot.clone()));
        }

        if output.node == input.node || self.is_downstream_of(output.node, input.node) {
            return Err(ConnectionError::CyclicConnection);
        }

        let connection = Connection::new(output, input);
        let id = connection.id;
        tracing::debug!(
            "Connecting {}:{} -> {}:{}",
            output.node,
            output.slot,
            input.node,
            input.slot
        );
        self.connections.insert(id, connection);
        self.mark_dirty(input.node);
        self.push_event(GraphEvent::Connected(id));
        Ok(id)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Result<Connection, ConnectionError> {
        let connection = self
            .connections
            .shift_remove(&connection_id)
            .ok_or(ConnectionError::ConnectionNotFound(connection_id))?;
        self.mark_dirty(connection.to_node);
        self.push_event(GraphEvent::Disconnected(connection_id));
        Ok(connection)
    }

    /// Remove the connection between two specific slots
    pub fn disconnect_slots(
        &mut self,
        output: &OutputSlotRef,
        input: &InputSlotRef,
    ) -> Result<Connection, ConnectionError> {
        let id = self
            .connections
            .values()
            .find(|c| c.starts_at(output) && c.ends_at(input))
            .map(|c| c.id)
            .ok_or(ConnectionError::NotConnected)?;
        self.disconnect(id)
    }

    /// Remove every connection ending at an input slot
    pub fn disconnect_input_slot(&mut self, input: &InputSlotRef) -> usize {
        let ids: Vec<ConnectionId> = self.connections_to_input(input).map(|c| c.id).collect();
        ids.into_iter().filter(|id| self.disconnect(*id).is_ok()).count()
    }

    /// Remove every connection starting at an output slot
    pub fn disconnect_output_slot(&mut self, output: &OutputSlotRef) -> usize {
        let ids: Vec<ConnectionId> = self.connections_from_output(output).map(|c| c.id).collect();
        ids.into_iter().filter(|id| self.disconnect(*id).is_ok()).count()
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections in insertion order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connections ending at an input slot, in insertion order
    pub fn connections_to_input<'a>(&'a self, input: &'a InputSlotRef) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.ends_at(input))
    }

    /// Connections starting at an output slot, in insertion order
    pub fn connections_from_output<'a>(&'a self, output: &'a OutputSlotRef) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.starts_at(output))
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Check whether two slots are directly connected
    pub fn has_connection(&self, output: &OutputSlotRef, input: &InputSlotRef) -> bool {
        self.connections.values().any(|c| c.starts_at(output) && c.ends_at(input))
    }

    /// Nodes feeding this node directly
    pub fn input_nodes(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut result = IndexSet::new();
        for c in self.connections.values().filter(|c| c.to_node == node_id) {
            result.insert(c.from_node);
        }
        result.into_iter().collect()
    }

    /// Nodes fed directly by this node
    pub fn output_nodes(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut result = IndexSet::new();
        for c in self.connections.values().filter(|c| c.from_node == node_id) {
            result.insert(c.to_node);
        }
        result.into_iter().collect()
    }

    /// The node and everything reachable downstream of it
    pub(crate) fn downstream_closure(&self, node_id: NodeId) -> IndexSet<NodeId> {
        let mut seen = IndexSet::new();
        let mut queue = VecDeque::from([node_id]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            for c in self.connections.values().filter(|c| c.from_node == current) {
                queue.push_back(c.to_node);
            }
        }
        seen
    }

    /// Check whether `node_id` can be reached going downstream from `start`
    fn is_downstream_of(&self, node_id: NodeId, start: NodeId) -> bool {
        self.downstream_closure(start).contains(&node_id)
    }

    /// Change the default value of an input slot; dirties the node and its dependents
    pub fn set_input_default(&mut self, input: &InputSlotRef, value: NodeValue) -> Result<(), NodeError> {
        let node = self
            .nodes
            .get_mut(&input.node)
            .ok_or(NodeError::NodeNotFound(input.node))?;
        let slot = node
            .inputs
            .get_mut(&input.slot)
            .ok_or_else(|| NodeError::SlotNotFound(input.slot.clone()))?;
        slot.default_value = value;
        self.mark_dirty(input.node);
        self.push_event(GraphEvent::ParameterChanged(input.node));
        Ok(())
    }

    /// Mark a node and its dependents for recalculation
    pub fn invalidate_node(&mut self, node_id: NodeId) -> bool {
        if !self.nodes.contains_key(&node_id) {
            return false;
        }
        self.mark_dirty(node_id);
        true
    }

    /// Mark every node for recalculation
    pub fn invalidate_all(&mut self) {
        self.dirty.extend(self.nodes.keys().copied());
        self.request_recalculate_and_redraw();
    }

    /// Check whether a node will be recalculated by the next pass
    pub fn is_dirty(&self, node_id: NodeId) -> bool {
        self.dirty.contains(&node_id)
    }

    /// Number of nodes waiting for recalculation
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    pub(crate) fn mark_dirty(&mut self, node_id: NodeId) {
        let closure = self.downstream_closure(node_id);
        self.dirty.extend(closure);
        self.request_recalculate_and_redraw();
    }

    /// Look up a feature attached to a node
    pub fn feature(&self, node_id: NodeId, feature_id: &FeatureId) -> Result<&dyn NodeFeature, FeatureError> {
        self.nodes
            .get(&node_id)
            .ok_or(FeatureError::NodeNotFound(node_id))?
            .features
            .get(feature_id)
    }

    /// Look up a feature as its concrete type for an explicit state change
    pub fn feature_mut<T: NodeFeature + 'static>(
        &mut self,
        node_id: NodeId,
        feature_id: &FeatureId,
    ) -> Result<&mut T, FeatureError> {
        self.nodes
            .get_mut(&node_id)
            .ok_or(FeatureError::NodeNotFound(node_id))?
            .features
            .get_as_mut::<T>(feature_id)
    }

    /// Create a group; members leave their previous group.
    ///
    /// Unknown node IDs are ignored. Returns `None` and changes nothing when
    /// no member is left.
    pub fn add_group(&mut self, name: impl Into<String>, members: impl IntoIterator<Item = NodeId>) -> Option<GroupId> {
        let mut group = NodeGroup::new(name);
        for node_id in members {
            if self.nodes.contains_key(&node_id) {
                group.insert(node_id);
            }
        }
        if group.is_empty() {
            return None;
        }

        for member in group.nodes() {
            for other in self.groups.values_mut() {
                other.remove(member);
            }
        }
        self.groups.retain(|_, g| !g.is_empty());

        let id = GroupId::new();
        self.groups.insert(id, group);
        self.push_event(GraphEvent::GroupsChanged);
        Some(id)
    }

    /// Rename a group
    pub fn rename_group(&mut self, group_id: GroupId, name: impl Into<String>) -> bool {
        let Some(group) = self.groups.get_mut(&group_id) else {
            return false;
        };
        group.name = name.into();
        self.push_event(GraphEvent::GroupsChanged);
        true
    }

    /// Move a node into a group, out of any group it was in before
    pub fn add_to_group(&mut self, group_id: GroupId, node_id: NodeId) -> bool {
        if !self.nodes.contains_key(&node_id) || !self.groups.contains_key(&group_id) {
            return false;
        }
        for (id, group) in self.groups.iter_mut() {
            if *id != group_id {
                group.remove(node_id);
            }
        }
        self.groups.retain(|_, g| !g.is_empty());
        if let Some(group) = self.groups.get_mut(&group_id) {
            group.insert(node_id);
        }
        self.push_event(GraphEvent::GroupsChanged);
        true
    }

    /// Take a node out of its group; a group left empty is deleted
    pub fn remove_from_group(&mut self, node_id: NodeId) -> Option<GroupId> {
        let group_id = self.group_of(node_id)?;
        if let Some(group) = self.groups.get_mut(&group_id) {
            group.remove(node_id);
        }
        self.groups.retain(|_, g| !g.is_empty());
        self.push_event(GraphEvent::GroupsChanged);
        Some(group_id)
    }

    /// Remove a group; member nodes stay in the graph
    pub fn remove_group(&mut self, group_id: GroupId) -> Option<NodeGroup> {
        let removed = self.groups.shift_remove(&group_id);
        if removed.is_some() {
            self.push_event(GraphEvent::GroupsChanged);
        }
        removed
    }

    /// Get a group by ID
    pub fn group(&self, group_id: GroupId) -> Option<&NodeGroup> {
        self.groups.get(&group_id)
    }

    /// Get all groups in insertion order
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &NodeGroup)> {
        self.groups.iter().map(|(id, g)| (*id, g))
    }

    /// Group containing a node
    pub fn group_of(&self, node_id: NodeId) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(_, g)| g.contains(node_id))
            .map(|(id, _)| *id)
    }

    /// Get nodes in topological order (for evaluation).
    ///
    /// Ready nodes are taken in insertion order, so the order is stable for
    /// a given graph.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let mut in_degree: HashMap<NodeId, usize> = self.nodes.keys().map(|id| (*id, 0)).collect();
        for c in self.connections.values() {
            if let Some(degree) = in_degree.get_mut(&c.to_node) {
                *degree += 1;
            }
        }

        let mut ready: VecDeque<NodeId> = self
            .nodes
            .keys()
            .filter(|id| in_degree.get(id) == Some(&0))
            .copied()
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node_id) = ready.pop_front() {
            order.push(node_id);
            for c in self.connections.values().filter(|c| c.from_node == node_id) {
                if let Some(degree) = in_degree.get_mut(&c.to_node) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(c.to_node);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(CycleError);
        }
        Ok(order)
    }

    /// Flag values for recalculation and the editor for redraw
    pub fn request_recalculate_and_redraw(&mut self) {
        self.request.recalculate = true;
        self.request.redraw = true;
    }

    /// Flag the editor for redraw only
    pub fn request_redraw(&mut self) {
        self.request.redraw = true;
    }

    /// Current pending requests
    pub fn pending_request(&self) -> UpdateRequest {
        self.request
    }

    /// Consume the redraw request
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.request.redraw)
    }

    pub(crate) fn take_recalculate_request(&mut self) -> bool {
        std::mem::take(&mut self.request.recalculate)
    }

    /// Hand the recorded events to the caller.
    ///
    /// Events accumulate until drained; a host that reacts to changes
    /// should drain once per frame or per edit.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of events waiting to be drained
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn push_event(&mut self, event: GraphEvent) {
        self.request.redraw = true;
        // Back-to-back GroupsChanged carry no extra information
        if event == GraphEvent::GroupsChanged
            && self.events.last() == Some(&GraphEvent::GroupsChanged)
        {
            return;
        }
        self.events.push(event);
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating or removing a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Slot not found
    #[error("Slot not found: {0}")]
    SlotNotFound(SlotId),

    /// The slot's connection mode does not allow another connection
    #[error("Connection mode violation on slot {0}")]
    ConnectionModeViolation(SlotId),

    /// The same two slots are already connected
    #[error("Slots already connected")]
    AlreadyConnected,

    /// The connection would introduce a cycle
    #[error("Connection would create a cycle")]
    CyclicConnection,

    /// Connection not found
    #[error("Connection not found: {0:?}")]
    ConnectionNotFound(ConnectionId),

    /// The two slots are not connected
    #[error("Slots are not connected")]
    NotConnected,
}

/// Error when graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_nodes::{adder, constant};

    fn out(node: NodeId) -> OutputSlotRef {
        OutputSlotRef::new(node, "out")
    }

    fn input(node: NodeId, slot: &str) -> InputSlotRef {
        InputSlotRef::new(node, slot)
    }

    #[test]
    fn test_add_and_remove_nodes() {
        let mut graph = NodeGraph::new("test");
        assert!(graph.is_empty());

        let a = graph.add_node(constant(1)).unwrap();
        let b = graph.add_node(adder()).unwrap();
        graph.connect(&out(a), &input(b, "a")).unwrap();
        assert!(graph.contains(a));
        assert_eq!(graph.node_count(), 2);

        let removed = graph.remove_node(a).unwrap();
        assert_eq!(removed.id(), a);
        assert!(!graph.contains(a));
        assert_eq!(graph.connection_count(), 0);
        assert!(graph.remove_node(a).is_none());
    }

    #[test]
    fn test_single_input_rejects_second_source() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let b = graph.add_node(constant(2)).unwrap();
        let sum = graph.add_node(adder()).unwrap();

        let first = graph.connect(&out(a), &input(sum, "a")).unwrap();
        let second = graph.connect(&out(b), &input(sum, "a"));
        assert!(matches!(second, Err(ConnectionError::ConnectionModeViolation(_))));
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.connection(first).is_some());
        assert!(graph.has_connection(&out(a), &input(sum, "a")));
    }

    #[derive(Debug, Clone)]
    struct Exclusive;

    impl NodeBehavior for Exclusive {
        fn type_tag(&self) -> &'static str {
            "exclusive"
        }

        fn initialize(&self, builder: &mut crate::node::NodeBuilder) {
            builder.output(crate::slot::OutputSlot::new("out", "Out").single());
        }

        fn calculate(
            &self,
            _inputs: &crate::evaluation::SlotValues,
            _ctx: &mut crate::evaluation::EvaluationContext,
        ) -> Result<NodeValue, crate::evaluation::CalculationError> {
            Ok(None)
        }

        fn clone_box(&self) -> Box<dyn NodeBehavior> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_single_output_rejects_second_target() {
        let mut graph = NodeGraph::default();
        let source = graph.add_node(Box::new(Exclusive)).unwrap();
        let sum = graph.add_node(adder()).unwrap();
        graph.connect(&out(source), &input(sum, "a")).unwrap();

        let second = graph.connect(&out(source), &input(sum, "b"));
        assert!(matches!(second, Err(ConnectionError::ConnectionModeViolation(slot)) if slot.as_str() == "out"));
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_duplicate_connection_rejected() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let sum = graph.add_node(adder()).unwrap();
        graph.connect(&out(a), &input(sum, "a")).unwrap();
        let again = graph.connect(&out(a), &input(sum, "a"));
        assert!(matches!(again, Err(ConnectionError::AlreadyConnected)));
    }

    #[test]
    fn test_cycles_rejected_at_connect_time() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(adder()).unwrap();
        let b = graph.add_node(adder()).unwrap();
        let c = graph.add_node(adder()).unwrap();
        graph.connect(&out(a), &input(b, "a")).unwrap();
        graph.connect(&out(b), &input(c, "a")).unwrap();

        let cycle = graph.connect(&out(c), &input(a, "a"));
        assert!(matches!(cycle, Err(ConnectionError::CyclicConnection)));
        let self_loop = graph.connect(&out(a), &input(a, "b"));
        assert!(matches!(self_loop, Err(ConnectionError::CyclicConnection)));
        assert_eq!(graph.connection_count(), 2);
        assert!(graph.topological_order().is_ok());
    }

    #[test]
    fn test_unknown_slot() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let sum = graph.add_node(adder()).unwrap();
        let result = graph.connect(&out(a), &input(sum, "missing"));
        assert!(matches!(result, Err(ConnectionError::SlotNotFound(_))));
        let result = graph.connect(&OutputSlotRef::new(a, "nope"), &input(sum, "a"));
        assert!(matches!(result, Err(ConnectionError::SlotNotFound(_))));
    }

    #[test]
    fn test_topological_order_respects_dependencies() {
        let mut graph = NodeGraph::default();
        // Insert the consumer first so insertion order disagrees with dependency order
        let sink = graph.add_node(adder()).unwrap();
        let mid = graph.add_node(adder()).unwrap();
        let source = graph.add_node(constant(3)).unwrap();
        graph.connect(&out(mid), &input(sink, "a")).unwrap();
        graph.connect(&out(source), &input(mid, "a")).unwrap();

        let order = graph.topological_order().unwrap();
        let pos = |id| order.iter().position(|n| *n == id).unwrap();
        assert!(pos(source) < pos(mid));
        assert!(pos(mid) < pos(sink));
    }

    #[test]
    fn test_connect_marks_dependents_dirty() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let b = graph.add_node(adder()).unwrap();
        let c = graph.add_node(adder()).unwrap();
        graph.connect(&out(b), &input(c, "a")).unwrap();
        graph.dirty.clear();

        graph.connect(&out(a), &input(b, "a")).unwrap();
        assert!(!graph.is_dirty(a));
        assert!(graph.is_dirty(b));
        assert!(graph.is_dirty(c));
    }

    #[test]
    fn test_disconnect_variants() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let b = graph.add_node(adder()).unwrap();
        graph.connect(&out(a), &input(b, "a")).unwrap();
        graph.connect(&out(a), &input(b, "b")).unwrap();
        assert_eq!(graph.output_nodes(a), vec![b]);
        assert_eq!(graph.input_nodes(b), vec![a]);

        graph.disconnect_slots(&out(a), &input(b, "a")).unwrap();
        assert!(matches!(
            graph.disconnect_slots(&out(a), &input(b, "a")),
            Err(ConnectionError::NotConnected)
        ));
        assert_eq!(graph.disconnect_output_slot(&out(a)), 1);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_disconnect_marks_dependents_dirty() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let b = graph.add_node(adder()).unwrap();
        let c = graph.add_node(adder()).unwrap();
        let d = graph.add_node(adder()).unwrap();
        let ab = graph.connect(&out(a), &input(b, "a")).unwrap();
        graph.connect(&out(b), &input(c, "a")).unwrap();
        graph.connect(&out(a), &input(d, "a")).unwrap();
        graph.connect(&out(a), &input(d, "b")).unwrap();

        graph.dirty.clear();
        graph.disconnect(ab).unwrap();
        assert!(!graph.is_dirty(a));
        assert!(graph.is_dirty(b));
        assert!(graph.is_dirty(c));
        assert!(!graph.is_dirty(d));

        graph.dirty.clear();
        assert_eq!(graph.disconnect_input_slot(&input(c, "a")), 1);
        assert!(!graph.is_dirty(b));
        assert!(graph.is_dirty(c));

        graph.dirty.clear();
        graph.disconnect_slots(&out(a), &input(d, "b")).unwrap();
        assert!(graph.is_dirty(d));
        assert!(!graph.is_dirty(a));

        graph.dirty.clear();
        assert_eq!(graph.disconnect_output_slot(&out(a)), 1);
        assert!(graph.is_dirty(d));
        assert_eq!(graph.dirty_count(), 1);
    }

    #[test]
    fn test_groups_follow_node_removal() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let b = graph.add_node(constant(2)).unwrap();
        let first = graph.add_group("First", [a, b]).unwrap();
        let second = graph.add_group("Second", [b]).unwrap();

        assert_eq!(graph.group_of(b), Some(second));
        assert_eq!(graph.group(first).unwrap().len(), 1);

        graph.remove_node(a);
        assert!(graph.group(first).is_none());
        assert_eq!(graph.groups().count(), 1);
    }

    #[test]
    fn test_empty_group_not_created() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let stale = graph.add_node(constant(2)).unwrap();
        graph.remove_node(stale);
        let existing = graph.add_group("Existing", [a]).unwrap();
        graph.drain_events();

        assert!(graph.add_group("Empty", Vec::<NodeId>::new()).is_none());
        assert!(graph.add_group("Stale", [stale]).is_none());
        assert_eq!(graph.groups().count(), 1);
        assert_eq!(graph.group_of(a), Some(existing));
        assert!(graph.drain_events().is_empty());
    }

    #[test]
    fn test_edit_group_after_creation() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let b = graph.add_node(constant(2)).unwrap();
        let left = graph.add_group("Left", [a]).unwrap();
        let right = graph.add_group("Right", [b]).unwrap();
        graph.drain_events();

        assert!(graph.rename_group(left, "Inputs"));
        assert_eq!(graph.group(left).unwrap().name, "Inputs");
        assert_eq!(graph.drain_events(), vec![GraphEvent::GroupsChanged]);

        // Moving the only member out deletes the source group
        assert!(graph.add_to_group(left, b));
        assert!(graph.group(right).is_none());
        assert_eq!(graph.group(left).unwrap().nodes().collect::<Vec<_>>(), vec![a, b]);

        assert_eq!(graph.remove_from_group(a), Some(left));
        assert_eq!(graph.group_of(a), None);
        assert_eq!(graph.remove_from_group(b), Some(left));
        assert!(graph.group(left).is_none());
        assert_eq!(graph.remove_from_group(b), None);

        assert!(!graph.rename_group(left, "Gone"));
        assert!(!graph.add_to_group(right, a));
    }

    #[test]
    fn test_repeated_group_events_coalesce() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        let group = graph.add_group("G", [a]).unwrap();
        graph.rename_group(group, "H");
        graph.rename_group(group, "I");
        assert_eq!(graph.pending_event_count(), 2);
        assert_eq!(
            graph.drain_events(),
            vec![GraphEvent::NodeAdded(a), GraphEvent::GroupsChanged]
        );
        assert_eq!(graph.pending_event_count(), 0);
    }

    #[test]
    fn test_events_and_requests() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node(constant(1)).unwrap();
        assert!(graph.take_redraw_request());
        assert!(!graph.take_redraw_request());

        let events = graph.drain_events();
        assert_eq!(events, vec![GraphEvent::NodeAdded(a)]);
        assert!(graph.drain_events().is_empty());
    }

    #[test]
    fn test_set_input_default() {
        let mut graph = NodeGraph::default();
        let sum = graph.add_node(adder()).unwrap();
        graph.dirty.clear();

        graph
            .set_input_default(&input(sum, "a"), Some(crate::value::Value::Int(7)))
            .unwrap();
        assert!(graph.is_dirty(sum));
        let missing = graph.set_input_default(&input(sum, "zzz"), None);
        assert!(matches!(missing, Err(NodeError::SlotNotFound(_))));
    }
}
