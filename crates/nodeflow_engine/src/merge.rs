// SPDX-License-Identifier: MIT OR Apache-2.0
//! Merging a filtered subgraph into another graph.

use crate::connection::Connection;
use crate::filter::NodeFilter;
use crate::graph::{GraphEvent, NodeGraph};
use crate::group::{GroupId, NodeGroup};
use crate::node::{Node, NodeId};
use crate::slot::{InputSlotRef, OutputSlotRef};
use indexmap::IndexMap;

/// Outcome of a successful merge
#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    /// Source ID to new target ID, in source insertion order
    pub id_map: IndexMap<NodeId, NodeId>,
    /// Number of connections copied
    pub connection_count: usize,
}

impl MergeResult {
    /// New node IDs in the target
    pub fn new_node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.id_map.values().copied()
    }

    /// Target ID of a copied source node
    pub fn mapped(&self, source_id: NodeId) -> Option<NodeId> {
        self.id_map.get(&source_id).copied()
    }
}

impl NodeGraph {
    /// Copy the filtered nodes into `target` under fresh IDs.
    ///
    /// Connections with both ends inside the selection are remapped; those
    /// crossing the selection boundary are dropped. Groups are copied with
    /// the selected members only. Nothing is written to `target` when the
    /// selection is empty.
    pub fn merge_to(&self, target: &mut NodeGraph, filter: &dyn NodeFilter) -> Result<MergeResult, MergeError> {
        let mut id_map = IndexMap::new();
        let mut new_nodes: Vec<Node> = Vec::new();
        for node in self.nodes.values() {
            if !filter.need_to_process_node(node.id) {
                continue;
            }
            let copy = node.duplicate();
            id_map.insert(node.id, copy.id);
            new_nodes.push(copy);
        }

        if new_nodes.is_empty() {
            return Err(MergeError::EmptyMergeSet);
        }

        let new_connections: Vec<Connection> = self
            .connections
            .values()
            .filter_map(|c| {
                let from = *id_map.get(&c.from_node)?;
                let to = *id_map.get(&c.to_node)?;
                Some(Connection::new(
                    &OutputSlotRef::new(from, c.from_slot.clone()),
                    &InputSlotRef::new(to, c.to_slot.clone()),
                ))
            })
            .collect();

        let new_groups: Vec<NodeGroup> = self
            .groups
            .values()
            .filter_map(|group| {
                let mut copy = NodeGroup::new(group.name.clone());
                for member in group.nodes() {
                    if let Some(new_id) = id_map.get(&member) {
                        copy.insert(*new_id);
                    }
                }
                (!copy.is_empty()).then_some(copy)
            })
            .collect();

        let connection_count = new_connections.len();
        for node in new_nodes {
            target.insert_node(node);
        }
        for connection in new_connections {
            let id = connection.id;
            target.connections.insert(id, connection);
            target.push_event(GraphEvent::Connected(id));
        }
        if !new_groups.is_empty() {
            for group in new_groups {
                target.groups.insert(GroupId::new(), group);
            }
            target.push_event(GraphEvent::GroupsChanged);
        }
        target.request_recalculate_and_redraw();

        tracing::debug!(
            "Merged {} node(s) and {} connection(s) from '{}' into '{}'",
            id_map.len(),
            connection_count,
            self.name,
            target.name
        );

        Ok(MergeResult {
            id_map,
            connection_count,
        })
    }
}

/// Error when merging graphs
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The filter selected no nodes
    #[error("No nodes selected for merge")]
    EmptyMergeSet,
}
