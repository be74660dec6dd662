// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read-only editor snapshot for renderers and tooling.
//!
//! A [`NodeEditorInfo`] is rebuilt from the live graph on every call and
//! never patched; consumers only read it.

use crate::geometry::EditorGeometry;
use crate::graph::NodeGraph;
use crate::node::NodeId;
use crate::slot::SlotId;
use egui::Rect;
use serde::{Deserialize, Serialize};

/// Canvas size
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasInfo {
    /// Width in screen space
    pub width: f32,
    /// Height in screen space
    pub height: f32,
}

/// One slot of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotInfo {
    /// Slot ID
    pub id: SlotId,
    /// Display name
    pub name: String,
    /// Rectangle in model space
    pub model_rect: Rect,
    /// Rectangle in screen space
    pub screen_rect: Rect,
}

/// One node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Node ID
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Rectangle in model space
    pub model_rect: Rect,
    /// Rectangle in screen space
    pub screen_rect: Rect,
    /// Input slots in declaration order
    pub input_slots: Vec<SlotInfo>,
    /// Output slots in declaration order
    pub output_slots: Vec<SlotInfo>,
}

/// One node group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Display name
    pub name: String,
    /// Frame in model space
    pub model_rect: Rect,
    /// Frame in screen space
    pub screen_rect: Rect,
    /// Member nodes
    pub nodes_in_group: Vec<NodeId>,
}

/// One connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Source node
    pub from_node_id: NodeId,
    /// Source output slot
    pub from_slot_id: SlotId,
    /// Target node
    pub to_node_id: NodeId,
    /// Target input slot
    pub to_slot_id: SlotId,
}

/// Snapshot of the whole editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeEditorInfo {
    /// Canvas
    pub canvas: CanvasInfo,
    /// Nodes in graph order
    pub nodes: Vec<NodeInfo>,
    /// Groups in graph order
    pub groups: Vec<GroupInfo>,
    /// Connections in graph order
    pub connections: Vec<ConnectionInfo>,
}

impl NodeEditorInfo {
    /// Build a fresh snapshot of `graph` using `geometry`
    pub fn build(graph: &NodeGraph, geometry: &dyn EditorGeometry) -> Self {
        let canvas_size = geometry.canvas_size();
        let canvas = CanvasInfo {
            width: canvas_size.x,
            height: canvas_size.y,
        };

        let nodes = graph
            .nodes()
            .map(|node| {
                let model_rect = geometry.node_rect(node);
                let input_slots = node
                    .inputs()
                    .enumerate()
                    .map(|(index, slot)| {
                        let rect = geometry.input_slot_rect(node, index);
                        SlotInfo {
                            id: slot.id.clone(),
                            name: slot.name.clone(),
                            model_rect: rect,
                            screen_rect: geometry.model_to_screen(rect),
                        }
                    })
                    .collect();
                let output_slots = node
                    .outputs()
                    .enumerate()
                    .map(|(index, slot)| {
                        let rect = geometry.output_slot_rect(node, index);
                        SlotInfo {
                            id: slot.id.clone(),
                            name: slot.name.clone(),
                            model_rect: rect,
                            screen_rect: geometry.model_to_screen(rect),
                        }
                    })
                    .collect();

                NodeInfo {
                    id: node.id(),
                    name: node.name.clone(),
                    model_rect,
                    screen_rect: geometry.model_to_screen(model_rect),
                    input_slots,
                    output_slots,
                }
            })
            .collect();

        let groups = graph
            .groups()
            .filter_map(|(_, group)| {
                let member_rects: Vec<Rect> = group
                    .nodes()
                    .filter_map(|id| graph.node(id))
                    .map(|node| geometry.node_rect(node))
                    .collect();
                let model_rect = geometry.group_rect(&member_rects)?;
                Some(GroupInfo {
                    name: group.name.clone(),
                    model_rect,
                    screen_rect: geometry.model_to_screen(model_rect),
                    nodes_in_group: group.nodes().collect(),
                })
            })
            .collect();

        let connections = graph
            .connections()
            .map(|c| ConnectionInfo {
                from_node_id: c.from_node,
                from_slot_id: c.from_slot.clone(),
                to_node_id: c.to_node,
                to_slot_id: c.to_slot.clone(),
            })
            .collect();

        Self {
            canvas,
            nodes,
            groups,
            connections,
        }
    }

    /// Find a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&NodeInfo> {
        self.nodes.iter().find(|n| n.id == node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SkinParams;
    use crate::geometry::{LayoutGeometry, ViewBox};
    use crate::slot::{InputSlotRef, OutputSlotRef};
    use crate::test_nodes::{adder, constant};
    use egui::{pos2, vec2};

    #[test]
    fn test_snapshot_reflects_graph() {
        let mut graph = NodeGraph::default();
        let a = graph.add_node_at(constant(1), "One", [0.0, 0.0]).unwrap();
        let sum = graph.add_node_at(adder(), "Sum", [300.0, 0.0]).unwrap();
        graph.connect(&OutputSlotRef::new(a, "out"), &InputSlotRef::new(sum, "b")).unwrap();
        graph.add_group("Pair", [a, sum]);

        let layout = LayoutGeometry::new(SkinParams::default(), ViewBox::new([10.0, 10.0], 2.0), vec2(640.0, 480.0));
        let info = NodeEditorInfo::build(&graph, &layout);

        assert_eq!(info.canvas, CanvasInfo { width: 640.0, height: 480.0 });
        assert_eq!(info.nodes.len(), 2);
        assert_eq!(info.connections.len(), 1);
        assert_eq!(info.groups.len(), 1);

        let sum_info = info.node(sum).unwrap();
        assert_eq!(sum_info.name, "Sum");
        assert_eq!(sum_info.input_slots.len(), 2);
        assert_eq!(sum_info.input_slots[1].name, "Second Input");
        assert_eq!(sum_info.model_rect.min, pos2(300.0, 0.0));
        assert_eq!(sum_info.screen_rect.min, pos2(610.0, 10.0));
        assert!(sum_info.model_rect.contains_rect(sum_info.output_slots[0].model_rect));

        let group = &info.groups[0];
        assert_eq!(group.nodes_in_group, vec![a, sum]);
        assert!(group.model_rect.contains_rect(sum_info.model_rect));

        assert_eq!(info.connections[0].from_node_id, a);
        assert_eq!(info.connections[0].to_slot_id, SlotId::from("b"));
    }

    #[test]
    fn test_snapshot_is_rebuilt() {
        let mut graph = NodeGraph::default();
        let layout = LayoutGeometry::default();
        let empty = NodeEditorInfo::build(&graph, &layout);
        assert!(empty.nodes.is_empty());

        graph.add_node(constant(1)).unwrap();
        let info = NodeEditorInfo::build(&graph, &layout);
        assert_eq!(info.nodes.len(), 1);
        assert!(empty.nodes.is_empty());
    }
}
