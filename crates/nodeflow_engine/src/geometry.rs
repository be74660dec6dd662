// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model/screen geometry of nodes, slots and groups.

use crate::config::SkinParams;
use crate::node::Node;
use egui::{pos2, vec2, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Geometry provider consumed by the editor info snapshot.
///
/// All methods are pure queries.
pub trait EditorGeometry {
    /// Size of the drawing area in screen space
    fn canvas_size(&self) -> Vec2;

    /// Node rectangle in model space
    fn node_rect(&self, node: &Node) -> Rect;

    /// Rectangle of the input slot at `index` in model space
    fn input_slot_rect(&self, node: &Node, index: usize) -> Rect;

    /// Rectangle of the output slot at `index` in model space
    fn output_slot_rect(&self, node: &Node, index: usize) -> Rect;

    /// Frame around the given member rectangles in model space
    fn group_rect(&self, member_rects: &[Rect]) -> Option<Rect>;

    /// Transform a model-space rectangle to screen space
    fn model_to_screen(&self, rect: Rect) -> Rect;
}

/// View transform: `screen = model * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    /// Screen-space offset of the model origin
    pub offset: [f32; 2],
    /// Zoom factor
    pub scale: f32,
}

impl ViewBox {
    /// Create a view box
    pub fn new(offset: [f32; 2], scale: f32) -> Self {
        Self { offset, scale }
    }

    /// Convert model position to screen position
    pub fn model_to_screen(&self, model_pos: Pos2) -> Pos2 {
        pos2(
            model_pos.x * self.scale + self.offset[0],
            model_pos.y * self.scale + self.offset[1],
        )
    }

    /// Convert screen position to model position
    pub fn screen_to_model(&self, screen_pos: Pos2) -> Pos2 {
        pos2(
            (screen_pos.x - self.offset[0]) / self.scale,
            (screen_pos.y - self.offset[1]) / self.scale,
        )
    }

    /// Convert a model rectangle to screen space
    pub fn model_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.model_to_screen(rect.min), self.model_to_screen(rect.max))
    }
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::new([0.0, 0.0], 1.0)
    }
}

/// Default geometry: fixed-width nodes laid out from [`SkinParams`]
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGeometry {
    /// Skin parameters
    pub skin: SkinParams,
    /// View transform
    pub view: ViewBox,
    /// Canvas size in screen space
    pub canvas: Vec2,
}

impl LayoutGeometry {
    /// Create a layout
    pub fn new(skin: SkinParams, view: ViewBox, canvas: Vec2) -> Self {
        Self { skin, view, canvas }
    }

    fn slot_row_top(&self, node_rect: Rect, index: usize) -> f32 {
        node_rect.min.y + self.skin.header_height + index as f32 * self.skin.slot_height
    }
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        Self::new(SkinParams::default(), ViewBox::default(), vec2(800.0, 600.0))
    }
}

impl EditorGeometry for LayoutGeometry {
    fn canvas_size(&self) -> Vec2 {
        self.canvas
    }

    fn node_rect(&self, node: &Node) -> Rect {
        let rows = node.inputs().count().max(node.outputs().count());
        let height = self.skin.header_height + rows as f32 * self.skin.slot_height + self.skin.node_padding;
        Rect::from_min_size(
            pos2(node.position[0], node.position[1]),
            vec2(self.skin.node_width, height),
        )
    }

    fn input_slot_rect(&self, node: &Node, index: usize) -> Rect {
        let node_rect = self.node_rect(node);
        Rect::from_min_size(
            pos2(node_rect.min.x, self.slot_row_top(node_rect, index)),
            vec2(node_rect.width() / 2.0, self.skin.slot_height),
        )
    }

    fn output_slot_rect(&self, node: &Node, index: usize) -> Rect {
        let node_rect = self.node_rect(node);
        Rect::from_min_size(
            pos2(node_rect.center().x, self.slot_row_top(node_rect, index)),
            vec2(node_rect.width() / 2.0, self.skin.slot_height),
        )
    }

    fn group_rect(&self, member_rects: &[Rect]) -> Option<Rect> {
        let bounds = member_rects.iter().copied().reduce(|a, b| a.union(b))?;
        Some(bounds.expand(self.skin.group_padding))
    }

    fn model_to_screen(&self, rect: Rect) -> Rect {
        self.view.model_rect_to_screen(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_box_round_trip_point() {
        let view = ViewBox::new([10.0, -20.0], 2.0);
        let screen = view.model_to_screen(pos2(5.0, 5.0));
        assert_eq!(screen, pos2(20.0, -10.0));
        assert_eq!(view.screen_to_model(screen), pos2(5.0, 5.0));
    }

    #[test]
    fn test_group_rect_covers_members() {
        let layout = LayoutGeometry::default();
        let a = Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 10.0));
        let b = Rect::from_min_size(pos2(50.0, 20.0), vec2(10.0, 10.0));
        let frame = layout.group_rect(&[a, b]).unwrap();
        assert!(frame.contains_rect(a));
        assert!(frame.contains_rect(b));
        assert!(layout.group_rect(&[]).is_none());
    }
}
