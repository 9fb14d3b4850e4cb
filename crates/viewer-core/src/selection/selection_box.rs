//! Rectangle query in normalized device coordinates.

use glam::Vec3;

use crate::context::ViewerContext;
use crate::scene::NodeId;

/// Depth used for the drag corners
pub const BOX_DEPTH: f32 = 0.5;

/// Finds the meshes whose projected bounds center lies inside a NDC rectangle
#[derive(Debug, Clone, Default)]
pub struct SelectionBox {
    pub start_point: Vec3,
    pub end_point: Vec3,
    /// Result of the last [`SelectionBox::select`]
    pub collection: Vec<NodeId>,
}

impl SelectionBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when start and end do not span an area
    pub fn is_degenerate(&self) -> bool {
        self.start_point.x == self.end_point.x || self.start_point.y == self.end_point.y
    }

    /// Rebuild `collection` from the current rectangle.
    ///
    /// A mesh is contained when the world-space center of its geometry bounds
    /// projects inside the rectangle and between the near and far planes.
    /// Hidden meshes and meshes without a material are ignored.
    pub fn select(&mut self, ctx: &ViewerContext) -> &[NodeId] {
        self.collection.clear();
        if self.is_degenerate() || ctx.canvas.is_degenerate() {
            return &self.collection;
        }

        let min_x = self.start_point.x.min(self.end_point.x);
        let max_x = self.start_point.x.max(self.end_point.x);
        let min_y = self.start_point.y.min(self.end_point.y);
        let max_y = self.start_point.y.max(self.end_point.y);
        let aspect = ctx.aspect();

        for id in ctx.scene.mesh_nodes() {
            let Some(node) = ctx.scene.get(id) else {
                continue;
            };
            if !node.visible || node.material().is_none() {
                continue;
            }
            let Some(geometry) = node.geometry() else {
                continue;
            };

            let center = ctx
                .scene
                .world_matrix(id)
                .transform_point3(geometry.bounding_center());
            let Some(ndc) = ctx.camera.project_to_ndc(center, aspect) else {
                continue;
            };

            let inside = (min_x..=max_x).contains(&ndc.x)
                && (min_y..=max_y).contains(&ndc.y)
                && (-1.0..=1.0).contains(&ndc.z);
            if inside {
                self.collection.push(id);
            }
        }

        &self.collection
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared::{CanvasRect, Color};

    use super::*;
    use crate::scene::{cuboid, Material, Node};

    fn ctx_with_boxes() -> (ViewerContext, NodeId, NodeId) {
        let mut ctx = ViewerContext::default();
        ctx.canvas = CanvasRect::new(0.0, 0.0, 800.0, 800.0);
        let root = ctx.scene.root();
        let geom = Arc::new(cuboid(1.0, 1.0, 1.0));
        let mat = Arc::new(Material::standard(Color::WHITE));
        let left = ctx.scene.add_node(
            root,
            Node::mesh("left", geom.clone(), Some(mat.clone())).with_translation(Vec3::new(-2.0, 0.0, 0.0)),
        );
        let right = ctx.scene.add_node(
            root,
            Node::mesh("right", geom, Some(mat)).with_translation(Vec3::new(2.0, 0.0, 0.0)),
        );
        (ctx, left, right)
    }

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> SelectionBox {
        SelectionBox {
            start_point: Vec3::new(x0, y0, BOX_DEPTH),
            end_point: Vec3::new(x1, y1, BOX_DEPTH),
            collection: Vec::new(),
        }
    }

    #[test]
    fn test_left_half_selects_left_box() {
        let (ctx, left, _) = ctx_with_boxes();
        let mut sb = rect(-1.0, 1.0, 0.0, -1.0);
        assert_eq!(sb.select(&ctx), &[left]);
    }

    #[test]
    fn test_reversed_corners_select_the_same() {
        let (ctx, left, right) = ctx_with_boxes();
        let mut sb = rect(1.0, -1.0, -1.0, 1.0);
        assert_eq!(sb.select(&ctx), &[left, right]);
    }

    #[test]
    fn test_degenerate_rect_selects_nothing() {
        let (ctx, ..) = ctx_with_boxes();
        let mut sb = rect(0.3, 0.3, 0.3, 0.3);
        assert!(sb.select(&ctx).is_empty());
    }

    #[test]
    fn test_select_replaces_previous_collection() {
        let (ctx, left, right) = ctx_with_boxes();
        let mut sb = rect(-1.0, 1.0, 1.0, -1.0);
        sb.select(&ctx);
        sb.end_point = Vec3::new(0.0, -1.0, BOX_DEPTH);
        assert_eq!(sb.select(&ctx), &[left]);
        assert!(!sb.collection.contains(&right));
    }
}
