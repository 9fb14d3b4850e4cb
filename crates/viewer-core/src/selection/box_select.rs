use glam::{Vec2, Vec3};
use shared::{BoxSelectionReport, Color, PointerButton};

use super::selection_box::{SelectionBox, BOX_DEPTH};
use crate::context::ViewerContext;
use crate::scene::{emissive_copy, NodeId};

/// Drag-rectangle selection mode.
///
/// Every move and release clears the previous highlight before applying the
/// new one, so intermediate rectangles never leave stale highlights behind.
#[derive(Debug, Clone)]
pub struct BoxSelection {
    active: bool,
    dragging: bool,
    selection_box: SelectionBox,
    highlight: Color,
    /// Drag corners in screen pixels, for the rectangle overlay
    screen_start: Vec2,
    screen_end: Vec2,
}

impl BoxSelection {
    pub fn new(highlight: Color) -> Self {
        Self {
            active: false,
            dragging: false,
            selection_box: SelectionBox::new(),
            highlight,
            screen_start: Vec2::ZERO,
            screen_end: Vec2::ZERO,
        }
    }

    pub fn set_highlight(&mut self, color: Color) {
        self.highlight = color;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Nodes currently highlighted by the box
    pub fn selected(&self) -> &[NodeId] {
        &self.selection_box.collection
    }

    /// Drag rectangle in screen pixels while dragging
    pub fn drag_rect(&self) -> Option<(Vec2, Vec2)> {
        self.dragging.then_some((self.screen_start, self.screen_end))
    }

    /// Enter box mode. Camera rotation is switched off until [`BoxSelection::stop`].
    pub fn start(&mut self, ctx: &mut ViewerContext) {
        self.active = true;
        self.dragging = false;
        ctx.controls.rotate_enabled = false;
        tracing::debug!("Box selection started");
    }

    /// Leave box mode: rotation back on, highlights cleared.
    /// Safe to call at any time, any number of times.
    pub fn stop(&mut self, ctx: &mut ViewerContext) {
        self.clear_collection(ctx);
        self.active = false;
        self.dragging = false;
        ctx.controls.rotate_enabled = true;
    }

    pub fn on_pointer_down(&mut self, ctx: &mut ViewerContext, x: f32, y: f32, button: PointerButton) {
        if !self.active {
            return;
        }
        if button != PointerButton::Primary {
            self.dragging = false;
            return;
        }
        let Some(ndc) = ctx.to_ndc(x, y) else {
            return;
        };

        self.clear_collection(ctx);
        self.selection_box.start_point = Vec3::new(ndc.x, ndc.y, BOX_DEPTH);
        self.selection_box.end_point = self.selection_box.start_point;
        self.screen_start = Vec2::new(x, y);
        self.screen_end = self.screen_start;
        self.dragging = true;
    }

    /// Drag update; ignored unless the primary button is still held
    pub fn on_pointer_move(&mut self, ctx: &mut ViewerContext, x: f32, y: f32, primary_down: bool) {
        if !self.active || !self.dragging || !primary_down {
            return;
        }
        self.update_selection(ctx, x, y);
    }

    /// Finish the drag and report the final selection.
    /// Only the primary button ends a drag.
    pub fn on_pointer_up(
        &mut self,
        ctx: &mut ViewerContext,
        x: f32,
        y: f32,
        button: PointerButton,
    ) -> Option<BoxSelectionReport> {
        if !self.active || !self.dragging || button != PointerButton::Primary {
            return None;
        }
        self.update_selection(ctx, x, y);
        self.dragging = false;

        let mut report = BoxSelectionReport::default();
        for id in &self.selection_box.collection {
            let Some(node) = ctx.scene.get(*id) else {
                continue;
            };
            report.names.push(node.name.clone());
            if let Some(element_id) = &node.user_data.element_id {
                report.element_ids.push(element_id.clone());
            }
        }

        tracing::info!(
            "Box selection: {} meshes, element ids {:?}",
            report.names.len(),
            report.element_ids
        );
        Some(report)
    }

    /// Set the emissive color of every collected node back to black and
    /// empty the collection
    pub fn clear_collection(&mut self, ctx: &mut ViewerContext) {
        self.paint(ctx, Color::BLACK);
        self.selection_box.collection.clear();
    }

    fn update_selection(&mut self, ctx: &mut ViewerContext, x: f32, y: f32) {
        let Some(ndc) = ctx.to_ndc(x, y) else {
            return;
        };

        self.clear_collection(ctx);
        self.selection_box.end_point = Vec3::new(ndc.x, ndc.y, BOX_DEPTH);
        self.screen_end = Vec2::new(x, y);
        self.selection_box.select(ctx);
        self.paint(ctx, self.highlight);
    }

    fn paint(&self, ctx: &mut ViewerContext, color: Color) {
        for id in &self.selection_box.collection {
            let Some(current) = ctx.scene.get(*id).and_then(|n| n.material()).cloned() else {
                continue;
            };
            if let Some(copy) = emissive_copy(&current, color) {
                ctx.scene.set_material(*id, Some(copy));
            }
        }
    }
}

impl Default for BoxSelection {
    fn default() -> Self {
        Self::new(Color::BOX_HIGHLIGHT)
    }
}
