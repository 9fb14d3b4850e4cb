//! 3D viewport panel with OpenGL rendering

mod gl_renderer;
pub use model_viewer_lib::viewport::mesh;
mod overlays;

use std::sync::{Arc, Mutex};

use egui::Ui;
use shared::{CanvasRect, PointerButton, PointerEvent};
use viewer_core::PointerOutcome;

use crate::i18n::t;
use crate::state::AppState;
use gl_renderer::{GlRenderer, RenderParams};

/// Scroll points → zoom units
const SCROLL_ZOOM_SCALE: f32 = 0.1;

/// 3D viewport panel with OpenGL rendering
pub struct ViewportPanel {
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    /// A primary press started inside the viewport and has not been released
    pointer_captured: bool,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            gl_renderer: None,
            pointer_captured: false,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("GL renderer unavailable: {e}"),
        }
    }

    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) = ui.allocate_exact_size(
            ui.available_size(),
            egui::Sense::click_and_drag(),
        );

        state.viewer.set_canvas(CanvasRect::new(
            rect.left(),
            rect.top(),
            rect.width(),
            rect.height(),
        ));

        // ── Pointer events → selection trackers ──────────────
        self.forward_pointer(ui, &response, state);

        // ── Camera controls ──────────────────────────────
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            // no-op while box selection has rotation switched off
            let delta = response.drag_delta();
            state.viewer.orbit(delta.x, delta.y);
        }
        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            state.viewer.pan(delta.x, delta.y);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                state.viewer.zoom(scroll * SCROLL_ZOOM_SCALE);
            }
        }

        // ── Auto-rotation ────────────────────────────────
        state.viewer.update();

        if !ui.is_rect_visible(rect) {
            return;
        }

        self.render_gl(ui, rect, state);
        self.draw_overlays(ui, rect, state);
    }

    fn forward_pointer(&mut self, ui: &Ui, response: &egui::Response, state: &mut AppState) {
        let (pos, primary_pressed, secondary_pressed, primary_down, primary_released, moved) =
            ui.input(|i| {
                (
                    i.pointer.latest_pos(),
                    i.pointer.button_pressed(egui::PointerButton::Primary),
                    i.pointer.button_pressed(egui::PointerButton::Secondary),
                    i.pointer.primary_down(),
                    i.pointer.primary_released(),
                    i.pointer.delta() != egui::Vec2::ZERO,
                )
            });
        let Some(pos) = pos else {
            return;
        };

        let mut outcomes = Vec::new();
        if response.hovered() {
            if primary_pressed {
                self.pointer_captured = true;
                outcomes.push(state.viewer.handle_pointer(PointerEvent::down(
                    pos.x,
                    pos.y,
                    PointerButton::Primary,
                )));
            }
            if secondary_pressed {
                outcomes.push(state.viewer.handle_pointer(PointerEvent::down(
                    pos.x,
                    pos.y,
                    PointerButton::Secondary,
                )));
            }
        }
        if self.pointer_captured && moved {
            outcomes.push(
                state
                    .viewer
                    .handle_pointer(PointerEvent::moved(pos.x, pos.y, primary_down)),
            );
        }
        if self.pointer_captured && primary_released {
            self.pointer_captured = false;
            outcomes.push(state.viewer.handle_pointer(PointerEvent::up(
                pos.x,
                pos.y,
                PointerButton::Primary,
            )));
        }

        for outcome in outcomes {
            match outcome {
                PointerOutcome::Ignored => {}
                PointerOutcome::Picked(element_id) => state.last_pick = element_id,
                PointerOutcome::BoxSelected(report) => state.last_box = Some(report),
            }
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect, state: &AppState) {
        let ctx = state.viewer.context();
        let background = ctx.background.to_rgb_f32();

        let Some(gl_renderer) = &self.gl_renderer else {
            // No GL context: plain background, overlays still work
            let [r, g, b] = background.map(|c| (c * 255.0) as u8);
            ui.painter()
                .rect_filled(rect, 0.0, egui::Color32::from_rgb(r, g, b));
            return;
        };

        let renderer = gl_renderer.clone();
        let items = mesh::draw_list(&ctx.scene);
        let view_projection = ctx.camera.view_projection(ctx.aspect());
        let eye = ctx.camera.eye_position();
        let lighting = ctx.lighting;

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(
                move |info, painter| {
                    let gl = painter.gl();

                    let clip = info.clip_rect_in_pixels();
                    let params = RenderParams {
                        viewport: [
                            clip.left_px as f32,
                            clip.from_bottom_px as f32,
                            clip.width_px as f32,
                            clip.height_px as f32,
                        ],
                        view_projection,
                        eye,
                        lighting,
                        background,
                    };

                    if let Ok(mut r) = renderer.lock() {
                        r.sync_meshes(gl, &items);
                        r.paint(gl, &items, &params);
                    }
                },
            )),
        };

        ui.painter().add(callback);
    }

    fn draw_overlays(&self, ui: &mut Ui, rect: egui::Rect, state: &AppState) {
        let painter = ui.painter_at(rect);

        if state.settings.viewer.viewport.labels_visible {
            overlays::draw_labels(&painter, rect, &state.viewer.label_positions());
        }

        if let Some((start, end)) = state.viewer.box_drag_rect() {
            overlays::draw_selection_rect(&painter, start, end);
        }

        overlays::draw_camera_info(&painter, rect, state.viewer.camera());

        let hint = if state.viewer.is_box_selecting() {
            t("status.box_hint")
        } else {
            t("status.nav_hint")
        };
        overlays::draw_hint(&painter, rect, hint);
    }
}
