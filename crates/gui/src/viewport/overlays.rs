//! Viewport overlay drawing (mesh labels, selection rectangle, camera info)

use egui::{Painter, Rect};
use viewer_core::viewport::camera::OrbitCamera;

/// Mesh name labels at their indexed positions
pub fn draw_labels(painter: &Painter, rect: Rect, labels: &[(String, glam::Vec2)]) {
    for (name, pos) in labels {
        let screen = egui::pos2(pos.x, pos.y);
        if !rect.contains(screen) {
            continue;
        }
        let galley = painter.layout_no_wrap(
            name.clone(),
            egui::FontId::proportional(11.0),
            egui::Color32::WHITE,
        );
        let text_rect = egui::Align2::CENTER_BOTTOM
            .anchor_size(screen - egui::vec2(0.0, 4.0), galley.size())
            .expand2(egui::vec2(4.0, 1.0));
        painter.rect_filled(text_rect, 3.0, egui::Color32::from_rgba_unmultiplied(0, 0, 0, 150));
        painter.galley(text_rect.min + egui::vec2(4.0, 1.0), galley, egui::Color32::WHITE);
    }
}

/// Rubber-band rectangle while a box selection is being dragged
pub fn draw_selection_rect(painter: &Painter, start: glam::Vec2, end: glam::Vec2) {
    let rect = Rect::from_two_pos(egui::pos2(start.x, start.y), egui::pos2(end.x, end.y));
    painter.rect_filled(rect, 0.0, egui::Color32::from_rgba_unmultiplied(75, 160, 255, 40));
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::from_rgb(75, 160, 255)),
        egui::StrokeKind::Inside,
    );
}

pub fn draw_camera_info(painter: &Painter, rect: Rect, camera: &OrbitCamera) {
    let overlay_rect = Rect::from_min_size(
        egui::pos2(rect.right() - 140.0, rect.top() + 4.0),
        egui::vec2(136.0, 44.0),
    );
    painter.rect_filled(
        overlay_rect,
        4.0,
        egui::Color32::from_rgba_premultiplied(0, 0, 0, 140),
    );
    painter.text(
        overlay_rect.min + egui::vec2(6.0, 4.0),
        egui::Align2::LEFT_TOP,
        format!(
            "Dist: {:.1}\nYaw: {:.0}  Pitch: {:.0}",
            camera.distance,
            camera.yaw.to_degrees(),
            camera.pitch.to_degrees(),
        ),
        egui::FontId::monospace(10.0),
        egui::Color32::from_rgb(200, 200, 210),
    );
}

/// One-line usage hint at the bottom of the viewport
pub fn draw_hint(painter: &Painter, rect: Rect, text: &str) {
    painter.text(
        egui::pos2(rect.center().x, rect.bottom() - 20.0),
        egui::Align2::CENTER_BOTTOM,
        text,
        egui::FontId::proportional(11.0),
        egui::Color32::from_rgb(90, 90, 100),
    );
}
