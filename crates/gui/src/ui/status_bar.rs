use egui::Ui;

use crate::i18n::t;
use crate::state::{AppState, StatusMessage};

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui| {
        let mesh_count = state.viewer.mesh_positions().len();
        ui.weak(format!("{}: {mesh_count}", t("status.meshes")));

        ui.separator();

        if state.loader.is_loading() {
            let percent = state
                .loader
                .progress()
                .and_then(|p| p.fraction())
                .map(|f| format!(" {:.0}%", f * 100.0))
                .unwrap_or_default();
            ui.spinner();
            ui.label(format!("{}{percent}", t("status.loading")));
        } else if state.viewer.is_box_selecting() {
            ui.colored_label(egui::Color32::from_rgb(120, 220, 120), t("status.box_mode"));
            let boxed = state.viewer.box_selection().selected().len();
            ui.label(format!("{}: {boxed}", t("status.boxed")));
        } else if let Some(id) = &state.last_pick {
            ui.label(format!("{}: {id}", t("status.selected")));
        } else {
            match &state.status {
                StatusMessage::Ready => {
                    ui.weak(t("status.ready"));
                }
                StatusMessage::Info(text) => {
                    ui.weak(text);
                }
                StatusMessage::Error(text) => {
                    ui.colored_label(egui::Color32::from_rgb(255, 110, 100), text);
                }
            }
        }

        // Right-aligned version
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("Model Viewer v", env!("CARGO_PKG_VERSION")));
        });
    });
}
