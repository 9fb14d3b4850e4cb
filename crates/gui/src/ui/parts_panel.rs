//! Right panel: current model, mesh position index and selection results

use egui::Ui;

use crate::i18n::t;
use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &AppState) {
    let Some(model) = state.viewer.model_name() else {
        ui.heading(t("parts.title"));
        ui.weak(t("parts.no_model"));
        return;
    };
    ui.heading(model);
    ui.separator();

    // ── Click selection ──
    ui.label(egui::RichText::new(t("parts.selected")).strong());
    let selected = state
        .viewer
        .selected_node()
        .and_then(|id| state.viewer.scene().get(id))
        .map(|node| node.name.clone());
    egui::Grid::new("click_selection")
        .num_columns(2)
        .spacing([8.0, 2.0])
        .show(ui, |ui| {
            ui.weak("Mesh");
            ui.label(selected.as_deref().unwrap_or(t("parts.none")));
            ui.end_row();
            ui.weak(t("parts.element_id"));
            ui.label(state.last_pick.as_deref().unwrap_or(t("parts.none")));
            ui.end_row();
        });

    ui.add_space(4.0);
    ui.separator();

    // ── Box selection ──
    ui.label(egui::RichText::new(t("parts.box_result")).strong());
    match &state.last_box {
        Some(report) if !report.is_empty() => {
            for name in &report.names {
                ui.label(name);
            }
            if !report.element_ids.is_empty() {
                ui.weak(format!("{}: {}", t("parts.element_id"), report.element_ids.join(", ")));
            }
        }
        _ => {
            ui.weak(t("parts.box_empty"));
        }
    }

    ui.add_space(4.0);
    ui.separator();

    // ── Mesh position index ──
    let index = state.viewer.mesh_positions();
    egui::CollapsingHeader::new(format!("{} ({})", t("parts.meshes"), index.len()))
        .default_open(true)
        .show(ui, |ui| {
            egui::Grid::new("mesh_positions")
                .num_columns(2)
                .striped(true)
                .spacing([8.0, 2.0])
                .show(ui, |ui| {
                    for (name, pos) in index.iter() {
                        let highlighted = selected.as_deref() == Some(name);
                        let label = egui::RichText::new(name);
                        ui.label(if highlighted { label.strong() } else { label });
                        ui.monospace(format!("{:>7.2} {:>7.2} {:>7.2}", pos.x, pos.y, pos.z));
                        ui.end_row();
                    }
                });
        });
}
