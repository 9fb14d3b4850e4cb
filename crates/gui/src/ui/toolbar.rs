//! Toolbar actions and UI

use egui::Ui;

use crate::i18n::{self, t, Lang};
use crate::state::AppState;

// ── Public actions (callable from shortcuts too) ─────────────

/// Ask for a glTF file and start loading it in the background
pub fn action_open_model(ctx: &egui::Context, state: &mut AppState) {
    let picked = rfd::FileDialog::new()
        .set_title(t("tb.open_title"))
        .add_filter("glTF", &["glb", "gltf"])
        .pick_file();
    if let Some(path) = picked {
        let ctx = ctx.clone();
        state.open_model(path, move || ctx.request_repaint());
    }
}

pub fn action_reset_camera(state: &mut AppState) {
    state.viewer.reset_camera();
}

fn set_language(state: &mut AppState, lang: Lang) {
    i18n::set_lang(lang);
    state.settings.ui.language = lang;
    state.settings.save();
}

// ── Toolbar UI ───────────────────────────────────────────────

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        let loading = state.loader.is_loading();
        if ui
            .add_enabled(!loading, egui::Button::new(t("tb.open")))
            .on_hover_text(t("tip.open"))
            .clicked()
        {
            action_open_model(ui.ctx(), state);
        }
        if ui
            .add_enabled(!loading, egui::Button::new(t("tb.demo")))
            .on_hover_text(t("tip.demo"))
            .clicked()
        {
            state.load_demo();
        }

        ui.separator();

        // ── Modes ──
        if ui
            .selectable_label(state.viewer.is_box_selecting(), t("tb.box_select"))
            .on_hover_text(t("tip.box_select"))
            .clicked()
        {
            state.toggle_box_selection();
        }
        if ui
            .selectable_label(state.viewer.is_auto_rotating(), t("tb.auto_rotate"))
            .on_hover_text(t("tip.auto_rotate"))
            .clicked()
        {
            state.toggle_auto_rotation();
        }
        let labels = &mut state.settings.viewer.viewport.labels_visible;
        if ui
            .selectable_label(*labels, t("tb.labels"))
            .on_hover_text(t("tip.labels"))
            .clicked()
        {
            *labels = !*labels;
        }

        ui.separator();

        if ui
            .button(t("tb.reset_camera"))
            .on_hover_text(t("tip.reset_camera"))
            .clicked()
        {
            action_reset_camera(state);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.menu_button(t("tb.language"), |ui| {
                if ui.radio(i18n::lang() == Lang::Ru, "Русский").clicked() {
                    set_language(state, Lang::Ru);
                    ui.close_menu();
                }
                if ui.radio(i18n::lang() == Lang::En, "English").clicked() {
                    set_language(state, Lang::En);
                    ui.close_menu();
                }
            });
        });
    });
}
