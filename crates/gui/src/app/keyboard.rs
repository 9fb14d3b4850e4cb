//! Keyboard shortcut handling

use eframe::egui;

use crate::state::AppState;
use crate::ui::toolbar;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState) {
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let open = ctx.input(|i| {
        // B — box selection mode
        if i.key_pressed(egui::Key::B) && !i.modifiers.command {
            state.toggle_box_selection();
        }
        // R — auto-rotation
        if i.key_pressed(egui::Key::R) && !i.modifiers.command {
            state.toggle_auto_rotation();
        }
        // L — labels
        if i.key_pressed(egui::Key::L) && !i.modifiers.command {
            let viewport = &mut state.settings.viewer.viewport;
            viewport.labels_visible = !viewport.labels_visible;
        }
        if i.key_pressed(egui::Key::Home) {
            state.viewer.reset_camera();
        }
        // Escape leaves box mode and drops every highlight
        if i.key_pressed(egui::Key::Escape) {
            state.viewer.end();
            state.last_pick = None;
        }
        i.modifiers.command && i.key_pressed(egui::Key::O)
    });

    // The file dialog blocks, so it runs outside the input lock
    if open {
        toolbar::action_open_model(ctx, state);
    }
}
