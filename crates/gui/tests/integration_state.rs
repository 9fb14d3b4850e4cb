//! Integration tests for the desktop state layer: settings persistence,
//! background loading and mode toggles.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use model_viewer_lib::i18n::Lang;
use model_viewer_lib::state::{AppSettings, AppState, StatusMessage};
use shared::Color;
use viewer_core::fixtures::{assembly_glb, FixturePart};

fn temp_path(name: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("model_viewer_{name}_{}.{ext}", std::process::id()))
}

fn wait_for_load(state: &mut AppState) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while state.loader.is_loading() {
        state.poll_loading();
        assert!(Instant::now() < deadline, "load did not finish in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

// ── Settings ────────────────────────────────────────────────

#[test]
fn test_settings_survive_save_and_load() {
    let path = temp_path("settings", "json");
    let mut settings = AppSettings::default();
    settings.viewer.highlight.click = Color::from_hex(0x123456);
    settings.viewer.viewport.labels_visible = false;
    settings.ui.language = Lang::En;
    settings.ui.font_size = 16.0;

    settings.save_to(&path).unwrap();
    let loaded = AppSettings::load_from(&path);
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, settings);
}

#[test]
fn test_missing_or_broken_settings_fall_back_to_defaults() {
    assert_eq!(
        AppSettings::load_from(&temp_path("no_such_settings", "json")),
        AppSettings::default()
    );

    let path = temp_path("broken_settings", "json");
    std::fs::write(&path, "{ not json").unwrap();
    let loaded = AppSettings::load_from(&path);
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, AppSettings::default());
}

#[test]
fn test_partial_settings_keep_other_defaults() {
    let path = temp_path("partial_settings", "json");
    std::fs::write(&path, r#"{ "viewer": { "rotation": { "speed": 0.05 } } }"#).unwrap();
    let loaded = AppSettings::load_from(&path);
    std::fs::remove_file(&path).ok();

    assert!((loaded.viewer.rotation.speed - 0.05).abs() < 1e-6);
    assert_eq!(loaded.viewer.highlight, AppSettings::default().viewer.highlight);
    assert_eq!(loaded.ui, AppSettings::default().ui);
}

// ── Background loading ──────────────────────────────────────

#[test]
fn test_background_load_replaces_model() {
    let path = temp_path("assembly", "glb");
    std::fs::write(
        &path,
        assembly_glb(&[
            FixturePart::new("base", [0.0, 0.0, 0.0]).element_id("B-1"),
            FixturePart::new("arm", [2.0, 1.0, 0.0]),
        ]),
    )
    .unwrap();

    let mut state = AppState::new(AppSettings::default());
    state.load_demo();
    state.open_model(&path, || {});
    assert!(state.loader.is_loading());
    wait_for_load(&mut state);
    std::fs::remove_file(&path).ok();

    let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
    assert_eq!(state.viewer.model_name(), Some(stem.as_str()));
    assert_eq!(state.status, StatusMessage::Info(stem));

    let keys: Vec<&str> = state.viewer.mesh_positions().iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["arm", "base"]);
    assert!(state.viewer.scene().find_by_name("mesh1").is_none());
}

#[test]
fn test_failed_load_reports_error_and_keeps_scene() {
    let mut state = AppState::new(AppSettings::default());
    state.load_demo();
    state.open_model(temp_path("missing_model", "glb"), || {});
    wait_for_load(&mut state);

    match &state.status {
        StatusMessage::Error(message) => assert!(message.starts_with("IO error"), "{message}"),
        other => panic!("expected an error status, got {other:?}"),
    }
    assert_eq!(state.viewer.model_name(), Some("demo"));
    assert_eq!(state.viewer.mesh_positions().len(), 2);
}

#[test]
fn test_newer_load_wins() {
    let first = temp_path("first", "glb");
    let second = temp_path("second", "glb");
    std::fs::write(&first, assembly_glb(&[FixturePart::new("one", [0.0; 3])])).unwrap();
    std::fs::write(&second, assembly_glb(&[FixturePart::new("two", [0.0; 3])])).unwrap();

    let mut state = AppState::new(AppSettings::default());
    state.open_model(&first, || {});
    state.open_model(&second, || {});
    wait_for_load(&mut state);
    std::fs::remove_file(&first).ok();
    std::fs::remove_file(&second).ok();

    assert!(state.viewer.mesh_positions().get("two").is_some());
    assert!(state.viewer.mesh_positions().get("one").is_none());
}

// ── Modes ───────────────────────────────────────────────────

#[test]
fn test_toggles_flip_viewer_modes() {
    let mut state = AppState::new(AppSettings::default());
    state.load_demo();

    state.toggle_box_selection();
    assert!(state.viewer.is_box_selecting());
    assert!(!state.viewer.context().controls.rotate_enabled);
    state.toggle_box_selection();
    assert!(!state.viewer.is_box_selecting());
    assert!(state.viewer.context().controls.rotate_enabled);

    state.toggle_auto_rotation();
    assert!(state.viewer.is_auto_rotating());
    assert!(state.viewer.update());
    state.toggle_auto_rotation();
    assert!(!state.viewer.update());
}

#[test]
fn test_viewer_starts_with_saved_settings() {
    let mut settings = AppSettings::default();
    settings.viewer.viewport.background_color = Color::from_hex(0x202020);
    let state = AppState::new(settings);
    assert_eq!(state.viewer.context().background, Color::from_hex(0x202020));
}
