//! Integration tests for model loading, fitting and settings.

use glam::Vec3;
use viewer_core::fixtures::{assembly_glb, FixturePart};
use viewer_core::harness::TestHarness;
use viewer_core::{LoadError, ViewerSettings};

fn temp_glb(name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("{name}_{}.glb", std::process::id()));
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_load_path_indexes_meshes_and_reports_progress() {
    let glb = assembly_glb(&[
        FixturePart::new("frame", [0.0, 0.0, 0.0]).element_id("F"),
        FixturePart::new("wheel", [3.0, 0.0, 0.0]).two_primitives(),
    ]);
    let path = temp_glb("viewer_core_load", &glb);

    let mut h = TestHarness::new();
    let mut updates = Vec::new();
    h.viewer
        .load_gltf_path(&path, |p| updates.push(p))
        .unwrap();
    std::fs::remove_file(&path).ok();

    assert!(!updates.is_empty());
    assert!(updates.windows(2).all(|w| w[0].loaded <= w[1].loaded));
    assert_eq!(updates.last().unwrap().loaded, glb.len() as u64);

    let index = h.viewer.mesh_positions();
    let keys: Vec<&str> = index.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["frame", "wheel_0", "wheel_1"]);
}

#[test]
fn test_loaded_model_is_centered_in_view() {
    let mut h = TestHarness::new();
    h.viewer
        .load_gltf_slice(&assembly_glb(&[
            FixturePart::new("a", [20.0, 5.0, -3.0]),
            FixturePart::new("b", [26.0, 5.0, -3.0]),
        ]))
        .unwrap();

    let group = h.viewer.model_group().unwrap();
    let bounds = h.scene().world_bounding_box(group).unwrap();
    assert!(bounds.center().length() < 1e-3);

    // both parts land on screen
    for name in ["a", "b"] {
        let p = h.screen_pos(name);
        assert!(p.x > 0.0 && p.x < viewer_core::harness::CANVAS_WIDTH);
    }
}

#[test]
fn test_reload_clears_click_selection() {
    let glb = assembly_glb(&[FixturePart::new("a", [0.0; 3]).element_id("A")]);
    let mut h = TestHarness::new();
    h.viewer.load_gltf_slice(&glb).unwrap();
    h.click_node("a");
    assert!(h.viewer.selected_node().is_some());

    h.viewer.load_gltf_slice(&glb).unwrap();
    assert_eq!(h.viewer.selected_node(), None);
    assert_eq!(h.viewer.click_selection().saved_count(), 0);
    assert_eq!(h.click_node("a").as_deref(), Some("A"));
}

#[test]
fn test_missing_file_surfaces_error() {
    let mut h = TestHarness::new();
    let err = h
        .viewer
        .load_gltf_path("/definitely/missing.glb", |_| {})
        .unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
    assert!(err.to_string().starts_with("IO error"));
    assert!(h.viewer.mesh_positions().is_empty());
}

#[test]
fn test_settings_change_highlight_colors() {
    let mut settings = ViewerSettings::default();
    settings.highlight.click = shared::Color::from_hex(0xFF00FF);

    let mut h = TestHarness::new();
    h.viewer.apply_settings(settings);
    h.viewer
        .load_gltf_slice(&assembly_glb(&[FixturePart::new("a", [0.0; 3])]))
        .unwrap();
    h.click_node("a");
    assert_eq!(h.emissive("a"), Some(shared::Color::from_hex(0xFF00FF)));
}

#[test]
fn test_reset_camera_after_orbit() {
    let mut h = TestHarness::new();
    assert!(h.viewer.orbit(120.0, 40.0));
    assert!(h.viewer.zoom(30.0));
    assert_ne!(h.viewer.camera().eye_position(), Vec3::new(0.0, 0.0, 10.0));
    h.viewer.reset_camera();
    assert!((h.viewer.camera().eye_position() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
}
