//! Headless test harness driving a [`Viewer`] with synthetic pointer input.

use glam::Vec2;
use shared::{BoxSelectionReport, CanvasRect, Color, ElementId, PointerButton, PointerEvent};

use crate::scene::{MaterialRef, NodeId, Scene};
use crate::viewer::{PointerOutcome, Viewer};
use crate::LoadedModel;

/// Canvas size used by the harness
pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 600.0;

/// Headless harness: a viewer with a fixed canvas plus query helpers
pub struct TestHarness {
    pub viewer: Viewer,
}

impl TestHarness {
    /// Create a harness with an empty scene
    pub fn new() -> Self {
        let mut viewer = Viewer::default();
        viewer.set_canvas(CanvasRect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT));
        Self { viewer }
    }

    /// Harness with `scene` loaded as the model, not refitted
    pub fn with_scene(scene: Scene) -> Self {
        let mut harness = Self::new();
        harness.viewer.set_model_unfitted(LoadedModel {
            name: "fixture".to_string(),
            mesh_count: scene.mesh_nodes().count(),
            scene,
        });
        harness
    }

    pub fn scene(&self) -> &Scene {
        self.viewer.scene()
    }

    /// Node handle by name; panics if missing
    pub fn node(&self, name: &str) -> NodeId {
        match self.scene().find_by_name(name) {
            Some(id) => id,
            None => panic!("no node named '{name}'"),
        }
    }

    pub fn material(&self, name: &str) -> Option<MaterialRef> {
        self.scene().get(self.node(name))?.material().cloned()
    }

    pub fn emissive(&self, name: &str) -> Option<Color> {
        self.material(name)?.emissive
    }

    /// Names of the meshes whose emissive color is `color`, sorted
    pub fn names_with_emissive(&self, color: Color) -> Vec<String> {
        let scene = self.scene();
        let mut names: Vec<String> = scene
            .mesh_nodes()
            .filter_map(|id| scene.get(id))
            .filter(|n| n.material().and_then(|m| m.emissive) == Some(color))
            .map(|n| n.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Screen position of a node's world origin
    pub fn screen_pos(&self, name: &str) -> Vec2 {
        let world = self.scene().world_position(self.node(name));
        match self.viewer.context().project_to_screen(world) {
            Some(p) => p,
            None => panic!("'{name}' is behind the camera"),
        }
    }

    // ── Input ─────────────────────────────────────────────────

    /// Primary click at a screen position
    pub fn click(&mut self, pos: Vec2) -> Option<ElementId> {
        match self
            .viewer
            .handle_pointer(PointerEvent::down(pos.x, pos.y, PointerButton::Primary))
        {
            PointerOutcome::Picked(id) => id,
            _ => None,
        }
    }

    /// Primary click on a named node's origin
    pub fn click_node(&mut self, name: &str) -> Option<ElementId> {
        let pos = self.screen_pos(name);
        self.click(pos)
    }

    /// Click a canvas corner, where the fixtures leave empty space
    pub fn click_empty(&mut self) -> Option<ElementId> {
        self.click(Vec2::new(2.0, 2.0))
    }

    /// Primary drag from `from` to `to` through `steps` intermediate moves
    pub fn drag(&mut self, from: Vec2, to: Vec2, steps: usize) -> Option<BoxSelectionReport> {
        self.viewer
            .handle_pointer(PointerEvent::down(from.x, from.y, PointerButton::Primary));
        for i in 1..=steps {
            let p = from.lerp(to, i as f32 / (steps + 1) as f32);
            self.viewer.handle_pointer(PointerEvent::moved(p.x, p.y, true));
        }
        match self
            .viewer
            .handle_pointer(PointerEvent::up(to.x, to.y, PointerButton::Primary))
        {
            PointerOutcome::BoxSelected(report) => Some(report),
            _ => None,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
