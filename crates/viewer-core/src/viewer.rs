//! The viewer facade: one context, both selection trackers, the loaded model
//! and the mesh position index.

use std::path::Path;

use glam::{Quat, Vec2};
use shared::{BoxSelectionReport, CanvasRect, ElementId, LoadProgress, PointerButton, PointerEvent, PointerEventKind};

use crate::config::ViewerSettings;
use crate::context::ViewerContext;
use crate::fixtures;
use crate::loader::{self, LoadError, LoadedModel};
use crate::mesh_index::MeshPositionIndex;
use crate::scene::{Node, NodeId, Scene};
use crate::selection::{self, BoxSelection, ClickSelection};
use crate::viewport::camera::OrbitCamera;

/// What a primary-button gesture does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Click selects, drag orbits
    Orbit,
    /// Drag draws a selection rectangle
    BoxSelect,
}

/// Result of feeding a pointer event to the viewer
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing selection-related happened
    Ignored,
    /// Click selection ran; element id of the hit, if any
    Picked(Option<ElementId>),
    /// Box drag finished
    BoxSelected(BoxSelectionReport),
}

pub struct Viewer {
    ctx: ViewerContext,
    settings: ViewerSettings,
    click: ClickSelection,
    boxes: BoxSelection,
    mesh_index: MeshPositionIndex,
    /// Wrapper group carrying fit scale and auto-rotation
    model_group: Option<NodeId>,
    model_name: Option<String>,
    auto_rotate: bool,
}

impl Viewer {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            ctx: ViewerContext::new(&settings),
            click: ClickSelection::new(settings.highlight.click),
            boxes: BoxSelection::new(settings.highlight.box_select),
            settings,
            mesh_index: MeshPositionIndex::default(),
            model_group: None,
            model_name: None,
            auto_rotate: false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn context(&self) -> &ViewerContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ViewerContext {
        &mut self.ctx
    }

    pub fn scene(&self) -> &Scene {
        &self.ctx.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.ctx.camera
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    /// Replace the settings; highlight colors apply to the next selection
    pub fn apply_settings(&mut self, settings: ViewerSettings) {
        self.click.set_highlight(settings.highlight.click);
        self.boxes.set_highlight(settings.highlight.box_select);
        self.ctx.background = settings.viewport.background_color;
        self.settings = settings;
    }

    pub fn set_canvas(&mut self, canvas: CanvasRect) {
        self.ctx.canvas = canvas;
    }

    pub fn mode(&self) -> InteractionMode {
        if self.boxes.is_active() {
            InteractionMode::BoxSelect
        } else {
            InteractionMode::Orbit
        }
    }

    /// Read-only mesh name → world position map of the current model
    pub fn mesh_positions(&self) -> &MeshPositionIndex {
        &self.mesh_index
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn model_group(&self) -> Option<NodeId> {
        self.model_group
    }

    // ── Selection ─────────────────────────────────────────────

    /// Route a pointer event to the tracker of the current mode
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        match (self.mode(), event.kind) {
            (InteractionMode::Orbit, PointerEventKind::Down) if event.button == PointerButton::Primary => {
                PointerOutcome::Picked(self.on_pointer_down(event.x, event.y))
            }
            (InteractionMode::Orbit, _) => PointerOutcome::Ignored,
            (InteractionMode::BoxSelect, PointerEventKind::Down) => {
                self.boxes.on_pointer_down(&mut self.ctx, event.x, event.y, event.button);
                PointerOutcome::Ignored
            }
            (InteractionMode::BoxSelect, PointerEventKind::Move) => {
                self.boxes
                    .on_pointer_move(&mut self.ctx, event.x, event.y, event.primary_down);
                PointerOutcome::Ignored
            }
            (InteractionMode::BoxSelect, PointerEventKind::Up) => self
                .boxes
                .on_pointer_up(&mut self.ctx, event.x, event.y, event.button)
                .map_or(PointerOutcome::Ignored, PointerOutcome::BoxSelected),
        }
    }

    /// Click selection at a screen position; returns the hit's element id
    pub fn on_pointer_down(&mut self, x: f32, y: f32) -> Option<ElementId> {
        self.click.on_pointer_down(&mut self.ctx, x, y)
    }

    /// Element id of `node`; `None` for no node
    pub fn element_id(&self, node: Option<NodeId>) -> Option<ElementId> {
        selection::element_id(&self.ctx.scene, node)
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.click.selected()
    }

    pub fn selected_element_id(&self) -> Option<ElementId> {
        self.element_id(self.click.selected())
    }

    pub fn click_selection(&self) -> &ClickSelection {
        &self.click
    }

    pub fn box_selection(&self) -> &BoxSelection {
        &self.boxes
    }

    /// Drag rectangle in screen pixels while a box drag is in progress
    pub fn box_drag_rect(&self) -> Option<(Vec2, Vec2)> {
        self.boxes.drag_rect()
    }

    /// Enter box mode. The click selection is restored first so the two
    /// trackers never hold the same material.
    pub fn start_box_selection(&mut self) {
        self.click.restore(&mut self.ctx.scene);
        self.boxes.start(&mut self.ctx);
    }

    pub fn stop_box_selection(&mut self) {
        self.boxes.stop(&mut self.ctx);
    }

    pub fn is_box_selecting(&self) -> bool {
        self.boxes.is_active()
    }

    // ── Auto-rotation ─────────────────────────────────────────

    pub fn start_auto_rotation(&mut self) {
        self.auto_rotate = true;
    }

    pub fn stop_auto_rotation(&mut self) {
        self.auto_rotate = false;
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    /// Per-frame update. Returns true when the scene changed.
    pub fn update(&mut self) -> bool {
        if !self.auto_rotate {
            return false;
        }
        let Some(node) = self.model_group.and_then(|id| self.ctx.scene.get_mut(id)) else {
            return false;
        };
        let step = Quat::from_rotation_y(-self.settings.rotation.speed);
        node.transform.rotation = (step * node.transform.rotation).normalize();
        true
    }

    // ── Camera ────────────────────────────────────────────────

    pub fn orbit(&mut self, dx: f32, dy: f32) -> bool {
        self.ctx.controls.rotate(&mut self.ctx.camera, dx, dy)
    }

    pub fn zoom(&mut self, delta: f32) -> bool {
        self.ctx.controls.zoom(&mut self.ctx.camera, delta)
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        self.ctx.controls.pan(&mut self.ctx.camera, dx, dy)
    }

    pub fn reset_camera(&mut self) {
        self.ctx.camera = OrbitCamera::from_settings(&self.settings.camera);
    }

    /// Screen positions of the mesh labels that are in front of the camera
    pub fn label_positions(&self) -> Vec<(String, Vec2)> {
        self.mesh_index
            .iter()
            .filter_map(|(name, pos)| Some((name.to_string(), self.ctx.project_to_screen(pos)?)))
            .collect()
    }

    // ── Model loading ─────────────────────────────────────────

    pub fn load_gltf_path(
        &mut self,
        path: impl AsRef<Path>,
        on_progress: impl FnMut(LoadProgress),
    ) -> Result<(), LoadError> {
        let model = loader::load_gltf_path(path, on_progress)?;
        self.insert_model(model, true);
        Ok(())
    }

    pub fn load_gltf_slice(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let model = loader::load_gltf_slice(bytes)?;
        self.insert_model(model, true);
        Ok(())
    }

    /// Replace the current model with an already loaded one and fit it to the view
    pub fn set_model(&mut self, model: LoadedModel) {
        self.insert_model(model, true);
    }

    /// Replace the current model keeping its own scale and position
    pub fn set_model_unfitted(&mut self, model: LoadedModel) {
        self.insert_model(model, false);
    }

    /// Show the two demo boxes, unscaled
    pub fn load_demo(&mut self) {
        self.set_model_unfitted(LoadedModel {
            name: "demo".to_string(),
            scene: fixtures::demo_boxes(),
            mesh_count: 2,
        });
    }

    fn insert_model(&mut self, model: LoadedModel, fit: bool) {
        self.clear_selections();
        if let Some(old) = self.model_group.take() {
            self.ctx.scene.remove_subtree(old);
        }

        let root = self.ctx.scene.root();
        let group = self.ctx.scene.add_node(root, Node::group("model"));
        let inner = self.ctx.scene.graft(group, model.scene);
        if fit {
            loader::fit_model(
                &mut self.ctx.scene,
                group,
                inner,
                &self.ctx.camera,
                self.settings.viewport.fit_fill,
            );
        }

        self.mesh_index = MeshPositionIndex::build(&self.ctx.scene, root);
        self.model_group = Some(group);
        tracing::info!(
            "Model '{}' ready: {} meshes indexed",
            model.name,
            self.mesh_index.len()
        );
        self.model_name = Some(model.name);
    }

    fn clear_selections(&mut self) {
        self.click.restore(&mut self.ctx.scene);
        self.boxes.clear_collection(&mut self.ctx);
    }

    /// Tear down: restore every highlight, leave box mode, stop rotating.
    /// Safe to call repeatedly.
    pub fn end(&mut self) {
        self.click.restore(&mut self.ctx.scene);
        self.boxes.stop(&mut self.ctx);
        self.auto_rotate = false;
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}
