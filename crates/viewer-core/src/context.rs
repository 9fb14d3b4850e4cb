//! Explicit viewer context: everything a tracker needs to reach the scene.

use glam::{Vec2, Vec3};
use shared::{CanvasRect, Color};

use crate::config::ViewerSettings;
use crate::scene::Scene;
use crate::viewport::camera::{OrbitCamera, OrbitControls};
use crate::viewport::picking::Ray;

/// Light rig used by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub directional_color: Color,
    /// Position the directional light shines from (towards the origin)
    pub directional_position: Vec3,
    /// Point light that travels with the camera
    pub camera_light_color: Color,
    pub camera_light_intensity: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: Color::from_hex(0x404040),
            ambient_intensity: 2.0,
            directional_color: Color::WHITE,
            directional_position: Vec3::new(0.0, 10.0, 10.0),
            camera_light_color: Color::WHITE,
            camera_light_intensity: 0.8,
        }
    }
}

impl Lighting {
    /// Direction the directional light comes from, normalized
    pub fn directional_dir(&self) -> Vec3 {
        self.directional_position.normalize_or_zero()
    }
}

/// Scene, camera, controls and canvas of one viewer instance
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub scene: Scene,
    pub camera: OrbitCamera,
    pub controls: OrbitControls,
    /// Canvas bounds in screen pixels
    pub canvas: CanvasRect,
    pub lighting: Lighting,
    pub background: Color,
}

impl ViewerContext {
    pub fn new(settings: &ViewerSettings) -> Self {
        Self {
            scene: Scene::new(),
            camera: OrbitCamera::from_settings(&settings.camera),
            controls: OrbitControls::default(),
            canvas: CanvasRect::default(),
            lighting: Lighting::default(),
            background: settings.viewport.background_color,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.canvas.aspect()
    }

    /// Screen pixel → NDC; `None` until the canvas has a size
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<Vec2> {
        self.canvas.to_ndc(x, y).map(Vec2::from)
    }

    /// Ray from the camera through a screen pixel
    pub fn screen_ray(&self, x: f32, y: f32) -> Option<Ray> {
        let ndc = self.to_ndc(x, y)?;
        Some(self.camera.ray_from_ndc(ndc, self.aspect()))
    }

    /// World point → screen pixel, `None` when behind the camera or off-canvas size
    pub fn project_to_screen(&self, point: Vec3) -> Option<Vec2> {
        if self.canvas.is_degenerate() {
            return None;
        }
        let ndc = self.camera.project_to_ndc(point, self.aspect())?;
        Some(Vec2::from(self.canvas.from_ndc([ndc.x, ndc.y])))
    }
}

impl Default for ViewerContext {
    fn default() -> Self {
        Self::new(&ViewerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_ray_needs_canvas() {
        let ctx = ViewerContext::default();
        assert!(ctx.screen_ray(10.0, 10.0).is_none());
    }

    #[test]
    fn test_canvas_center_ray_looks_forward() {
        let mut ctx = ViewerContext::default();
        ctx.canvas = CanvasRect::new(0.0, 0.0, 800.0, 600.0);
        let ray = ctx.screen_ray(400.0, 300.0).unwrap();
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_project_origin_to_canvas_center() {
        let mut ctx = ViewerContext::default();
        ctx.canvas = CanvasRect::new(100.0, 50.0, 800.0, 600.0);
        let p = ctx.project_to_screen(Vec3::ZERO).unwrap();
        assert!((p - Vec2::new(500.0, 350.0)).length() < 1e-3);
    }
}
