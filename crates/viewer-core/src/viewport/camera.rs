use glam::{Mat4, Vec2, Vec3, Vec4};

use super::picking::Ray;
use crate::config::CameraSettings;

/// Perspective camera orbiting a target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    /// Camera on +Z looking at the origin
    pub fn new() -> Self {
        Self::from_settings(&CameraSettings::default())
    }

    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: settings.distance,
            target: Vec3::ZERO,
            fov: settings.fov_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
        }
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.eye_position()).normalize_or_zero()
    }

    fn right_vector(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        self.right_vector().cross(self.forward()).normalize_or_zero()
    }

    /// Project a world point to NDC. `None` when the point is behind the camera.
    /// The returned z is the NDC depth (-1 at the near plane, 1 at the far plane).
    pub fn project_to_ndc(&self, point: Vec3, aspect: f32) -> Option<Vec3> {
        let p = self.view_projection(aspect) * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        Some(p.truncate() / p.w)
    }

    /// Ray from the eye through an NDC point
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect: f32) -> Ray {
        let vp_inv = self.view_projection(aspect).inverse();

        let near_ndc = Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far_ndc = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near_world = vp_inv * near_ndc;
        let far_world = vp_inv * far_ndc;

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.eye_position(),
            direction: (far - near).normalize_or_zero(),
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse-driven orbit controls. Each gesture can be switched off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitControls {
    pub rotate_enabled: bool,
    pub zoom_enabled: bool,
    pub pan_enabled: bool,
    /// Degrees per pixel of drag
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// World units per pixel of drag
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            rotate_enabled: true,
            zoom_enabled: true,
            pan_enabled: true,
            rotate_speed: 0.5,
            zoom_speed: 0.01,
            pan_speed: 0.01,
            min_distance: 0.5,
            max_distance: 100.0,
        }
    }
}

impl OrbitControls {
    /// Orbit by a drag delta in pixels. Returns false when rotation is disabled.
    pub fn rotate(&self, camera: &mut OrbitCamera, dx: f32, dy: f32) -> bool {
        if !self.rotate_enabled {
            return false;
        }
        camera.yaw -= (dx * self.rotate_speed).to_radians();
        camera.pitch += (dy * self.rotate_speed).to_radians();
        self.update(camera);
        true
    }

    /// Zoom by a scroll delta; positive moves closer.
    pub fn zoom(&self, camera: &mut OrbitCamera, delta: f32) -> bool {
        if !self.zoom_enabled {
            return false;
        }
        camera.distance *= 1.0 - delta * self.zoom_speed;
        self.update(camera);
        true
    }

    pub fn pan(&self, camera: &mut OrbitCamera, dx: f32, dy: f32) -> bool {
        if !self.pan_enabled {
            return false;
        }
        let offset = camera.right_vector() * (-dx * self.pan_speed)
            + camera.up_vector() * (dy * self.pan_speed);
        camera.target += offset;
        true
    }

    /// Keep the camera inside the allowed range
    pub fn update(&self, camera: &mut OrbitCamera) {
        camera.pitch = camera.pitch.clamp(-1.5, 1.5);
        camera.distance = camera.distance.clamp(self.min_distance, self.max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_on_positive_z() {
        let cam = OrbitCamera::new();
        let eye = cam.eye_position();
        assert!((eye - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = OrbitCamera::new();
        let ray = cam.ray_from_ndc(Vec2::ZERO, 1.5);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_project_target_is_ndc_origin() {
        let cam = OrbitCamera::new();
        let ndc = cam.project_to_ndc(Vec3::ZERO, 1.0).unwrap();
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_point_behind_camera_not_projected() {
        let cam = OrbitCamera::new();
        assert!(cam.project_to_ndc(Vec3::new(0.0, 0.0, 20.0), 1.0).is_none());
    }

    #[test]
    fn test_rotate_respects_flag() {
        let mut cam = OrbitCamera::new();
        let mut controls = OrbitControls::default();
        controls.rotate_enabled = false;
        assert!(!controls.rotate(&mut cam, 50.0, 20.0));
        assert_eq!(cam, OrbitCamera::new());

        controls.rotate_enabled = true;
        assert!(controls.rotate(&mut cam, 50.0, 20.0));
        assert_ne!(cam.yaw, 0.0);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = OrbitCamera::new();
        let controls = OrbitControls::default();
        for _ in 0..1000 {
            controls.zoom(&mut cam, 50.0);
        }
        assert_eq!(cam.distance, controls.min_distance);
    }
}
