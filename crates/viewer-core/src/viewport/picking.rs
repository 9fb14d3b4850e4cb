use glam::{Mat4, Vec3};

use crate::scene::{NodeId, Scene};

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box containing nothing; any point expands it
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |acc, p| Aabb {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Box around the 8 transformed corners
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ];
        Aabb::from_points(corners.iter().map(|c| matrix.transform_point3(*c)))
    }
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
/// Both faces count as hits.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// A ray hit on a mesh node
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub node: NodeId,
    /// Distance from the ray origin along the (normalized) direction
    pub distance: f32,
    pub point: Vec3,
}

/// Casts rays against the meshes of a scene
#[derive(Debug, Clone, Copy)]
pub struct Raycaster {
    pub near: f32,
    pub far: f32,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self {
            near: 0.0,
            far: f32::INFINITY,
        }
    }
}

impl Raycaster {
    /// Every visible mesh under `start` (inclusive) hit by `ray`, nearest first.
    /// Equal distances keep depth-first scene order.
    pub fn intersect_scene(&self, scene: &Scene, start: NodeId, ray: &Ray) -> Vec<Intersection> {
        let mut hits = Vec::new();

        for id in scene.depth_first(start) {
            let Some(node) = scene.get(id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let Some(geometry) = node.geometry() else {
                continue;
            };

            let world = scene.world_matrix(id);
            let bounds = geometry.bounding_box().transformed(&world);
            if bounds.is_empty() || ray_aabb(ray, &bounds).is_none() {
                continue;
            }

            let mut nearest: Option<f32> = None;
            for tri in 0..geometry.triangle_count() {
                let Some([a, b, c]) = geometry.triangle(tri) else {
                    continue;
                };
                let (a, b, c) = (
                    world.transform_point3(a),
                    world.transform_point3(b),
                    world.transform_point3(c),
                );
                if let Some(t) = ray_triangle_intersect(ray, a, b, c) {
                    if nearest.is_none_or(|n| t < n) {
                        nearest = Some(t);
                    }
                }
            }

            if let Some(distance) = nearest {
                if distance >= self.near && distance <= self.far {
                    hits.push(Intersection {
                        node: id,
                        distance,
                        point: ray.at(distance),
                    });
                }
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Nearest hit under `start`, if any
    pub fn nearest(&self, scene: &Scene, start: NodeId, ray: &Ray) -> Option<Intersection> {
        self.intersect_scene(scene, start, ray).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::scene::{cuboid, Node};

    fn ray_down_z(x: f32, y: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, y, 10.0),
            direction: Vec3::NEG_Z,
        }
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let bb = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let d = ray_aabb(&ray_down_z(0.0, 0.0), &bb).unwrap();
        assert!((d - 9.0).abs() < 1e-5);
        assert!(ray_aabb(&ray_down_z(3.0, 0.0), &bb).is_none());
    }

    #[test]
    fn test_ray_triangle_behind_origin_is_ignored() {
        let ray = Ray {
            origin: Vec3::new(0.2, 0.2, -1.0),
            direction: Vec3::NEG_Z,
        };
        assert!(ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_aabb_transformed_by_translation() {
        let bb = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let moved = bb.transformed(&Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.center(), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(moved.size(), Vec3::splat(2.0));
    }

    #[test]
    fn test_empty_aabb() {
        let bb = Aabb::from_points(std::iter::empty());
        assert!(bb.is_empty());
        assert_eq!(bb.size(), Vec3::ZERO);
    }

    #[test]
    fn test_intersections_sorted_nearest_first() {
        let mut scene = Scene::new();
        let root = scene.root();
        let geometry = Arc::new(cuboid(1.0, 1.0, 1.0));
        let far = scene.add_node(root, Node::mesh("far", geometry.clone(), None).with_translation(Vec3::new(0.0, 0.0, -3.0)));
        let near = scene.add_node(root, Node::mesh("near", geometry, None));

        let hits = Raycaster::default().intersect_scene(&scene, root, &ray_down_z(0.0, 0.0));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert_eq!(hits[1].node, far);
        assert!((hits[0].distance - 9.5).abs() < 1e-4);
        assert!((hits[0].point.z - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_hidden_meshes_are_not_hit() {
        let mut scene = Scene::new();
        let root = scene.root();
        let id = scene.add_node(root, Node::mesh("m", Arc::new(cuboid(1.0, 1.0, 1.0)), None));
        scene.get_mut(id).unwrap().visible = false;
        assert!(Raycaster::default().nearest(&scene, root, &ray_down_z(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_miss_returns_empty() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.add_node(root, Node::mesh("m", Arc::new(cuboid(1.0, 1.0, 1.0)), None));
        assert!(Raycaster::default()
            .intersect_scene(&scene, root, &ray_down_z(4.0, 4.0))
            .is_empty());
    }
}
