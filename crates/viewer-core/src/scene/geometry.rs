use glam::Vec3;

use crate::viewport::picking::Aabb;

/// Indexed triangle geometry in the node's local space
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Build geometry, filling missing normals and indices.
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            vec![Vec3::Y; positions.len()]
        };
        let indices = if indices.is_empty() {
            (0..positions.len() as u32).collect()
        } else {
            indices
        };
        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertices of triangle `i`, or `None` if an index is out of range
    pub fn triangle(&self, i: usize) -> Option<[Vec3; 3]> {
        let tri = self.indices.get(i * 3..i * 3 + 3)?;
        Some([
            *self.positions.get(tri[0] as usize)?,
            *self.positions.get(tri[1] as usize)?,
            *self.positions.get(tri[2] as usize)?,
        ])
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Center of the local bounding box (used by the selection box)
    pub fn bounding_center(&self) -> Vec3 {
        self.bounding_box().center()
    }
}

/// Axis-aligned box centered on the origin, 24 vertices with flat normals.
pub fn cuboid(w: f32, h: f32, d: f32) -> Geometry {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = positions.len() as u32;
        positions.extend_from_slice(quad);
        normals.extend_from_slice(&[*normal; 4]);
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry {
        positions,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_counts() {
        let g = cuboid(1.0, 2.0, 3.0);
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.triangle_count(), 12);
    }

    #[test]
    fn test_cuboid_bounds() {
        let bb = cuboid(2.0, 4.0, 6.0).bounding_box();
        assert_eq!(bb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bb.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bb.center(), Vec3::ZERO);
    }

    #[test]
    fn test_new_fills_missing_normals_and_indices() {
        let g = Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![], vec![]);
        assert_eq!(g.normals.len(), 3);
        assert_eq!(g.indices, vec![0, 1, 2]);
        assert_eq!(g.triangle(0), Some([Vec3::ZERO, Vec3::X, Vec3::Y]));
        assert_eq!(g.triangle(1), None);
    }
}
