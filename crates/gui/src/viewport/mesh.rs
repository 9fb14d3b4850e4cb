//! CPU-side render data extracted from the viewer scene

use std::sync::Arc;

use glam::Mat4;
use viewer_core::{Geometry, Scene};

/// Interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z] ready for upload
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    /// 6 floats per vertex: position(3) + normal(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub const FLOATS_PER_VERTEX: usize = 6;

    pub fn from_geometry(geometry: &Geometry) -> Self {
        let mut vertices = Vec::with_capacity(geometry.vertex_count() * Self::FLOATS_PER_VERTEX);
        for (p, n) in geometry.positions.iter().zip(&geometry.normals) {
            vertices.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
        // drop triangles that point past the vertex buffer
        let count = geometry.vertex_count() as u32;
        let indices = geometry
            .indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| i < count))
            .flatten()
            .copied()
            .collect();
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::FLOATS_PER_VERTEX
    }
}

/// Stable key for a shared geometry buffer
pub fn geometry_key(geometry: &Arc<Geometry>) -> usize {
    Arc::as_ptr(geometry) as usize
}

/// One mesh node to draw this frame
#[derive(Clone, Debug)]
pub struct DrawItem {
    pub name: String,
    pub geometry: Arc<Geometry>,
    /// Local → world
    pub model: Mat4,
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    /// Standard materials are shaded; basic ones draw their flat color
    pub lit: bool,
}

/// Collect every visible mesh node that has geometry and a material
pub fn draw_list(scene: &Scene) -> Vec<DrawItem> {
    scene
        .mesh_nodes()
        .filter_map(|id| {
            let node = scene.get(id)?;
            if !node.visible {
                return None;
            }
            let geometry = node.geometry()?.clone();
            let material = node.material()?;
            Some(DrawItem {
                name: node.name.clone(),
                geometry,
                model: scene.world_matrix(id),
                color: material.color.to_rgb_f32(),
                emissive: material.effective_emissive().to_rgb_f32(),
                lit: material.has_emissive(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use shared::Color;
    use viewer_core::fixtures::{box_row, demo_boxes};
    use viewer_core::scene::cuboid;

    #[test]
    fn test_interleaves_positions_and_normals() {
        let geometry = cuboid(1.0, 1.0, 1.0);
        let data = MeshData::from_geometry(&geometry);
        assert_eq!(data.vertex_count(), geometry.vertex_count());
        assert_eq!(data.indices, geometry.indices);
        let p = geometry.positions[0];
        let n = geometry.normals[0];
        assert_eq!(&data.vertices[..6], &[p.x, p.y, p.z, n.x, n.y, n.z]);
    }

    #[test]
    fn test_out_of_range_triangles_are_dropped() {
        let geometry = Geometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            Vec::new(),
            vec![0, 1, 2, 0, 1, 7],
        );
        let data = MeshData::from_geometry(&geometry);
        assert_eq!(data.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_draw_list_carries_world_matrix_and_colors() {
        let scene = box_row(&["A", "B"]);
        let items = draw_list(&scene);
        assert_eq!(items.len(), 2);

        let a = items.iter().find(|i| i.name == "A").unwrap();
        let origin = a.model.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        assert!(a.lit);
        assert_eq!(a.emissive, Color::BLACK.to_rgb_f32());
    }

    #[test]
    fn test_demo_boxes_are_unlit() {
        let items = draw_list(&demo_boxes());
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| !i.lit));
    }

    #[test]
    fn test_shared_geometry_has_one_key() {
        let geometry = Arc::new(cuboid(1.0, 1.0, 1.0));
        assert_eq!(geometry_key(&geometry), geometry_key(&geometry.clone()));
        let other = Arc::new(cuboid(1.0, 1.0, 1.0));
        assert_ne!(geometry_key(&geometry), geometry_key(&other));
    }
}
