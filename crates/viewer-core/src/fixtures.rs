//! Factory functions for test scenes and in-memory glTF models.
//!
//! Used by unit and integration tests, and by the desktop app for the demo
//! scene shown when no model is given.

use std::sync::Arc;

use glam::Vec3;
use serde_json::{json, Value};
use shared::{Color, ELEMENT_ID_KEY};

use crate::scene::{cuboid, Material, Node, NodeId, Scene};

// ── Scene factories ─────────────────────────────────────────────

/// Fallback scene: two unit boxes with unlit blue materials,
/// `mesh1` at x = 5 and `mesh2` at y = 2.
pub fn demo_boxes() -> Scene {
    let mut scene = Scene::with_root(Node::group("demo"));
    let root = scene.root();
    let geometry = Arc::new(cuboid(1.0, 1.0, 1.0));
    let material = Arc::new(Material::basic(Color::from_hex(0x0000FF)));

    scene.add_node(
        root,
        Node::mesh("mesh1", geometry.clone(), Some(material.clone())).with_translation(Vec3::new(5.0, 0.0, 0.0)),
    );
    scene.add_node(
        root,
        Node::mesh("mesh2", geometry, Some(material)).with_translation(Vec3::new(0.0, 2.0, 0.0)),
    );
    scene
}

/// Add a unit box with its own lit white material under `parent`
pub fn add_box(scene: &mut Scene, parent: NodeId, name: &str, position: [f32; 3]) -> NodeId {
    let material = Arc::new(Material::standard(Color::WHITE));
    scene.add_node(
        parent,
        Node::mesh(name, Arc::new(cuboid(1.0, 1.0, 1.0)), Some(material)).with_translation(Vec3::from(position)),
    )
}

/// Row of unit boxes along X, spaced 2 apart and centered on the origin
pub fn box_row(names: &[&str]) -> Scene {
    let mut scene = Scene::new();
    let root = scene.root();
    let offset = names.len() as f32 - 1.0;
    for (i, name) in names.iter().enumerate() {
        add_box(&mut scene, root, name, [i as f32 * 2.0 - offset, 0.0, 0.0]);
    }
    scene
}

// ── glTF factories ──────────────────────────────────────────────

/// One part of an in-memory assembly model
#[derive(Debug, Clone)]
pub struct FixturePart {
    pub name: String,
    pub translation: [f32; 3],
    pub element_id: Option<String>,
    /// Mesh with two primitives instead of one
    pub two_primitives: bool,
}

impl FixturePart {
    pub fn new(name: &str, translation: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            translation,
            element_id: None,
            two_primitives: false,
        }
    }

    pub fn element_id(mut self, id: &str) -> Self {
        self.element_id = Some(id.to_string());
        self
    }

    pub fn two_primitives(mut self) -> Self {
        self.two_primitives = true;
        self
    }
}

/// Build a binary glTF (GLB) with one unit-cube node per part.
///
/// Mesh 0 is a single cube primitive using material 0. Mesh 1 has a second
/// cube primitive (shifted up by 1) without a material.
pub fn assembly_glb(parts: &[FixturePart]) -> Vec<u8> {
    let cube = cuboid(1.0, 1.0, 1.0);
    let raised: Vec<Vec3> = cube.positions.iter().map(|p| *p + Vec3::Y).collect();

    let mut bin = Vec::new();
    let mut views = Vec::new();
    let mut push_view = |data: Vec<u8>| {
        let offset = bin.len();
        bin.extend_from_slice(&data);
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        views.push(json!({ "buffer": 0, "byteOffset": offset, "byteLength": data.len() }));
        views.len() - 1
    };

    let positions = push_view(vec3_bytes(&cube.positions));
    let normals = push_view(vec3_bytes(&cube.normals));
    let indices = push_view(cube.indices.iter().flat_map(|i| i.to_le_bytes()).collect());
    let raised_positions = push_view(vec3_bytes(&raised));

    let vertex_count = cube.positions.len();
    let accessors = vec![
        vec3_accessor(positions, vertex_count, Some(cube.positions.as_slice())),
        vec3_accessor(normals, vertex_count, None),
        json!({
            "bufferView": indices,
            "componentType": 5125,
            "count": cube.indices.len(),
            "type": "SCALAR"
        }),
        vec3_accessor(raised_positions, vertex_count, Some(raised.as_slice())),
    ];

    let meshes = json!([
        {
            "name": "cube",
            "primitives": [
                { "attributes": { "POSITION": 0, "NORMAL": 1 }, "indices": 2, "material": 0 }
            ]
        },
        {
            "name": "stacked",
            "primitives": [
                { "attributes": { "POSITION": 0, "NORMAL": 1 }, "indices": 2, "material": 0 },
                { "attributes": { "POSITION": 3, "NORMAL": 1 }, "indices": 2 }
            ]
        }
    ]);

    let nodes: Vec<Value> = parts
        .iter()
        .map(|part| {
            let mesh = if part.two_primitives { 1 } else { 0 };
            let mut node = json!({
                "name": part.name,
                "mesh": mesh,
                "translation": part.translation,
            });
            if let Some(id) = &part.element_id {
                node["extras"] = json!({ ELEMENT_ID_KEY: id });
            }
            node
        })
        .collect();

    let scene_nodes: Vec<usize> = (0..parts.len()).collect();
    let document = json!({
        "asset": { "version": "2.0", "generator": "viewer-core fixtures" },
        "scene": 0,
        "scenes": [ { "nodes": scene_nodes } ],
        "nodes": nodes,
        "meshes": meshes,
        "materials": [
            {
                "name": "steel",
                "pbrMetallicRoughness": { "baseColorFactor": [0.8, 0.8, 0.8, 1.0] }
            }
        ],
        "accessors": accessors,
        "bufferViews": views,
        "buffers": [ { "byteLength": bin.len() } ],
    });

    glb_container(document.to_string().into_bytes(), bin)
}

fn vec3_bytes(values: &[Vec3]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| v.to_array())
        .flat_map(f32::to_le_bytes)
        .collect()
}

fn vec3_accessor(view: usize, count: usize, bounds_of: Option<&[Vec3]>) -> Value {
    let mut accessor = json!({
        "bufferView": view,
        "componentType": 5126,
        "count": count,
        "type": "VEC3"
    });
    if let Some(points) = bounds_of {
        let min = points.iter().fold(Vec3::splat(f32::MAX), |acc, p| acc.min(*p));
        let max = points.iter().fold(Vec3::splat(f32::MIN), |acc, p| acc.max(*p));
        accessor["min"] = json!(min.to_array());
        accessor["max"] = json!(max.to_array());
    }
    accessor
}

/// Wrap a JSON chunk and a BIN chunk into a GLB container
fn glb_container(mut json_chunk: Vec<u8>, mut bin_chunk: Vec<u8>) -> Vec<u8> {
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json_chunk);

    out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin_chunk);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_boxes_layout() {
        let scene = demo_boxes();
        let mesh1 = scene.find_by_name("mesh1").unwrap();
        let mesh2 = scene.find_by_name("mesh2").unwrap();
        assert_eq!(scene.world_position(mesh1), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(scene.world_position(mesh2), Vec3::new(0.0, 2.0, 0.0));
        assert!(!scene.get(mesh1).unwrap().material().unwrap().has_emissive());
    }

    #[test]
    fn test_glb_header() {
        let glb = assembly_glb(&[FixturePart::new("a", [0.0; 3])]);
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);
    }

    #[test]
    fn test_box_row_is_centered() {
        let scene = box_row(&["A", "B", "C"]);
        let b = scene.find_by_name("B").unwrap();
        assert_eq!(scene.world_position(b), Vec3::ZERO);
    }
}
