//! glTF 2.0 model loading and fitting.
//!
//! A model becomes a detached [`Scene`] whose root group is named after the
//! model. Each glTF node keeps its name, TRS transform and `ElementID` extras.
//! Nodes whose mesh has several primitives turn into a group with one mesh
//! child per primitive; the children inherit the element id.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3};
use shared::{Color, ElementId, LoadProgress, ELEMENT_ID_KEY};

use crate::scene::{Geometry, Material, MaterialRef, Node, NodeId, Scene, Transform};
use crate::viewport::camera::OrbitCamera;

const READ_CHUNK: usize = 64 * 1024;

/// Error type for model loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Missing position data for mesh: {0}")]
    MissingPositions(String),

    #[error("Model has no scene")]
    EmptyScene,
}

/// A loaded model, not yet part of any viewer scene
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub scene: Scene,
    pub mesh_count: usize,
}

/// Read a `.gltf`/`.glb` file, reporting progress per chunk read.
/// External buffers are resolved relative to the file.
pub fn load_gltf_path(
    path: impl AsRef<Path>,
    mut on_progress: impl FnMut(LoadProgress),
) -> Result<LoadedModel, LoadError> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path)?;
    let total = file.metadata().ok().map(|m| m.len());

    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        on_progress(LoadProgress {
            loaded: bytes.len() as u64,
            total,
        });
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let model = import(&bytes, path.parent(), name)?;

    tracing::info!(
        "Loaded {}: {} nodes, {} meshes",
        path.display(),
        model.scene.len(),
        model.mesh_count
    );
    Ok(model)
}

/// Import a model held in memory. Only embedded or GLB buffers can be resolved.
pub fn load_gltf_slice(bytes: &[u8]) -> Result<LoadedModel, LoadError> {
    let model = import(bytes, None, "model".to_string())?;
    tracing::info!(
        "Loaded model from memory: {} nodes, {} meshes",
        model.scene.len(),
        model.mesh_count
    );
    Ok(model)
}

fn import(bytes: &[u8], base: Option<&Path>, name: String) -> Result<LoadedModel, LoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base, blob)?;

    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::EmptyScene)?;

    let mut builder = ModelBuilder {
        scene: Scene::with_root(Node::group(name.clone())),
        buffers: &buffers,
        materials: HashMap::new(),
        mesh_count: 0,
    };
    let root = builder.scene.root();
    for node in gltf_scene.nodes() {
        builder.add_node(root, &node)?;
    }

    Ok(LoadedModel {
        name,
        mesh_count: builder.mesh_count,
        scene: builder.scene,
    })
}

struct ModelBuilder<'a> {
    scene: Scene,
    buffers: &'a [gltf::buffer::Data],
    /// One shared handle per glTF material index (`None` = default material)
    materials: HashMap<Option<usize>, MaterialRef>,
    mesh_count: usize,
}

impl ModelBuilder<'_> {
    fn add_node(&mut self, parent: NodeId, node: &gltf::Node) -> Result<(), LoadError> {
        let name = node
            .name()
            .or_else(|| node.mesh().and_then(|m| m.name()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()));
        let (t, r, s) = node.transform().decomposed();
        let transform = Transform {
            translation: Vec3::from(t),
            rotation: Quat::from_array(r),
            scale: Vec3::from(s),
        };
        let element_id = element_id_from_extras(node.extras());

        let mut primitives = Vec::new();
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    tracing::warn!("Skipping non-triangle primitive in '{}'", name);
                    continue;
                }
                let geometry = self.read_geometry(&primitive, &name)?;
                let material = self.material(&primitive.material());
                primitives.push((geometry, material));
            }
        }

        let id = if primitives.len() == 1 {
            let (geometry, material) = primitives.remove(0);
            self.mesh_count += 1;
            let mesh = Node::mesh(name, Arc::new(geometry), Some(material));
            self.scene
                .add_node(parent, with_element_id(mesh.with_transform(transform), &element_id))
        } else {
            let group = Node::group(name.clone()).with_transform(transform);
            let id = self.scene.add_node(parent, with_element_id(group, &element_id));
            for (i, (geometry, material)) in primitives.into_iter().enumerate() {
                self.mesh_count += 1;
                let mesh = Node::mesh(format!("{name}_{i}"), Arc::new(geometry), Some(material));
                self.scene.add_node(id, with_element_id(mesh, &element_id));
            }
            id
        };

        for child in node.children() {
            self.add_node(id, &child)?;
        }
        Ok(())
    }

    fn read_geometry(&self, primitive: &gltf::Primitive, name: &str) -> Result<Geometry, LoadError> {
        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| LoadError::MissingPositions(name.to_string()))?
            .map(Vec3::from)
            .collect();
        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|iter| iter.map(Vec3::from).collect())
            .unwrap_or_default();
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|iter| iter.into_u32().collect())
            .unwrap_or_default();

        Ok(Geometry::new(positions, normals, indices))
    }

    fn material(&mut self, material: &gltf::Material) -> MaterialRef {
        self.materials
            .entry(material.index())
            .or_insert_with(|| {
                let [r, g, b, _] = material.pbr_metallic_roughness().base_color_factor();
                let mut converted = Material::standard(Color::from_rgb_f32([r, g, b]));
                converted.emissive = Some(Color::from_rgb_f32(material.emissive_factor()));
                if let Some(name) = material.name() {
                    converted = converted.named(name);
                }
                Arc::new(converted)
            })
            .clone()
    }
}

fn with_element_id(node: Node, element_id: &Option<ElementId>) -> Node {
    match element_id {
        Some(id) => node.with_element_id(id.clone()),
        None => node,
    }
}

/// `ElementID` from node extras; numbers are accepted and stringified
fn element_id_from_extras(extras: &gltf::json::extras::Extras) -> Option<ElementId> {
    let raw = extras.as_ref()?;
    let value: serde_json::Value = serde_json::from_str(raw.get()).ok()?;
    match value.get(ELEMENT_ID_KEY)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Center the model on the origin and scale it to fill `fill` of the view.
///
/// `group` is the wrapper that carries scale and auto-rotation, `inner` the
/// imported root below it. Returns the applied scale.
pub fn fit_model(scene: &mut Scene, group: NodeId, inner: NodeId, camera: &OrbitCamera, fill: f32) -> f32 {
    if let Some(node) = scene.get_mut(group) {
        node.transform = Transform::IDENTITY;
    }
    if let Some(node) = scene.get_mut(inner) {
        node.transform.translation = Vec3::ZERO;
    }

    // measured in the wrapper's frame, which is the world frame while it is identity
    let Some(bounds) = scene
        .world_bounding_box(inner)
        .map(|bb| bb.transformed(&scene.world_matrix(group).inverse()))
    else {
        return 1.0;
    };

    let center = bounds.center();
    if let Some(node) = scene.get_mut(inner) {
        node.transform.translation -= center;
    }

    let radius = bounds.size().length() * 0.5;
    let half_view = camera.distance * (camera.fov * 0.5).tan();
    let scale = if radius > f32::EPSILON {
        fill * half_view / radius
    } else {
        1.0
    };
    if let Some(node) = scene.get_mut(group) {
        node.transform.scale = Vec3::splat(scale);
    }

    tracing::debug!("Fitted model: center {:?}, scale {}", center, scale);
    scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{assembly_glb, FixturePart};

    #[test]
    fn test_load_slice_reads_nodes_and_element_ids() {
        let glb = assembly_glb(&[
            FixturePart::new("bolt", [1.0, 0.0, 0.0]).element_id("E-1"),
            FixturePart::new("nut", [-1.0, 0.0, 0.0]),
        ]);
        let model = load_gltf_slice(&glb).unwrap();
        assert_eq!(model.mesh_count, 2);

        let bolt = model.scene.find_by_name("bolt").unwrap();
        let node = model.scene.get(bolt).unwrap();
        assert!(node.is_mesh());
        assert_eq!(node.user_data.element_id.as_deref(), Some("E-1"));
        assert_eq!(node.transform.translation, Vec3::new(1.0, 0.0, 0.0));

        let nut = model.scene.find_by_name("nut").unwrap();
        assert_eq!(model.scene.get(nut).unwrap().user_data.element_id, None);
    }

    #[test]
    fn test_materials_shared_per_index() {
        let glb = assembly_glb(&[
            FixturePart::new("a", [0.0; 3]),
            FixturePart::new("b", [2.0, 0.0, 0.0]),
        ]);
        let model = load_gltf_slice(&glb).unwrap();
        let a = model.scene.find_by_name("a").unwrap();
        let b = model.scene.find_by_name("b").unwrap();
        let ma = model.scene.get(a).unwrap().material().unwrap();
        let mb = model.scene.get(b).unwrap().material().unwrap();
        assert!(Arc::ptr_eq(ma, mb));
        assert_eq!(ma.emissive, Some(Color::BLACK));
    }

    #[test]
    fn test_multi_primitive_node_becomes_group() {
        let glb = assembly_glb(&[FixturePart::new("housing", [0.0; 3]).element_id("H").two_primitives()]);
        let model = load_gltf_slice(&glb).unwrap();
        assert_eq!(model.mesh_count, 2);

        let housing = model.scene.find_by_name("housing").unwrap();
        let node = model.scene.get(housing).unwrap();
        assert!(!node.is_mesh());
        assert_eq!(node.children().len(), 2);
        for child in node.children() {
            let child = model.scene.get(*child).unwrap();
            assert!(child.is_mesh());
            assert_eq!(child.user_data.element_id.as_deref(), Some("H"));
        }
    }

    #[test]
    fn test_garbage_is_a_gltf_error() {
        let err = load_gltf_slice(b"definitely not gltf").unwrap_err();
        assert!(matches!(err, LoadError::Gltf(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_gltf_path("/nonexistent/model.glb", |_| {}).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_load_path_reports_progress() {
        let glb = assembly_glb(&[FixturePart::new("a", [0.0; 3])]);
        let path = std::env::temp_dir().join(format!("viewer_core_progress_{}.glb", std::process::id()));
        std::fs::write(&path, &glb).unwrap();

        let mut last = None;
        let model = load_gltf_path(&path, |p| last = Some(p)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(model.name, format!("viewer_core_progress_{}", std::process::id()));
        let last = last.unwrap();
        assert_eq!(last.loaded, glb.len() as u64);
        assert_eq!(last.fraction(), Some(1.0));
    }

    #[test]
    fn test_fit_model_centers_and_scales() {
        let glb = assembly_glb(&[
            FixturePart::new("a", [10.0, 0.0, 0.0]),
            FixturePart::new("b", [14.0, 0.0, 0.0]),
        ]);
        let model = load_gltf_slice(&glb).unwrap();
        let mut scene = Scene::new();
        let root = scene.root();
        let group = scene.add_node(root, Node::group("model"));
        let inner = scene.graft(group, model.scene);

        let camera = OrbitCamera::new();
        let scale = fit_model(&mut scene, group, inner, &camera, 0.8);
        assert!(scale > 0.0);

        let bb = scene.world_bounding_box(group).unwrap();
        assert!(bb.center().length() < 1e-4);
        let half_view = camera.distance * (camera.fov * 0.5).tan();
        assert!((bb.size().length() * 0.5 - 0.8 * half_view).abs() < 1e-3);
    }
}
