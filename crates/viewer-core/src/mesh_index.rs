//! Mesh name → world position lookup for label placement.

use std::collections::BTreeMap;

use glam::Vec3;
use shared::MeshPosition;

use crate::scene::{NodeId, Scene};

/// Read-only map from mesh name to its world-space position at build time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshPositionIndex {
    positions: BTreeMap<String, Vec3>,
}

impl MeshPositionIndex {
    /// Walk every descendant of `root` and record the world position of each
    /// mesh node. On a name collision the last mesh visited (depth-first) wins.
    pub fn build(scene: &Scene, root: NodeId) -> Self {
        let mut positions = BTreeMap::new();
        for id in scene.depth_first(root) {
            let Some(node) = scene.get(id) else {
                continue;
            };
            if !node.is_mesh() {
                continue;
            }
            let position = scene.world_position(id);
            if positions.insert(node.name.clone(), position).is_some() {
                tracing::warn!("Duplicate mesh name '{}', keeping the last position", node.name);
            }
        }
        Self { positions }
    }

    pub fn get(&self, name: &str) -> Option<Vec3> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Entries sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec3)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Plain serializable copy for hosts (JSON, wasm)
    pub fn to_map(&self) -> BTreeMap<String, MeshPosition> {
        self.positions
            .iter()
            .map(|(k, v)| (k.clone(), MeshPosition::from(v.to_array())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::scene::{cuboid, Node};

    #[test]
    fn test_duplicate_name_last_wins() {
        let mut scene = Scene::new();
        let root = scene.root();
        let geom = Arc::new(cuboid(1.0, 1.0, 1.0));
        scene.add_node(root, Node::mesh("dup", geom.clone(), None).with_translation(Vec3::X));
        scene.add_node(root, Node::mesh("dup", geom, None).with_translation(Vec3::Y));

        let index = MeshPositionIndex::build(&scene, root);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("dup"), Some(Vec3::Y));
    }

    #[test]
    fn test_groups_are_not_indexed() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.add_node(root, Node::group("g"));
        assert!(MeshPositionIndex::build(&scene, root).is_empty());
    }

    #[test]
    fn test_to_map_serializes_positions() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.add_node(
            root,
            Node::mesh("m", Arc::new(cuboid(1.0, 1.0, 1.0)), None).with_translation(Vec3::new(1.0, 2.0, 3.0)),
        );
        let map = MeshPositionIndex::build(&scene, root).to_map();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"m":{"x":1.0,"y":2.0,"z":3.0}}"#);
    }
}
