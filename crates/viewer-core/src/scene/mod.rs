//! Scene graph: an arena of nodes addressed by weak [`NodeId`] handles.
//!
//! A handle whose node has been removed resolves to `None` everywhere, so
//! selection state can hold on to handles across model reloads without
//! dangling. Freed slots are reused; the slot generation tells an old
//! handle apart from the node that took its place.

mod geometry;
mod material;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use shared::ElementId;

use crate::viewport::picking::Aabb;

pub use geometry::{cuboid, Geometry};
pub use material::{emissive_copy, Material, MaterialRef};

/// Weak handle to a node in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    /// Arena slot. Unique among live nodes, may be reused after removal.
    pub fn index(self) -> usize {
        self.index
    }
}

/// Local transform (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Application data attached to a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserData {
    /// External correlation id (glTF extras `ElementID`)
    pub element_id: Option<ElementId>,
}

/// What a node is
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Transform-only node
    Group,
    /// Renderable triangle mesh
    Mesh(Arc<Geometry>),
}

/// A node in the scene graph
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub material: Option<MaterialRef>,
    pub user_data: UserData,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group,
            transform: Transform::IDENTITY,
            material: None,
            user_data: UserData::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: Arc<Geometry>, material: Option<MaterialRef>) -> Self {
        Self {
            kind: NodeKind::Mesh(geometry),
            material,
            ..Self::group(name)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    pub fn with_element_id(mut self, id: impl Into<ElementId>) -> Self {
        self.user_data.element_id = Some(id.into());
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn material(&self) -> Option<&MaterialRef> {
        self.material.as_ref()
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    pub fn geometry(&self) -> Option<&Arc<Geometry>> {
        match &self.kind {
            NodeKind::Mesh(g) => Some(g),
            NodeKind::Group => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Scene graph arena with a single root group
#[derive(Debug, Clone)]
pub struct Scene {
    slots: Vec<Slot>,
    /// Indices of empty slots, reused before the arena grows
    free: Vec<usize>,
    live: usize,
    root: NodeId,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_root(Node::group("Scene"))
    }

    /// Scene whose root is `root` (used for detached model fragments)
    pub fn with_root(mut root: Node) -> Self {
        root.parent = None;
        root.children.clear();
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            live: 1,
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    /// Allocated slots, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Empty the slot of `id` and bump its generation so old handles go stale
    fn release(&mut self, id: NodeId) -> Option<Node> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(node)
    }

    /// Append `node` as the last child of `parent`.
    /// A stale `parent` handle attaches the node to the root instead.
    pub fn add_node(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let parent = if self.contains(parent) {
            parent
        } else {
            tracing::warn!("Parent {:?} no longer exists, attaching '{}' to root", parent, node.name);
            self.root
        };

        node.parent = Some(parent);
        node.children.clear();
        let id = self.allocate(node);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Remove `id` and all its descendants. The root cannot be removed.
    /// Returns the removed handles.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root || !self.contains(id) {
            return Vec::new();
        }

        let removed: Vec<NodeId> = self.depth_first(id).collect();
        if let Some(parent) = self.parent(id) {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        for r in &removed {
            self.release(*r);
        }
        removed
    }

    /// Move every node of `other` into this scene under `parent`.
    /// Returns the new handle of `other`'s root.
    pub fn graft(&mut self, parent: NodeId, mut other: Scene) -> NodeId {
        let order: Vec<NodeId> = other.depth_first(other.root).collect();
        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(order.len());
        let mut grafted_root = self.root;

        for old in order {
            let Some(node) = other.release(old) else {
                continue;
            };
            let new_parent = node
                .parent
                .and_then(|p| remap.get(&p).copied())
                .unwrap_or(parent);
            let new = self.add_node(new_parent, node);
            if old == other.root {
                grafted_root = new;
            }
            remap.insert(old, new);
        }

        grafted_root
    }

    /// Replace the material of `id`, returning the previous one
    pub fn set_material(&mut self, id: NodeId, material: Option<MaterialRef>) -> Option<MaterialRef> {
        let node = self.get_mut(id)?;
        std::mem::replace(&mut node.material, material)
    }

    /// Breadth-first walk starting at (and including) `start`
    pub fn breadth_first(&self, start: NodeId) -> BreadthFirst<'_> {
        let mut queue = VecDeque::new();
        if self.contains(start) {
            queue.push_back(start);
        }
        BreadthFirst { scene: self, queue }
    }

    /// Depth-first pre-order walk starting at (and including) `start`
    pub fn depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        let mut stack = Vec::new();
        if self.contains(start) {
            stack.push(start);
        }
        DepthFirst { scene: self, stack }
    }

    /// All mesh nodes in depth-first order
    pub fn mesh_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.depth_first(self.root)
            .filter(|id| self.get(*id).is_some_and(Node::is_mesh))
    }

    /// First node (depth-first) with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.depth_first(self.root)
            .find(|id| self.get(*id).is_some_and(|n| n.name == name))
    }

    pub fn local_matrix(&self, id: NodeId) -> Mat4 {
        self.get(id)
            .map(|n| n.transform.matrix())
            .unwrap_or(Mat4::IDENTITY)
    }

    /// Local → world matrix (product of all ancestor transforms)
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.local_matrix(id);
        let mut current = self.parent(id);
        while let Some(p) = current {
            matrix = self.local_matrix(p) * matrix;
            current = self.parent(p);
        }
        matrix
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    /// World-space box around every mesh in the subtree of `start`
    pub fn world_bounding_box(&self, start: NodeId) -> Option<Aabb> {
        let mut result: Option<Aabb> = None;
        for id in self.depth_first(start) {
            let Some(geometry) = self.get(id).and_then(Node::geometry) else {
                continue;
            };
            let local = geometry.bounding_box();
            if local.is_empty() {
                continue;
            }
            let world = local.transformed(&self.world_matrix(id));
            result = Some(match result {
                Some(acc) => acc.union(&world),
                None => world,
            });
        }
        result
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`Scene::breadth_first`]
pub struct BreadthFirst<'a> {
    scene: &'a Scene,
    queue: VecDeque<NodeId>,
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        self.queue.extend(self.scene.children(id).iter().copied());
        Some(id)
    }
}

/// Iterator returned by [`Scene::depth_first`]
pub struct DepthFirst<'a> {
    scene: &'a Scene,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.scene.children(id).iter().rev().copied());
        Some(id)
    }
}
