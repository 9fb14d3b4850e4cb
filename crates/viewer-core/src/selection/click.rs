use std::collections::HashMap;

use shared::{Color, ElementId};

use super::element_id;
use crate::context::ViewerContext;
use crate::scene::{emissive_copy, MaterialRef, NodeId, Scene};
use crate::viewport::picking::Raycaster;

/// Single-click selection: the nearest hit node and its subtree are highlighted.
///
/// Original materials are kept per node, so restoring does not depend on the
/// order the subtree is walked in.
#[derive(Debug, Clone)]
pub struct ClickSelection {
    last_selected: Option<NodeId>,
    saved: HashMap<NodeId, MaterialRef>,
    highlight: Color,
    raycaster: Raycaster,
}

impl ClickSelection {
    pub fn new(highlight: Color) -> Self {
        Self {
            last_selected: None,
            saved: HashMap::new(),
            highlight,
            raycaster: Raycaster::default(),
        }
    }

    pub fn highlight(&self) -> Color {
        self.highlight
    }

    pub fn set_highlight(&mut self, color: Color) {
        self.highlight = color;
    }

    /// Currently selected node
    pub fn selected(&self) -> Option<NodeId> {
        self.last_selected
    }

    /// Number of materials waiting to be restored
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    /// Original material saved for `node`, if it is highlighted
    pub fn saved_material(&self, node: NodeId) -> Option<&MaterialRef> {
        self.saved.get(&node)
    }

    /// Pick at a screen position and move the selection there.
    /// Returns the element id of the hit node. Without a canvas this is a no-op.
    pub fn on_pointer_down(&mut self, ctx: &mut ViewerContext, x: f32, y: f32) -> Option<ElementId> {
        let ray = ctx.screen_ray(x, y)?;
        let root = ctx.scene.root();
        let hit = self
            .raycaster
            .nearest(&ctx.scene, root, &ray)
            .map(|hit| hit.node);

        self.select(&mut ctx.scene, hit);
        element_id(&ctx.scene, hit)
    }

    /// Move the selection to `hit`; `None` clears it.
    /// Selecting the already selected node changes nothing.
    pub fn select(&mut self, scene: &mut Scene, hit: Option<NodeId>) {
        if hit == self.last_selected {
            return;
        }

        self.restore(scene);

        let Some(node) = hit.filter(|id| scene.contains(*id)) else {
            return;
        };

        let subtree: Vec<NodeId> = scene.breadth_first(node).collect();
        for id in subtree {
            let Some(original) = scene.get(id).and_then(|n| n.material()).cloned() else {
                continue;
            };
            let Some(copy) = emissive_copy(&original, self.highlight) else {
                continue;
            };
            scene.set_material(id, Some(copy));
            self.saved.insert(id, original);
        }

        self.last_selected = Some(node);
        tracing::debug!(
            "Selected {:?} ({} materials highlighted)",
            node,
            self.saved.len()
        );
    }

    /// Put every saved material back and forget the selection.
    /// Nodes removed from the scene in the meantime are skipped.
    pub fn restore(&mut self, scene: &mut Scene) {
        for (id, original) in self.saved.drain() {
            if scene.contains(id) {
                scene.set_material(id, Some(original));
            }
        }
        self.last_selected = None;
    }
}

impl Default for ClickSelection {
    fn default() -> Self {
        Self::new(Color::CLICK_HIGHLIGHT)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::scene::{cuboid, Material, Node};

    /// group ─ a (standard)
    ///       ├ b (standard, shares a's material)
    ///       └ c (basic, no emissive)
    fn assembly() -> (Scene, NodeId, [NodeId; 3], MaterialRef) {
        let mut scene = Scene::new();
        let root = scene.root();
        let geom = Arc::new(cuboid(1.0, 1.0, 1.0));
        let shared_mat = Arc::new(Material::standard(Color::WHITE));
        let group = scene.add_node(root, Node::group("group"));
        let a = scene.add_node(group, Node::mesh("a", geom.clone(), Some(shared_mat.clone())));
        let b = scene.add_node(group, Node::mesh("b", geom.clone(), Some(shared_mat.clone())));
        let c = scene.add_node(
            group,
            Node::mesh("c", geom, Some(Arc::new(Material::basic(Color::from_hex(0x0000FF))))),
        );
        (scene, group, [a, b, c], shared_mat)
    }

    fn emissive(scene: &Scene, id: NodeId) -> Option<Color> {
        scene.get(id).and_then(|n| n.material()).and_then(|m| m.emissive)
    }

    #[test]
    fn test_select_subtree_highlights_emissive_materials() {
        let (mut scene, group, [a, b, c], shared_mat) = assembly();
        let mut sel = ClickSelection::default();
        sel.select(&mut scene, Some(group));

        assert_eq!(sel.selected(), Some(group));
        assert_eq!(sel.saved_count(), 2);
        assert_eq!(emissive(&scene, a), Some(Color::CLICK_HIGHLIGHT));
        assert_eq!(emissive(&scene, b), Some(Color::CLICK_HIGHLIGHT));
        assert_eq!(emissive(&scene, c), None);
        // the shared material itself is untouched
        assert_eq!(shared_mat.emissive, Some(Color::BLACK));
    }

    #[test]
    fn test_restore_returns_original_handles() {
        let (mut scene, group, [a, b, _], shared_mat) = assembly();
        let mut sel = ClickSelection::default();
        sel.select(&mut scene, Some(group));
        sel.select(&mut scene, None);

        assert_eq!(sel.selected(), None);
        assert_eq!(sel.saved_count(), 0);
        for id in [a, b] {
            let m = scene.get(id).unwrap().material().unwrap();
            assert!(Arc::ptr_eq(m, &shared_mat));
        }
    }

    #[test]
    fn test_switching_selection_keeps_one_highlight() {
        let (mut scene, _, [a, b, _], _) = assembly();
        let mut sel = ClickSelection::default();
        sel.select(&mut scene, Some(a));
        sel.select(&mut scene, Some(b));

        assert_eq!(sel.saved_count(), 1);
        assert_eq!(emissive(&scene, a), Some(Color::BLACK));
        assert_eq!(emissive(&scene, b), Some(Color::CLICK_HIGHLIGHT));
    }

    #[test]
    fn test_reselecting_same_node_is_noop() {
        let (mut scene, _, [a, ..], _) = assembly();
        let mut sel = ClickSelection::default();
        sel.select(&mut scene, Some(a));
        let highlighted = scene.get(a).unwrap().material().cloned().unwrap();
        sel.select(&mut scene, Some(a));
        let again = scene.get(a).unwrap().material().cloned().unwrap();
        assert!(Arc::ptr_eq(&highlighted, &again));
        assert_eq!(sel.saved_count(), 1);
    }

    #[test]
    fn test_restore_skips_removed_nodes() {
        let (mut scene, group, [a, ..], _) = assembly();
        let mut sel = ClickSelection::default();
        sel.select(&mut scene, Some(group));
        scene.remove_subtree(a);
        sel.restore(&mut scene);
        assert_eq!(sel.saved_count(), 0);
        assert!(!scene.contains(a));
    }

    #[test]
    fn test_restore_without_selection_is_safe() {
        let (mut scene, ..) = assembly();
        let mut sel = ClickSelection::default();
        sel.restore(&mut scene);
        sel.restore(&mut scene);
        assert_eq!(sel.selected(), None);
    }
}
