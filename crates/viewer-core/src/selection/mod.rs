//! Click and box selection trackers.
//!
//! Both trackers highlight by swapping in a copy of a node's material with a
//! different emissive color. Shared material handles are never mutated.

mod box_select;
mod click;
pub mod selection_box;

use shared::ElementId;

use crate::scene::{NodeId, Scene};

pub use box_select::BoxSelection;
pub use click::ClickSelection;
pub use selection_box::SelectionBox;

/// External element id of `node`, `None` for no node or a stale handle
pub fn element_id(scene: &Scene, node: Option<NodeId>) -> Option<ElementId> {
    let node = scene.get(node?)?;
    node.user_data.element_id.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    #[test]
    fn test_element_id_null_safe() {
        let mut scene = Scene::new();
        let root = scene.root();
        let tagged = scene.add_node(root, Node::group("tagged").with_element_id("E-1"));
        let plain = scene.add_node(root, Node::group("plain"));

        assert_eq!(element_id(&scene, None), None);
        assert_eq!(element_id(&scene, Some(plain)), None);
        assert_eq!(element_id(&scene, Some(tagged)).as_deref(), Some("E-1"));

        scene.remove_subtree(tagged);
        assert_eq!(element_id(&scene, Some(tagged)), None);
    }
}
