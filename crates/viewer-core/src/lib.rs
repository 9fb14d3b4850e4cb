// Library crate: the headless viewer core shared by the desktop app and the
// WebAssembly binding. Nothing in here touches a GPU or a window.

pub mod config;
pub mod context;
pub mod fixtures;
pub mod harness;
pub mod loader;
pub mod mesh_index;
pub mod scene;
pub mod selection;
pub mod viewer;

/// Camera, orbit controls and ray casting.
pub mod viewport {
    pub mod camera;
    pub mod picking;
}

pub use config::ViewerSettings;
pub use context::{Lighting, ViewerContext};
pub use loader::{LoadError, LoadedModel};
pub use mesh_index::MeshPositionIndex;
pub use scene::{Geometry, Material, MaterialRef, Node, NodeId, NodeKind, Scene};
pub use viewer::{InteractionMode, PointerOutcome, Viewer};
