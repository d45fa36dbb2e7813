//! Scene management
//!
//! Layered node storage with depth ordering, and the 2D view camera.

pub mod camera;
pub mod scene_graph;
pub mod scene_node;

pub use camera::Camera;
pub use scene_graph::SceneGraph;
pub use scene_node::{EffectKind, Layer, LayerMask, NodeKind, OverlayWidget, SceneNode};
