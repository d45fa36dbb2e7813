//! Specialized collection types

pub use slotmap::{SlotMap, SecondaryMap};

slotmap::new_key_type! {
    /// Stable handle to a node in the scene graph
    pub struct NodeKey;

    /// Stable handle to a running tween
    pub struct TweenKey;
}
