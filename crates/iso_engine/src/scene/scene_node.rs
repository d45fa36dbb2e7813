//! Scene nodes and layer membership

use bitflags::bitflags;

use crate::animation::SpritePose;
use crate::coords::{DepthKey, IsoPoint};

/// Fixed rendering layers, painted in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Diamond ground tiles
    Ground = 0,
    /// Buildings and other static structures (depth sorted)
    Structures = 1,
    /// Mobile entities (depth sorted)
    Entities = 2,
    /// Transient world-space markers
    Effects = 3,
    /// Screen-fixed widgets, not affected by the camera
    Overlay = 4,
}

impl Layer {
    /// Every layer in paint order
    pub const ALL: [Layer; 5] = [
        Layer::Ground,
        Layer::Structures,
        Layer::Entities,
        Layer::Effects,
        Layer::Overlay,
    ];

    /// Position in the paint order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether children are re-sorted by depth key when dirty
    pub fn is_depth_sorted(self) -> bool {
        matches!(self, Layer::Structures | Layer::Entities)
    }

    /// Whether nodes are placed in screen space instead of world space
    pub fn is_screen_fixed(self) -> bool {
        self == Layer::Overlay
    }

    /// Single-layer mask
    pub fn mask(self) -> LayerMask {
        match self {
            Layer::Ground => LayerMask::GROUND,
            Layer::Structures => LayerMask::STRUCTURES,
            Layer::Entities => LayerMask::ENTITIES,
            Layer::Effects => LayerMask::EFFECTS,
            Layer::Overlay => LayerMask::OVERLAY,
        }
    }
}

bitflags! {
    /// Set of layers used to filter painting and queries
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LayerMask: u8 {
        /// Ground tiles
        const GROUND = 1 << 0;
        /// Structures
        const STRUCTURES = 1 << 1;
        /// Mobile entities
        const ENTITIES = 1 << 2;
        /// Effects
        const EFFECTS = 1 << 3;
        /// Screen-fixed overlay
        const OVERLAY = 1 << 4;
        /// Everything under the camera transform
        const WORLD = Self::GROUND.bits() | Self::STRUCTURES.bits() | Self::ENTITIES.bits() | Self::EFFECTS.bits();
    }
}

impl LayerMask {
    /// Whether the mask includes a layer
    pub fn includes(self, layer: Layer) -> bool {
        self.contains(layer.mask())
    }
}

/// World-space markers drawn in the effects layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Grid cell a dragged structure will snap to on release
    SnapMarker,
}

/// Screen-fixed widgets drawn in the overlay layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayWidget {
    /// Full-screen night darkening
    NightTint,
    /// Time-of-day readout
    Clock,
}

/// What a node draws as
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// One diamond ground tile
    GroundTile {
        /// Tile column
        column: i32,
        /// Tile row
        row: i32,
    },
    /// An iso box with a footprint in backend units
    Structure {
        /// Footprint width in backend units
        width: f32,
        /// Footprint depth in backend units
        height: f32,
        /// Location type, selects the palette
        category: String,
        /// Display name
        label: String,
    },
    /// A procedurally drawn figure
    MobileEntity {
        /// Entity category, selects the palette
        category: String,
        /// Display name
        label: String,
        /// Animation pose to draw
        pose: SpritePose,
    },
    /// A world-space effect
    Effect(EffectKind),
    /// A screen-fixed widget
    Overlay(OverlayWidget),
}

impl NodeKind {
    /// The layer this kind of node lives in
    pub fn layer(&self) -> Layer {
        match self {
            NodeKind::GroundTile { .. } => Layer::Ground,
            NodeKind::Structure { .. } => Layer::Structures,
            NodeKind::MobileEntity { .. } => Layer::Entities,
            NodeKind::Effect(_) => Layer::Effects,
            NodeKind::Overlay(_) => Layer::Overlay,
        }
    }
}

/// A drawable element of the scene
///
/// Position changes go through [`crate::scene::SceneGraph`] so the depth key
/// and the owning layer's sort state stay consistent.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(crate) kind: NodeKind,
    pub(crate) layer: Layer,
    pub(crate) position: IsoPoint,
    pub(crate) depth: DepthKey,
    pub(crate) visible: bool,
    pub(crate) owner: Option<String>,
    pub(crate) alpha: f32,
    pub(crate) scale: f32,
}

impl SceneNode {
    /// Create a visible, opaque node
    pub fn new(kind: NodeKind, position: IsoPoint) -> Self {
        let layer = kind.layer();
        Self {
            kind,
            layer,
            position,
            depth: DepthKey::of(position),
            visible: true,
            owner: None,
            alpha: 1.0,
            scale: 1.0,
        }
    }

    /// Set the id of the external entity this node represents
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the initial alpha
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Set initial visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// What the node draws as
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Owning layer
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Position in world space (screen space for overlay nodes)
    pub fn position(&self) -> IsoPoint {
        self.position
    }

    /// Paint-order key derived from the position
    pub fn depth(&self) -> DepthKey {
        self.depth
    }

    /// Whether the node is drawn
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Id of the external entity this node represents
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Opacity in `[0, 1]`
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Uniform draw scale
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_determines_layer() {
        let tile = SceneNode::new(NodeKind::GroundTile { column: 0, row: 0 }, IsoPoint::default());
        let marker = SceneNode::new(NodeKind::Effect(EffectKind::SnapMarker), IsoPoint::default());
        assert_eq!(tile.layer(), Layer::Ground);
        assert_eq!(marker.layer(), Layer::Effects);
    }

    #[test]
    fn test_world_mask_excludes_overlay() {
        assert!(LayerMask::WORLD.includes(Layer::Entities));
        assert!(!LayerMask::WORLD.includes(Layer::Overlay));
    }

    #[test]
    fn test_only_structures_and_entities_sort() {
        let sorted: Vec<Layer> = Layer::ALL.into_iter().filter(|l| l.is_depth_sorted()).collect();
        assert_eq!(sorted, vec![Layer::Structures, Layer::Entities]);
    }
}
