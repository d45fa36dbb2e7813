//! # Layered Scene Graph
//!
//! Nodes live in a slot map and are referenced by [`NodeKey`]. Each layer
//! keeps an ordered child list; the structure and entity layers are sorted by
//! depth key lazily, only when something changed their order.
//!
//! A move only dirties the layer when it changes the node's depth key, so
//! idle nodes that are re-positioned onto the same spot cost nothing.

use crate::coords::{DepthKey, IsoPoint};
use crate::foundation::collections::{NodeKey, SlotMap};
use crate::tween::{TweenProperty, Tweenable};

use super::camera::Camera;
use super::scene_node::{Layer, LayerMask, NodeKind, SceneNode};

#[derive(Debug, Default, Clone)]
struct LayerList {
    children: Vec<NodeKey>,
    dirty: bool,
}

/// Layered container for every drawable node, plus the view camera
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
    layers: [LayerList; 5],
    camera: Camera,
}

impl SceneGraph {
    /// Create an empty graph viewed through `camera`
    pub fn new(camera: Camera) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            layers: Default::default(),
            camera,
        }
    }

    /// Insert a node into its kind's layer
    pub fn add(&mut self, node: SceneNode) -> NodeKey {
        let layer = node.layer;
        let key = self.nodes.insert(node);
        let list = &mut self.layers[layer.index()];
        list.children.push(key);
        list.dirty = true;
        key
    }

    /// Remove a node; returns it if it existed
    pub fn remove(&mut self, key: NodeKey) -> Option<SceneNode> {
        let node = self.nodes.remove(key)?;
        let list = &mut self.layers[node.layer.index()];
        list.children.retain(|&child| child != key);
        list.dirty = true;
        Some(node)
    }

    /// Remove every node in a layer
    pub fn clear_layer(&mut self, layer: Layer) {
        let children = std::mem::take(&mut self.layers[layer.index()].children);
        for key in children {
            self.nodes.remove(key);
        }
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.layers = Default::default();
    }

    /// Look up a node
    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Whether a node exists
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Total node count
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node count of one layer
    pub fn layer_len(&self, layer: Layer) -> usize {
        self.layers[layer.index()].children.len()
    }

    /// Whether a layer is waiting to be re-sorted
    pub fn is_dirty(&self, layer: Layer) -> bool {
        self.layers[layer.index()].dirty
    }

    /// Move a node; returns false if it does not exist
    pub fn set_position(&mut self, key: NodeKey, position: IsoPoint) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };
        node.position = position;
        let depth = DepthKey::of(position);
        if depth != node.depth {
            node.depth = depth;
            self.layers[node.layer.index()].dirty = true;
        }
        true
    }

    /// Set a node's opacity, clamped to `[0, 1]`
    pub fn set_alpha(&mut self, key: NodeKey, alpha: f32) -> bool {
        self.nodes.get_mut(key).map(|node| node.alpha = alpha.clamp(0.0, 1.0)).is_some()
    }

    /// Set a node's draw scale
    pub fn set_scale(&mut self, key: NodeKey, scale: f32) -> bool {
        self.nodes.get_mut(key).map(|node| node.scale = scale.max(0.0)).is_some()
    }

    /// Show or hide a node
    pub fn set_visible(&mut self, key: NodeKey, visible: bool) -> bool {
        self.nodes.get_mut(key).map(|node| node.visible = visible).is_some()
    }

    /// Mutable access to what a node draws as; the layer cannot change
    pub fn kind_mut(&mut self, key: NodeKey) -> Option<&mut NodeKind> {
        self.nodes.get_mut(key).map(|node| &mut node.kind)
    }

    /// Re-sort every dirty depth-sorted layer
    ///
    /// The sort is stable, so nodes with identical keys keep insertion order.
    pub fn sort_dirty_layers(&mut self) {
        let nodes = &self.nodes;
        for layer in Layer::ALL {
            let list = &mut self.layers[layer.index()];
            if !list.dirty {
                continue;
            }
            if layer.is_depth_sorted() {
                list.children.sort_by_key(|&key| nodes.get(key).map(|node| node.depth).unwrap_or_default());
            }
            list.dirty = false;
        }
    }

    /// Visible nodes of the selected layers, back to front
    pub fn paint_order(&mut self, mask: LayerMask) -> Vec<NodeKey> {
        self.sort_dirty_layers();
        Layer::ALL
            .into_iter()
            .filter(|&layer| mask.includes(layer))
            .flat_map(|layer| self.layers[layer.index()].children.iter().copied())
            .filter(|&key| self.nodes.get(key).is_some_and(|node| node.visible))
            .collect()
    }

    /// Visible nodes of the selected layers within `radius` of a world point, nearest first
    pub fn nodes_in_radius(&self, mask: LayerMask, point: IsoPoint, radius: f32) -> Vec<(NodeKey, f32)> {
        let mut hits: Vec<(NodeKey, f32)> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.visible && mask.includes(node.layer) && !node.layer.is_screen_fixed())
            .map(|(key, node)| (key, node.position.distance(point)))
            .filter(|&(_, distance)| distance <= radius)
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }

    /// The view camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the view camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}

impl Tweenable for SceneGraph {
    fn read_property(&self, target: NodeKey, property: TweenProperty) -> Option<f32> {
        let node = self.nodes.get(target)?;
        Some(match property {
            TweenProperty::X => node.position.x,
            TweenProperty::Y => node.position.y,
            TweenProperty::Alpha => node.alpha,
            TweenProperty::Scale => node.scale,
        })
    }

    fn write_property(&mut self, target: NodeKey, property: TweenProperty, value: f32) -> bool {
        match property {
            TweenProperty::X | TweenProperty::Y => {
                let Some(current) = self.nodes.get(target).map(|node| node.position) else {
                    return false;
                };
                let position = if property == TweenProperty::X {
                    IsoPoint::new(value, current.y)
                } else {
                    IsoPoint::new(current.x, value)
                };
                self.set_position(target, position)
            }
            TweenProperty::Alpha => self.set_alpha(target, value),
            TweenProperty::Scale => self.set_scale(target, value),
        }
    }
}
