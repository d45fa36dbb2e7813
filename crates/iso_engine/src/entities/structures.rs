//! Static structures and the drag gesture that relocates them

use std::collections::{BTreeMap, HashSet};

use crate::coords::{CoordinateTransform, GridPoint, IsoPoint};
use crate::core::config::EntityConfig;
use crate::foundation::collections::{NodeKey, SecondaryMap, TweenKey};
use crate::foundation::math::Vec2;
use crate::scene::{EffectKind, NodeKind, SceneGraph, SceneNode};
use crate::tween::{Easing, TweenEngine, TweenProperty, TweenRequest};

use super::feed::{latest_by_id, FootprintSize, StructureBrief};
use super::{EntityLifecycle, ReconcileReport};

/// A finished drag: the structure now sits on this grid cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragCommit {
    /// Structure id
    pub id: String,
    /// Grid column
    pub x: i32,
    /// Grid row
    pub y: i32,
}

/// Local view of one structure
#[derive(Debug)]
pub struct StructureRecord {
    name: String,
    category: String,
    anchor: GridPoint,
    size: FootprintSize,
    node: NodeKey,
    motion: Option<TweenKey>,
}

impl StructureRecord {
    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location type
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Grid cell the footprint is centered on
    pub fn anchor(&self) -> GridPoint {
        self.anchor
    }

    /// Footprint in backend units
    pub fn size(&self) -> FootprintSize {
        self.size
    }

    /// Scene node
    pub fn node(&self) -> NodeKey {
        self.node
    }
}

#[derive(Debug)]
struct DragState {
    id: String,
    node: NodeKey,
    grab_offset: Vec2,
    origin: IsoPoint,
    marker: NodeKey,
}

/// Keeps one box node per structure and handles drag-to-relocate
pub struct StructureManager {
    transform: CoordinateTransform,
    config: EntityConfig,
    records: BTreeMap<String, StructureRecord>,
    owners: SecondaryMap<NodeKey, String>,
    drag: Option<DragState>,
    drag_enabled: bool,
}

impl StructureManager {
    /// Create an empty manager
    pub fn new(transform: CoordinateTransform, config: &EntityConfig, drag_enabled: bool) -> Self {
        Self {
            transform,
            config: config.clone(),
            records: BTreeMap::new(),
            owners: SecondaryMap::new(),
            drag: None,
            drag_enabled,
        }
    }

    /// Record of an id
    pub fn get(&self, id: &str) -> Option<&StructureRecord> {
        self.records.get(id)
    }

    /// Iterate records in id order
    pub fn records(&self) -> impl Iterator<Item = (&str, &StructureRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Whether pointer gestures may start a drag
    pub fn drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    /// Allow or forbid dragging; forbidding cancels a drag in progress
    pub fn set_drag_enabled(&mut self, enabled: bool, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        self.drag_enabled = enabled;
        if !enabled {
            self.cancel_drag(scene, tweens);
        }
    }

    /// Id of the structure being dragged
    pub fn dragged(&self) -> Option<&str> {
        self.drag.as_ref().map(|drag| drag.id.as_str())
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn snapped(&self, position: IsoPoint) -> IsoPoint {
        self.transform.backend_to_iso(self.transform.iso_to_backend(position))
    }

    /// Start dragging the structure within `radius` of `world`
    ///
    /// Returns false when dragging is disabled, a drag is already running, or
    /// nothing was hit.
    pub fn pointer_down(
        &mut self,
        world: IsoPoint,
        radius: f32,
        scene: &mut SceneGraph,
        tweens: &mut TweenEngine,
    ) -> bool {
        if !self.drag_enabled || self.drag.is_some() {
            return false;
        }
        let Some(id) = self.hit_test(scene, world, radius).map(str::to_owned) else {
            return false;
        };
        let Some(record) = self.records.get_mut(&id) else {
            return false;
        };
        let Some(origin) = scene.get(record.node).map(SceneNode::position) else {
            return false;
        };

        tweens.cancel_all_for(record.node);
        record.motion = None;
        scene.set_alpha(record.node, 1.0);
        let node = record.node;
        let marker = scene.add(SceneNode::new(NodeKind::Effect(EffectKind::SnapMarker), self.snapped(origin)));
        log::debug!("Drag started on {id}");
        self.drag = Some(DragState {
            id,
            node,
            grab_offset: origin.to_vec() - world.to_vec(),
            origin,
            marker,
        });
        true
    }

    /// Follow the pointer; returns false when no drag is running
    pub fn pointer_move(&mut self, world: IsoPoint, scene: &mut SceneGraph) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        let position = world.offset(drag.grab_offset);
        let (node, marker) = (drag.node, drag.marker);
        scene.set_position(node, position);
        scene.set_position(marker, self.snapped(position));
        true
    }

    /// Drop the structure on the grid cell under the pointer
    ///
    /// The returned commit is produced once per drag; releasing without a
    /// drag yields nothing.
    pub fn pointer_up(&mut self, world: IsoPoint, scene: &mut SceneGraph) -> Option<DragCommit> {
        let drag = self.drag.take()?;
        scene.remove(drag.marker);
        let grid = self.transform.iso_to_backend(world.offset(drag.grab_offset));
        scene.set_position(drag.node, self.transform.backend_to_iso(grid));
        if let Some(record) = self.records.get_mut(&drag.id) {
            record.anchor = grid;
        }
        log::info!("Structure {} dropped at ({}, {})", drag.id, grid.x, grid.y);
        Some(DragCommit { id: drag.id, x: grid.x, y: grid.y })
    }

    /// Abandon a drag, putting the structure back where it was
    ///
    /// A structure grabbed mid-slide, or moved by the feed while held, resumes
    /// sliding to its anchor from the restored position.
    pub fn cancel_drag(&mut self, scene: &mut SceneGraph, tweens: &mut TweenEngine) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        scene.remove(drag.marker);
        scene.set_position(drag.node, drag.origin);
        if let Some(record) = self.records.get_mut(&drag.id) {
            if self.transform.backend_to_iso(record.anchor) != drag.origin {
                Self::slide_to_anchor(&self.transform, &self.config, record, scene, tweens);
            }
        }
        log::debug!("Drag on {} cancelled", drag.id);
        true
    }

    fn slide_to_anchor(
        transform: &CoordinateTransform,
        config: &EntityConfig,
        record: &mut StructureRecord,
        scene: &mut SceneGraph,
        tweens: &mut TweenEngine,
    ) {
        let target = transform.backend_to_iso(record.anchor);
        let request = TweenRequest::new(record.node, config.structure_move_duration)
            .with_position(target.x, target.y)
            .with_easing(Easing::QuadOut);
        record.motion = tweens.create(scene, request);
    }

    fn create(&mut self, brief: &StructureBrief, anchor: GridPoint, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        let kind = NodeKind::Structure {
            width: brief.size.width,
            height: brief.size.height,
            category: brief.category.clone(),
            label: brief.name.clone(),
        };
        let position = self.transform.backend_to_iso(anchor);
        let node = scene.add(SceneNode::new(kind, position).with_owner(brief.id.clone()).with_alpha(0.0));
        tweens.create(
            scene,
            TweenRequest::new(node, self.config.fade_in_duration).with_end(TweenProperty::Alpha, 1.0),
        );
        self.owners.insert(node, brief.id.clone());
        self.records.insert(
            brief.id.clone(),
            StructureRecord {
                name: brief.name.clone(),
                category: brief.category.clone(),
                anchor,
                size: brief.size,
                node,
                motion: None,
            },
        );
    }

    fn refresh(&mut self, brief: &StructureBrief, anchor: GridPoint, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        let dragged = self.dragged() == Some(brief.id.as_str());
        let Some(record) = self.records.get_mut(&brief.id) else {
            return;
        };
        record.name.clone_from(&brief.name);
        record.category.clone_from(&brief.category);
        record.size = brief.size;
        if let Some(NodeKind::Structure { width, height, category, label }) = scene.kind_mut(record.node) {
            *width = brief.size.width;
            *height = brief.size.height;
            category.clone_from(&brief.category);
            label.clone_from(&brief.name);
        }

        if record.anchor == anchor {
            return;
        }
        record.anchor = anchor;
        // a held structure only learns its anchor; it slides there if the drag is cancelled
        if !dragged {
            Self::slide_to_anchor(&self.transform, &self.config, record, scene, tweens);
        }
    }

    fn remove(&mut self, id: &str, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        if self.dragged() == Some(id) {
            self.cancel_drag(scene, tweens);
        }
        let Some(record) = self.records.remove(id) else {
            return;
        };
        tweens.cancel_all_for(record.node);
        scene.remove(record.node);
        self.owners.remove(record.node);
    }

    /// Id of the structure a node belongs to
    pub fn owner_of(&self, node: NodeKey) -> Option<&str> {
        self.owners.get(node).map(String::as_str)
    }

    /// Whether a structure is still sliding to its anchor
    pub fn is_moving(&self, id: &str, tweens: &TweenEngine) -> bool {
        self.records
            .get(id)
            .and_then(|record| record.motion)
            .is_some_and(|handle| tweens.is_active(handle))
    }
}

impl EntityLifecycle for StructureManager {
    type Brief = StructureBrief;

    fn reconcile(&mut self, briefs: &[StructureBrief], scene: &mut SceneGraph, tweens: &mut TweenEngine) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let latest = latest_by_id(briefs);
        let seen: HashSet<&str> = latest.iter().map(|brief| brief.id.as_str()).collect();

        let gone: Vec<String> = self.records.keys().filter(|id| !seen.contains(id.as_str())).cloned().collect();
        for id in &gone {
            self.remove(id, scene, tweens);
            report.removed += 1;
        }

        let grid_max = self.transform.grid_max();
        for brief in latest {
            let anchor = GridPoint::clamped(brief.grid_position.x, brief.grid_position.y, grid_max);
            if self.records.contains_key(&brief.id) {
                self.refresh(brief, anchor, scene, tweens);
                report.updated += 1;
            } else {
                self.create(brief, anchor, scene, tweens);
                report.created += 1;
            }
        }

        log::debug!(
            "Structures reconciled: {} created, {} updated, {} removed",
            report.created,
            report.updated,
            report.removed
        );
        report
    }

    /// Nearest structure whose anchor is within `radius` of `world`, or whose
    /// footprint contains it
    fn hit_test(&self, scene: &SceneGraph, world: IsoPoint, radius: f32) -> Option<&str> {
        let pointer = self.transform.iso_to_backend_float(world);
        self.records
            .iter()
            .filter_map(|(id, record)| {
                let node = scene.get(record.node).filter(|node| node.is_visible())?;
                let distance = node.position().distance(world);
                let center = self.transform.iso_to_backend_float(node.position());
                let inside = (pointer.x - center.x).abs() <= record.size.width / 2.0
                    && (pointer.y - center.y).abs() <= record.size.height / 2.0;
                (distance <= radius || inside).then_some((id.as_str(), distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn node_of(&self, id: &str) -> Option<NodeKey> {
        self.records.get(id).map(|record| record.node)
    }

    fn ids(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    fn clear(&mut self, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        self.cancel_drag(scene, tweens);
        for record in self.records.values() {
            tweens.cancel_all_for(record.node);
            scene.remove(record.node);
        }
        self.records.clear();
        self.owners.clear();
    }
}
