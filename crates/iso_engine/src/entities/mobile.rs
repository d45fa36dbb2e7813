//! Mobile entities: people walking between named locations

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::animation::{activity_to_state, AnimationState, AnimationStateMachine};
use crate::coords::{CoordinateTransform, GridPoint, IsoPoint};
use crate::core::config::{AnimationConfig, EntityConfig};
use crate::foundation::collections::{NodeKey, SecondaryMap, TweenKey};
use crate::foundation::math::{constants, Vec2};
use crate::scene::{LayerMask, NodeKind, SceneGraph, SceneNode};
use crate::tween::{Easing, TweenEngine, TweenProperty, TweenRequest};

use super::feed::{latest_by_id, EntityBrief, StructureBrief};
use super::locations::LocationDirectory;
use super::{EntityLifecycle, ReconcileReport};

/// Distance under which two world positions count as the same spot
const ARRIVAL_EPSILON: f32 = 0.01;

/// One animation frame advance, reported after an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameChange {
    /// Entity id
    pub id: String,
    /// New frame index
    pub frame: usize,
    /// State the frame belongs to
    pub state: AnimationState,
}

/// Local view of one mobile entity
#[derive(Debug)]
pub struct MobileRecord {
    name: String,
    category: String,
    location: Option<String>,
    activity: Option<String>,
    target: IsoPoint,
    node: NodeKey,
    animation: AnimationStateMachine,
    motion: Option<TweenKey>,
}

impl MobileRecord {
    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Location name last reported
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Activity last reported
    pub fn activity(&self) -> Option<&str> {
        self.activity.as_deref()
    }

    /// World position the entity is heading to (or standing at)
    pub fn target(&self) -> IsoPoint {
        self.target
    }

    /// Scene node
    pub fn node(&self) -> NodeKey {
        self.node
    }

    /// Animation state machine
    pub fn animation(&self) -> &AnimationStateMachine {
        &self.animation
    }

    /// Whether a move tween was issued and has not been seen to finish
    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// Handle of the running move tween
    pub fn motion(&self) -> Option<TweenKey> {
        self.motion
    }
}

/// Keeps one figure node per simulated person
pub struct MobileEntityManager {
    transform: CoordinateTransform,
    config: EntityConfig,
    animation: AnimationConfig,
    records: BTreeMap<String, MobileRecord>,
    owners: SecondaryMap<NodeKey, String>,
    jitter: HashMap<(String, String), Vec2>,
    locations: LocationDirectory,
}

impl MobileEntityManager {
    /// Create an empty manager
    pub fn new(transform: CoordinateTransform, config: &EntityConfig, animation: &AnimationConfig) -> Self {
        Self {
            locations: LocationDirectory::new(transform.grid_max()),
            transform,
            config: config.clone(),
            animation: animation.clone(),
            records: BTreeMap::new(),
            owners: SecondaryMap::new(),
            jitter: HashMap::new(),
        }
    }

    /// Record of an id
    pub fn get(&self, id: &str) -> Option<&MobileRecord> {
        self.records.get(id)
    }

    /// Iterate records in id order
    pub fn records(&self) -> impl Iterator<Item = (&str, &MobileRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Named locations used to place entities
    pub fn locations(&self) -> &LocationDirectory {
        &self.locations
    }

    /// Rebuild the location directory from the structure feed and send
    /// everyone whose location moved to its new spot
    pub fn set_locations(&mut self, structures: &[StructureBrief], scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        self.locations.rebuild(structures, self.transform.grid_max());
        self.retarget(scene, tweens);
    }

    /// Move a single location, e.g. after its structure was dragged
    pub fn move_location(&mut self, name: &str, point: GridPoint, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        self.locations.insert(name, point);
        self.retarget(scene, tweens);
    }

    /// Recompute every target from the directory and start moves where needed
    pub fn retarget(&mut self, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        let ids: Vec<String> = self.records.keys().cloned().collect();
        for id in ids {
            let location = self.records.get(&id).and_then(|record| record.location.clone());
            let target = self.target_for(&id, location.as_deref());
            if let Some(record) = self.records.get_mut(&id) {
                let mid_motion = record.motion.is_some_and(|handle| tweens.is_active(handle));
                if record.target.distance(target) > ARRIVAL_EPSILON {
                    record.target = target;
                    if !mid_motion {
                        Self::begin_move(&self.config, record, scene, tweens);
                    }
                }
            }
        }
    }

    /// Placement offset of an entity at a location
    ///
    /// Uniform over a disc of `jitter_radius`, squashed vertically to match the
    /// 2:1 projection. The same (id, location) pair always yields the same
    /// offset.
    pub fn jitter_offset(&mut self, id: &str, location: &str) -> Vec2 {
        let key = (id.to_owned(), location.to_lowercase());
        if let Some(offset) = self.jitter.get(&key) {
            return *offset;
        }
        let mut hasher = DefaultHasher::new();
        self.config.jitter_seed.hash(&mut hasher);
        key.hash(&mut hasher);
        let mut rng = ChaCha8Rng::seed_from_u64(hasher.finish());
        let radius = self.config.jitter_radius * rng.gen::<f32>().sqrt();
        let angle = constants::TAU * rng.gen::<f32>();
        let offset = Vec2::new(radius * angle.cos(), radius * angle.sin() * 0.5);
        self.jitter.insert(key, offset);
        offset
    }

    fn target_for(&mut self, id: &str, location: Option<&str>) -> IsoPoint {
        let grid = self.locations.resolve(location);
        let offset = self.jitter_offset(id, location.unwrap_or_default());
        self.transform.backend_to_iso(grid).offset(offset)
    }

    fn begin_move(config: &EntityConfig, record: &mut MobileRecord, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        let Some(from) = scene.get(record.node).map(SceneNode::position) else {
            return;
        };
        let (dx, dy) = (record.target.x - from.x, record.target.y - from.y);
        if dx.hypot(dy) <= ARRIVAL_EPSILON {
            return;
        }
        record.animation.set_state(AnimationState::Walking);
        record.animation.face_towards(dx, dy);
        let request = TweenRequest::new(record.node, config.move_duration)
            .with_position(record.target.x, record.target.y)
            .with_easing(Easing::QuadInOut);
        record.motion = tweens.create(scene, request);
    }

    fn create(&mut self, brief: &EntityBrief, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        let target = self.target_for(&brief.id, brief.current_location_name.as_deref());
        let kind = NodeKind::MobileEntity {
            category: brief.category.clone(),
            label: brief.name.clone(),
            pose: Default::default(),
        };
        let node = scene.add(SceneNode::new(kind, target).with_owner(brief.id.clone()).with_alpha(0.0));
        tweens.create(
            scene,
            TweenRequest::new(node, self.config.fade_in_duration).with_end(TweenProperty::Alpha, 1.0),
        );
        let animation =
            AnimationStateMachine::new(&self.animation).with_state(activity_to_state(brief.activity.as_deref()));
        self.owners.insert(node, brief.id.clone());
        self.records.insert(
            brief.id.clone(),
            MobileRecord {
                name: brief.name.clone(),
                category: brief.category.clone(),
                location: brief.current_location_name.clone(),
                activity: brief.activity.clone(),
                target,
                node,
                animation,
                motion: None,
            },
        );
    }

    fn refresh(&mut self, brief: &EntityBrief, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        let target = self.target_for(&brief.id, brief.current_location_name.as_deref());
        let Some(record) = self.records.get_mut(&brief.id) else {
            return;
        };
        record.name.clone_from(&brief.name);
        record.category.clone_from(&brief.category);
        record.location.clone_from(&brief.current_location_name);
        record.activity.clone_from(&brief.activity);
        if let Some(NodeKind::MobileEntity { category, label, .. }) = scene.kind_mut(record.node) {
            category.clone_from(&brief.category);
            label.clone_from(&brief.name);
        }

        let mid_motion = record.motion.is_some_and(|handle| tweens.is_active(handle));
        record.target = target;
        if mid_motion {
            // picked up by `update` once the current walk ends
            return;
        }
        record.motion = None;
        Self::begin_move(&self.config, record, scene, tweens);
        if record.motion.is_none() {
            record.animation.set_state(activity_to_state(record.activity.as_deref()));
        }
    }

    fn remove(&mut self, id: &str, scene: &mut SceneGraph, tweens: &mut TweenEngine) {
        let Some(record) = self.records.remove(id) else {
            return;
        };
        tweens.cancel_all_for(record.node);
        scene.remove(record.node);
        self.owners.remove(record.node);
        self.jitter.retain(|(owner, _), _| owner != id);
    }

    /// Settle finished walks and advance animations
    ///
    /// A walk that ended while the target moved on starts the next leg;
    /// otherwise the entity returns to its activity's state. Frame advances
    /// are reported in id order.
    pub fn update(&mut self, delta_seconds: f32, scene: &mut SceneGraph, tweens: &mut TweenEngine) -> Vec<FrameChange> {
        let mut changes = Vec::new();
        for (id, record) in &mut self.records {
            if let Some(handle) = record.motion {
                if !tweens.is_active(handle) {
                    record.motion = None;
                    Self::begin_move(&self.config, record, scene, tweens);
                    if record.motion.is_none() {
                        log::trace!("{id} arrived");
                        record.animation.set_state(activity_to_state(record.activity.as_deref()));
                    }
                }
            }

            record.animation.update(delta_seconds, |frame, state| {
                changes.push(FrameChange { id: id.clone(), frame, state });
            });
            let pose = record.animation.pose();
            if let Some(NodeKind::MobileEntity { pose: shown, .. }) = scene.kind_mut(record.node) {
                *shown = pose;
            }
        }
        changes
    }
}

impl EntityLifecycle for MobileEntityManager {
    type Brief = EntityBrief;

    fn reconcile(&mut self, briefs: &[EntityBrief], scene: &mut SceneGraph, tweens: &mut TweenEngine) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let latest = latest_by_id(briefs);
        let seen: HashSet<&str> = latest.iter().map(|brief| brief.id.as_str()).collect();

        let gone: Vec<String> = self.records.keys().filter(|id| !seen.contains(id.as_str())).cloned().collect();
        for id in &gone {
            self.remove(id, scene, tweens);
            report.removed += 1;
        }

        for brief in latest {
            if self.records.contains_key(&brief.id) {
                self.refresh(brief, scene, tweens);
                report.updated += 1;
            } else {
                self.create(brief, scene, tweens);
                report.created += 1;
            }
        }

        log::debug!(
            "Entities reconciled: {} created, {} updated, {} removed",
            report.created,
            report.updated,
            report.removed
        );
        report
    }

    fn hit_test(&self, scene: &SceneGraph, world: IsoPoint, radius: f32) -> Option<&str> {
        scene
            .nodes_in_radius(LayerMask::ENTITIES, world, radius)
            .into_iter()
            .find_map(|(key, _)| self.owners.get(key).map(String::as_str))
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
        for record in self.records.values() {
            tweens.cancel_all_for(record.node);
            scene.remove(record.node);
        }
        self.records.clear();
        self.owners.clear();
        self.jitter.clear();
    }
}
