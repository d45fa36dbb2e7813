//! # Tween Engine
//!
//! Per-tick interpolation of numeric node properties.
//!
//! A tween reads its start values from the target when it is created and
//! writes interpolated values back through the [`Tweenable`] seam every tick.
//! At most one tween owns a given (node, property) pair: creating a new tween
//! for a pair strips that property from whichever tween held it before.

use std::collections::HashMap;

use crate::foundation::collections::{NodeKey, SlotMap, TweenKey};
use crate::foundation::math::utils::lerp;

use super::easing::Easing;

/// Animatable node properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    /// World x position
    X,
    /// World y position
    Y,
    /// Opacity
    Alpha,
    /// Uniform draw scale
    Scale,
}

/// Anything whose node properties a tween can read and write
pub trait Tweenable {
    /// Current value of a property, `None` if the target no longer exists
    fn read_property(&self, target: NodeKey, property: TweenProperty) -> Option<f32>;

    /// Write a property; returns false if the target no longer exists
    fn write_property(&mut self, target: NodeKey, property: TweenProperty, value: f32) -> bool;
}

/// Callback invoked with the target once a tween reaches its end
pub type CompletionCallback = Box<dyn FnOnce(NodeKey)>;

/// Description of a tween to create
pub struct TweenRequest {
    target: NodeKey,
    deltas: Vec<(TweenProperty, f32)>,
    duration: f32,
    easing: Easing,
    on_complete: Option<CompletionCallback>,
}

impl TweenRequest {
    /// Start a request for `target` lasting `duration` seconds
    pub fn new(target: NodeKey, duration: f32) -> Self {
        Self {
            target,
            deltas: Vec::new(),
            duration,
            easing: Easing::Linear,
            on_complete: None,
        }
    }

    /// Animate `property` towards `end`
    pub fn with_end(mut self, property: TweenProperty, end: f32) -> Self {
        self.deltas.retain(|(p, _)| *p != property);
        self.deltas.push((property, end));
        self
    }

    /// Animate both position components
    pub fn with_position(self, x: f32, y: f32) -> Self {
        self.with_end(TweenProperty::X, x).with_end(TweenProperty::Y, y)
    }

    /// Set the easing curve
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Run `callback` once the end values have been written
    pub fn with_on_complete(mut self, callback: impl FnOnce(NodeKey) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Track {
    property: TweenProperty,
    start: f32,
    end: f32,
}

struct TweenRecord {
    target: NodeKey,
    tracks: Vec<Track>,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    on_complete: Option<CompletionCallback>,
}

impl TweenRecord {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}

/// Scheduler for all active tweens
#[derive(Default)]
pub struct TweenEngine {
    tweens: SlotMap<TweenKey, TweenRecord>,
    claims: HashMap<(NodeKey, TweenProperty), TweenKey>,
}

impl TweenEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween; returns `None` when the target does not exist or nothing is animated
    pub fn create<T: Tweenable + ?Sized>(&mut self, scene: &T, request: TweenRequest) -> Option<TweenKey> {
        let TweenRequest { target, deltas, duration, easing, on_complete } = request;
        if deltas.is_empty() {
            return None;
        }

        let mut tracks = Vec::with_capacity(deltas.len());
        for (property, end) in deltas {
            let start = scene.read_property(target, property)?;
            tracks.push(Track { property, start, end });
        }

        for track in &tracks {
            self.release_claim(target, track.property);
        }

        let key = self.tweens.insert(TweenRecord {
            target,
            tracks,
            duration,
            elapsed: 0.0,
            easing,
            on_complete,
        });
        if let Some(record) = self.tweens.get(key) {
            for track in &record.tracks {
                self.claims.insert((target, track.property), key);
            }
        }
        log::trace!("Tween {key:?} started on {target:?} for {duration:.2}s");
        Some(key)
    }

    /// Advance every tween by `delta_seconds`; returns the tweens that completed
    ///
    /// Completed tweens write their exact end values, are removed, and then
    /// have their completion callbacks invoked in completion order.
    pub fn update<T: Tweenable + ?Sized>(&mut self, scene: &mut T, delta_seconds: f32) -> Vec<TweenKey> {
        let dt = delta_seconds.max(0.0);
        let mut finished = Vec::new();
        let mut orphaned = Vec::new();

        for (key, record) in self.tweens.iter_mut() {
            record.elapsed += dt;
            let progress = record.progress();
            let done = progress >= 1.0;
            let eased = record.easing.apply(progress);

            let mut alive = true;
            for track in &record.tracks {
                let value = if done { track.end } else { lerp(track.start, track.end, eased) };
                alive &= scene.write_property(record.target, track.property, value);
            }

            if !alive {
                orphaned.push(key);
            } else if done {
                finished.push(key);
            }
        }

        for key in orphaned {
            log::trace!("Tween {key:?} dropped, target gone");
            self.remove(key);
        }

        let mut callbacks = Vec::new();
        for &key in &finished {
            if let Some(record) = self.remove(key) {
                log::trace!("Tween {key:?} completed on {:?}", record.target);
                if let Some(callback) = record.on_complete {
                    callbacks.push((callback, record.target));
                }
            }
        }
        for (callback, target) in callbacks {
            callback(target);
        }

        finished
    }

    /// Cancel a tween, leaving its properties at their last written values
    pub fn cancel(&mut self, handle: TweenKey) -> bool {
        self.remove(handle).is_some()
    }

    /// Cancel every tween touching `target`; returns how many were removed
    pub fn cancel_all_for(&mut self, target: NodeKey) -> usize {
        let keys: Vec<TweenKey> = self
            .tweens
            .iter()
            .filter(|(_, record)| record.target == target)
            .map(|(key, _)| key)
            .collect();
        keys.into_iter().filter(|&key| self.cancel(key)).count()
    }

    /// Whether a tween is still running
    pub fn is_active(&self, handle: TweenKey) -> bool {
        self.tweens.contains_key(handle)
    }

    /// Tween currently animating a (node, property) pair
    pub fn claim_of(&self, target: NodeKey, property: TweenProperty) -> Option<TweenKey> {
        self.claims.get(&(target, property)).copied()
    }

    /// Number of running tweens
    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.tweens.clear();
        self.claims.clear();
    }

    fn remove(&mut self, key: TweenKey) -> Option<TweenRecord> {
        let record = self.tweens.remove(key)?;
        for track in &record.tracks {
            if self.claims.get(&(record.target, track.property)) == Some(&key) {
                self.claims.remove(&(record.target, track.property));
            }
        }
        Some(record)
    }

    /// Strip `property` from its current owner; the owner is dropped if nothing is left
    fn release_claim(&mut self, target: NodeKey, property: TweenProperty) {
        let Some(previous) = self.claims.remove(&(target, property)) else {
            return;
        };
        let emptied = match self.tweens.get_mut(previous) {
            Some(record) => {
                record.tracks.retain(|track| track.property != property);
                record.tracks.is_empty()
            }
            None => false,
        };
        if emptied {
            log::trace!("Tween {previous:?} superseded");
            self.tweens.remove(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Props {
        nodes: SlotMap<NodeKey, [f32; 4]>,
    }

    fn slot(property: TweenProperty) -> usize {
        match property {
            TweenProperty::X => 0,
            TweenProperty::Y => 1,
            TweenProperty::Alpha => 2,
            TweenProperty::Scale => 3,
        }
    }

    impl Tweenable for Props {
        fn read_property(&self, target: NodeKey, property: TweenProperty) -> Option<f32> {
            self.nodes.get(target).map(|values| values[slot(property)])
        }

        fn write_property(&mut self, target: NodeKey, property: TweenProperty, value: f32) -> bool {
            match self.nodes.get_mut(target) {
                Some(values) => {
                    values[slot(property)] = value;
                    true
                }
                None => false,
            }
        }
    }

    fn setup() -> (Props, NodeKey) {
        let mut props = Props::default();
        let node = props.nodes.insert([0.0, 0.0, 1.0, 1.0]);
        (props, node)
    }

    #[test]
    fn test_completion_writes_exact_end() {
        let (mut props, node) = setup();
        let mut engine = TweenEngine::new();
        engine
            .create(&props, TweenRequest::new(node, 0.3).with_position(10.1, -3.7).with_easing(Easing::SineInOut))
            .expect("tween created");

        for _ in 0..7 {
            engine.update(&mut props, 0.05);
        }
        assert_eq!(engine.active_count(), 0);
        assert_eq!(props.read_property(node, TweenProperty::X), Some(10.1));
        assert_eq!(props.read_property(node, TweenProperty::Y), Some(-3.7));
    }

    #[test]
    fn test_linear_midpoint() {
        let (mut props, node) = setup();
        let mut engine = TweenEngine::new();
        engine.create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::X, 100.0));
        engine.update(&mut props, 0.5);
        assert_relative_eq!(props.read_property(node, TweenProperty::X).unwrap_or_default(), 50.0);
    }

    #[test]
    fn test_cancel_keeps_last_value() {
        let (mut props, node) = setup();
        let mut engine = TweenEngine::new();
        let handle = engine
            .create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::X, 100.0))
            .expect("tween created");
        engine.create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::Alpha, 0.0));
        engine.update(&mut props, 0.25);

        let before = engine.active_count();
        assert!(engine.cancel(handle));
        assert_eq!(engine.active_count(), before - 1);

        engine.update(&mut props, 0.25);
        assert_relative_eq!(props.read_property(node, TweenProperty::X).unwrap_or_default(), 25.0);
        assert!(!engine.cancel(handle));
    }

    #[test]
    fn test_reissue_supersedes_same_property() {
        let (mut props, node) = setup();
        let mut engine = TweenEngine::new();
        let first = engine
            .create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::X, 100.0))
            .expect("tween created");
        let second = engine
            .create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::X, -100.0))
            .expect("tween created");

        assert!(!engine.is_active(first));
        assert_eq!(engine.claim_of(node, TweenProperty::X), Some(second));
        engine.update(&mut props, 1.0);
        assert_eq!(props.read_property(node, TweenProperty::X), Some(-100.0));
    }

    #[test]
    fn test_reissue_keeps_other_properties() {
        let (mut props, node) = setup();
        let mut engine = TweenEngine::new();
        let both = engine
            .create(&props, TweenRequest::new(node, 1.0).with_position(10.0, 20.0))
            .expect("tween created");
        engine.create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::X, 5.0));

        assert!(engine.is_active(both));
        engine.update(&mut props, 1.0);
        assert_eq!(props.read_property(node, TweenProperty::X), Some(5.0));
        assert_eq!(props.read_property(node, TweenProperty::Y), Some(20.0));
    }

    #[test]
    fn test_zero_duration_completes_next_tick() {
        let (mut props, node) = setup();
        let mut engine = TweenEngine::new();
        let handle = engine
            .create(&props, TweenRequest::new(node, 0.0).with_end(TweenProperty::Scale, 2.0))
            .expect("tween created");
        let done = engine.update(&mut props, 0.0);
        assert_eq!(done, vec![handle]);
        assert_eq!(props.read_property(node, TweenProperty::Scale), Some(2.0));
    }

    #[test]
    fn test_callback_fires_once_after_removal() {
        let (mut props, node) = setup();
        let mut engine = TweenEngine::new();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        engine.create(
            &props,
            TweenRequest::new(node, 0.1)
                .with_end(TweenProperty::Alpha, 0.0)
                .with_on_complete(move |_| counter.set(counter.get() + 1)),
        );
        engine.update(&mut props, 0.2);
        engine.update(&mut props, 0.2);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_cancel_all_for_target() {
        let (mut props, node) = setup();
        let other = props.nodes.insert([0.0; 4]);
        let mut engine = TweenEngine::new();
        engine.create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::X, 1.0));
        engine.create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::Alpha, 0.0));
        engine.create(&props, TweenRequest::new(other, 1.0).with_end(TweenProperty::X, 1.0));

        assert_eq!(engine.cancel_all_for(node), 2);
        assert_eq!(engine.active_count(), 1);
        assert_eq!(engine.claim_of(node, TweenProperty::X), None);
    }

    #[test]
    fn test_missing_target_is_dropped() {
        let (mut props, node) = setup();
        let mut engine = TweenEngine::new();
        engine.create(&props, TweenRequest::new(node, 1.0).with_end(TweenProperty::X, 1.0));
        props.nodes.remove(node);
        assert!(engine.update(&mut props, 0.1).is_empty());
        assert_eq!(engine.active_count(), 0);
    }
}
