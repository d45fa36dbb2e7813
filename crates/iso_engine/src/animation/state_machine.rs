//! # Animation State Machine
//!
//! One per mobile entity. Holds the current state, facing, frame index and
//! the time accumulated towards the next frame.

use crate::core::config::AnimationConfig;

use super::direction::Direction8;
use super::pose::SpritePose;

/// Looping animation states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationState {
    /// Standing still
    #[default]
    Idle,
    /// Moving between locations
    Walking,
    /// Busy at a location
    Working,
    /// Talking to someone
    Chatting,
}

impl AnimationState {
    /// Every state
    pub const ALL: [AnimationState; 4] = [
        AnimationState::Idle,
        AnimationState::Walking,
        AnimationState::Working,
        AnimationState::Chatting,
    ];

    /// Position in [`Self::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Frame sequencing for one animated figure
#[derive(Debug, Clone)]
pub struct AnimationStateMachine {
    state: AnimationState,
    direction: Direction8,
    frame: usize,
    accumulator: f32,
    frame_duration: f32,
    frame_counts: [usize; 4],
}

impl Default for AnimationStateMachine {
    fn default() -> Self {
        Self::new(&AnimationConfig::default())
    }
}

impl AnimationStateMachine {
    /// Create an idle, south-facing machine
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            state: AnimationState::Idle,
            direction: Direction8::South,
            frame: 0,
            accumulator: 0.0,
            frame_duration: 1.0 / config.fps.max(f32::EPSILON),
            frame_counts: [
                config.idle_frames.max(1),
                config.walking_frames.max(1),
                config.working_frames.max(1),
                config.chatting_frames.max(1),
            ],
        }
    }

    /// Start in a given state
    pub fn with_state(mut self, state: AnimationState) -> Self {
        self.state = state;
        self
    }

    /// Current state
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Current facing
    pub fn direction(&self) -> Direction8 {
        self.direction
    }

    /// Current frame index
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Time accumulated towards the next frame
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Frames in a state's loop
    pub fn frame_count(&self, state: AnimationState) -> usize {
        self.frame_counts[state.index()]
    }

    /// Snapshot for drawing
    pub fn pose(&self) -> SpritePose {
        SpritePose {
            state: self.state,
            frame: self.frame,
            direction: self.direction,
        }
    }

    /// Switch state; re-entering the current state changes nothing
    ///
    /// Returns true if the state changed.
    pub fn set_state(&mut self, state: AnimationState) -> bool {
        if state == self.state {
            return false;
        }
        log::trace!("Animation {:?} -> {:?}", self.state, state);
        self.state = state;
        self.frame = 0;
        self.accumulator = 0.0;
        true
    }

    /// Set the facing explicitly
    pub fn set_direction(&mut self, direction: Direction8) {
        self.direction = direction;
    }

    /// Face along a motion vector; a zero vector keeps the current facing
    pub fn face_towards(&mut self, dx: f32, dy: f32) -> Direction8 {
        self.direction = Direction8::from_vector_or(dx, dy, self.direction);
        self.direction
    }

    /// Advance time, calling `on_frame(frame, state)` once per frame advanced
    ///
    /// A long `delta_seconds` may advance several frames. Returns how many.
    pub fn update(&mut self, delta_seconds: f32, mut on_frame: impl FnMut(usize, AnimationState)) -> usize {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return 0;
        }
        self.accumulator += delta_seconds;
        let count = self.frame_count(self.state);
        let mut advanced = 0;
        while self.accumulator >= self.frame_duration {
            self.accumulator -= self.frame_duration;
            self.frame = (self.frame + 1) % count;
            advanced += 1;
            on_frame(self.frame, self.state);
        }
        advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_same_state_is_noop() {
        let mut machine = AnimationStateMachine::default();
        machine.update(0.2, |_, _| {});
        let frame = machine.frame();
        let accumulated = machine.accumulator();

        assert!(!machine.set_state(AnimationState::Idle));
        assert_eq!(machine.frame(), frame);
        assert_relative_eq!(machine.accumulator(), accumulated);
    }

    #[test]
    fn test_state_change_resets() {
        let mut machine = AnimationStateMachine::default();
        machine.update(0.2, |_, _| {});
        assert!(machine.set_state(AnimationState::Walking));
        assert_eq!(machine.frame(), 0);
        assert_relative_eq!(machine.accumulator(), 0.0);
    }

    #[test]
    fn test_large_delta_fires_every_frame() {
        let mut machine = AnimationStateMachine::default().with_state(AnimationState::Walking);
        let mut seen = Vec::new();
        // 8 fps: 0.5s is four frames
        let advanced = machine.update(0.5 + 1e-3, |frame, state| seen.push((frame, state)));
        assert_eq!(advanced, 4);
        let frames: Vec<usize> = seen.iter().map(|(frame, _)| *frame).collect();
        assert_eq!(frames, vec![1, 2, 3, 0]);
        assert!(seen.iter().all(|(_, state)| *state == AnimationState::Walking));
    }

    #[test]
    fn test_frame_wraps_by_state_count() {
        let mut machine = AnimationStateMachine::default();
        let mut frames = Vec::new();
        for _ in 0..3 {
            machine.update(0.13, |frame, _| frames.push(frame));
        }
        assert_eq!(frames, vec![1, 0, 1]);
    }

    #[test]
    fn test_small_delta_accumulates() {
        let mut machine = AnimationStateMachine::default();
        assert_eq!(machine.update(0.05, |_, _| {}), 0);
        assert_eq!(machine.update(0.1, |_, _| {}), 1);
        assert_eq!(machine.frame(), 1);
    }

    #[test]
    fn test_face_towards() {
        let mut machine = AnimationStateMachine::default();
        assert_eq!(machine.face_towards(-3.0, 0.0), Direction8::West);
        assert_eq!(machine.face_towards(0.0, 0.0), Direction8::West);
        assert!(machine.pose().direction.is_mirrored());
    }
}
