//! Per-frame pose offsets
//!
//! Offsets are in sprite pixels and depend only on (state, frame).

use super::direction::Direction8;
use super::state_machine::AnimationState;

/// Everything the sprite painter needs to draw one figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpritePose {
    /// Current animation state
    pub state: AnimationState,
    /// Frame within the state's loop
    pub frame: usize,
    /// Facing
    pub direction: Direction8,
}

/// Displacements applied to sprite parts for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseOffset {
    /// Horizontal shift of the whole body
    pub body_dx: f32,
    /// Vertical shift of the whole body (negative is up)
    pub body_dy: f32,
    /// Extra vertical shift of the head
    pub head_dy: f32,
    /// Arm displacement (positive swings forward)
    pub arm_swing: f32,
    /// Leg displacement (positive swings forward)
    pub leg_swing: f32,
}

const WALK_BOUNCE: [f32; 4] = [0.0, -2.0, 0.0, -2.0];
const WALK_LEGS: [f32; 4] = [2.0, 0.0, -2.0, 0.0];
const WORK_SWAY: [f32; 4] = [-1.0, 0.0, 1.0, 0.0];
const WORK_ARMS: [f32; 4] = [0.0, -2.0, 0.0, -2.0];
const IDLE_NOD: [f32; 2] = [0.0, 1.0];
const CHAT_NOD: [f32; 2] = [0.0, -1.0];
const CHAT_ARMS: [f32; 2] = [0.0, -1.0];

fn cycle(table: &[f32], frame: usize) -> f32 {
    table[frame % table.len()]
}

/// Offsets for `state` at `frame`; frames past the table wrap around
pub fn pose_offset(state: AnimationState, frame: usize) -> PoseOffset {
    match state {
        AnimationState::Walking => PoseOffset {
            body_dy: cycle(&WALK_BOUNCE, frame),
            leg_swing: cycle(&WALK_LEGS, frame),
            arm_swing: -cycle(&WALK_LEGS, frame),
            ..PoseOffset::default()
        },
        AnimationState::Working => PoseOffset {
            body_dx: cycle(&WORK_SWAY, frame),
            arm_swing: cycle(&WORK_ARMS, frame),
            ..PoseOffset::default()
        },
        AnimationState::Idle => PoseOffset {
            head_dy: cycle(&IDLE_NOD, frame),
            ..PoseOffset::default()
        },
        AnimationState::Chatting => PoseOffset {
            head_dy: cycle(&CHAT_NOD, frame),
            arm_swing: cycle(&CHAT_ARMS, frame),
            ..PoseOffset::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_bounces_on_odd_frames() {
        assert_eq!(pose_offset(AnimationState::Walking, 0).body_dy, 0.0);
        assert_eq!(pose_offset(AnimationState::Walking, 1).body_dy, -2.0);
    }

    #[test]
    fn test_offsets_are_pure() {
        for state in AnimationState::ALL {
            for frame in 0..8 {
                assert_eq!(pose_offset(state, frame), pose_offset(state, frame));
            }
        }
    }

    #[test]
    fn test_frames_wrap() {
        assert_eq!(pose_offset(AnimationState::Working, 6), pose_offset(AnimationState::Working, 2));
    }
}
