//! Procedural figure animation
//!
//! [`AnimationStateMachine`] sequences frames per entity; [`pose_offset`]
//! turns (state, frame) into part displacements for the sprite painter.

pub mod activity;
pub mod direction;
pub mod pose;
pub mod state_machine;

pub use activity::activity_to_state;
pub use direction::Direction8;
pub use pose::{pose_offset, PoseOffset, SpritePose};
pub use state_machine::{AnimationState, AnimationStateMachine};
