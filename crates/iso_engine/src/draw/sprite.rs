//! Procedural figure recipes
//!
//! A figure is a list of colored rectangles relative to its feet. The list for
//! every (state, frame) pair is built once from the base figure plus the
//! frame's [`pose_offset`], then shared by every entity.

use std::collections::HashMap;

use crate::animation::{pose_offset, AnimationState, PoseOffset};
use crate::core::config::AnimationConfig;

use super::color::ColorRole;

/// One rectangle of a figure, in sprite pixels relative to the feet
///
/// `dy` grows downwards, so body parts have negative offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpritePart {
    /// Left edge
    pub dx: f32,
    /// Top edge
    pub dy: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
    /// Palette entry
    pub role: ColorRole,
    /// Only drawn when the face is turned towards the viewer
    pub front_only: bool,
}

impl SpritePart {
    const fn new(dx: f32, dy: f32, w: f32, h: f32, role: ColorRole) -> Self {
        Self { dx, dy, w, h, role, front_only: false }
    }

    fn front(mut self) -> Self {
        self.front_only = true;
        self
    }

    fn shifted(mut self, dx: f32, dy: f32) -> Self {
        self.dx += dx;
        self.dy += dy;
        self
    }

    /// Horizontal mirror about the figure's center line
    pub fn mirrored(self) -> Self {
        Self {
            dx: -(self.dx + self.w),
            ..self
        }
    }
}

/// Figure height in sprite pixels, used for label placement and picking
pub const FIGURE_HEIGHT: f32 = 26.0;

fn figure(offset: PoseOffset) -> Vec<SpritePart> {
    let PoseOffset { body_dx, body_dy, head_dy, arm_swing, leg_swing } = offset;
    let head = head_dy + body_dy;
    let mut parts = vec![
        // back to front: legs, torso, arms, head
        SpritePart::new(-4.0 + leg_swing, -2.0, 3.0, 2.0, ColorRole::Shoes),
        SpritePart::new(1.0 - leg_swing, -2.0, 3.0, 2.0, ColorRole::Shoes),
        SpritePart::new(-4.0 + leg_swing / 2.0, -9.0, 3.0, 7.0, ColorRole::Pants),
        SpritePart::new(1.0 - leg_swing / 2.0, -9.0, 3.0, 7.0, ColorRole::Pants),
    ];
    let upper = [
        SpritePart::new(-5.0, -17.0, 10.0, 8.0, ColorRole::Shirt),
        SpritePart::new(-7.0, -16.0 + arm_swing, 2.0, 6.0, ColorRole::Shirt),
        SpritePart::new(5.0, -16.0 - arm_swing, 2.0, 6.0, ColorRole::Shirt),
        SpritePart::new(-7.0, -10.0 + arm_swing, 2.0, 2.0, ColorRole::Skin),
        SpritePart::new(5.0, -10.0 - arm_swing, 2.0, 2.0, ColorRole::Skin),
    ];
    parts.extend(upper.into_iter().map(|part| part.shifted(body_dx, body_dy)));

    let face = [
        SpritePart::new(-4.0, -25.0, 8.0, 8.0, ColorRole::Skin),
        SpritePart::new(-4.0, -26.0, 8.0, 3.0, ColorRole::Hair),
        SpritePart::new(-2.0, -22.0, 1.0, 1.0, ColorRole::Outline).front(),
        SpritePart::new(1.0, -22.0, 1.0, 1.0, ColorRole::Outline).front(),
    ];
    parts.extend(face.into_iter().map(|part| part.shifted(body_dx, head)));
    parts
}

/// Prebuilt part lists for every (state, frame)
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    frames: HashMap<(AnimationState, usize), Vec<SpritePart>>,
    counts: HashMap<AnimationState, usize>,
}

impl Default for SpriteAtlas {
    fn default() -> Self {
        Self::build(&AnimationConfig::default())
    }
}

impl SpriteAtlas {
    /// Generate every frame of every state
    pub fn build(config: &AnimationConfig) -> Self {
        let counts: HashMap<AnimationState, usize> = [
            (AnimationState::Idle, config.idle_frames),
            (AnimationState::Walking, config.walking_frames),
            (AnimationState::Working, config.working_frames),
            (AnimationState::Chatting, config.chatting_frames),
        ]
        .into_iter()
        .map(|(state, count)| (state, count.max(1)))
        .collect();

        let mut frames = HashMap::new();
        for (&state, &count) in &counts {
            for frame in 0..count {
                frames.insert((state, frame), figure(pose_offset(state, frame)));
            }
        }
        log::debug!("Sprite atlas built with {} frames", frames.len());
        Self { frames, counts }
    }

    /// Parts for a frame; frame indices wrap by the state's count
    pub fn parts(&self, state: AnimationState, frame: usize) -> &[SpritePart] {
        let count = self.counts.get(&state).copied().unwrap_or(1);
        self.frames
            .get(&(state, frame % count))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of stored frames
    pub fn frame_total(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atlas_covers_every_frame() {
        let atlas = SpriteAtlas::default();
        assert_eq!(atlas.frame_total(), 2 + 4 + 4 + 2);
        for state in AnimationState::ALL {
            assert!(!atlas.parts(state, 0).is_empty());
        }
    }

    #[test]
    fn test_walk_frames_differ() {
        let atlas = SpriteAtlas::default();
        assert_ne!(atlas.parts(AnimationState::Walking, 0), atlas.parts(AnimationState::Walking, 1));
    }

    #[test]
    fn test_frame_index_wraps() {
        let atlas = SpriteAtlas::default();
        assert_eq!(atlas.parts(AnimationState::Idle, 3), atlas.parts(AnimationState::Idle, 1));
    }

    #[test]
    fn test_mirror_flips_about_center() {
        let part = SpritePart::new(1.0, -5.0, 3.0, 2.0, ColorRole::Shirt);
        let mirrored = part.mirrored();
        assert_relative_eq!(mirrored.dx, -4.0);
        assert_eq!(mirrored.mirrored(), part);
    }

    #[test]
    fn test_eyes_are_front_only() {
        let atlas = SpriteAtlas::default();
        let eyes = atlas
            .parts(AnimationState::Idle, 0)
            .iter()
            .filter(|part| part.role == ColorRole::Outline)
            .count();
        assert_eq!(eyes, 2);
        assert!(atlas.parts(AnimationState::Idle, 0).iter().filter(|p| p.front_only).all(|p| p.role == ColorRole::Outline));
    }
}
