//! Eight-way facing direction

use crate::foundation::math::constants::RAD_TO_DEG;

/// Compass facing, in screen space (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction8 {
    /// +x
    East,
    /// +x +y
    SouthEast,
    /// +y, towards the viewer
    #[default]
    South,
    /// -x +y
    SouthWest,
    /// -x
    West,
    /// -x -y
    NorthWest,
    /// -y, away from the viewer
    North,
    /// +x -y
    NorthEast,
}

impl Direction8 {
    /// Sectors in clockwise order starting at east
    const SECTORS: [Direction8; 8] = [
        Direction8::East,
        Direction8::SouthEast,
        Direction8::South,
        Direction8::SouthWest,
        Direction8::West,
        Direction8::NorthWest,
        Direction8::North,
        Direction8::NorthEast,
    ];

    /// Quantize a motion vector into one of eight 45° sectors
    ///
    /// Sector boundaries sit at odd multiples of 22.5°. A zero (or non-finite)
    /// vector has no direction and returns `None`.
    pub fn from_vector(dx: f32, dy: f32) -> Option<Self> {
        if !(dx.is_finite() && dy.is_finite()) || (dx == 0.0 && dy == 0.0) {
            return None;
        }
        let degrees = (dy.atan2(dx) * RAD_TO_DEG).rem_euclid(360.0);
        let sector = ((degrees + 22.5) / 45.0).floor() as usize % 8;
        Some(Self::SECTORS[sector])
    }

    /// Like [`Self::from_vector`], keeping `previous` for a zero vector
    pub fn from_vector_or(dx: f32, dy: f32, previous: Self) -> Self {
        Self::from_vector(dx, dy).unwrap_or(previous)
    }

    /// Whether the figure is drawn horizontally mirrored
    pub fn is_mirrored(self) -> bool {
        matches!(self, Direction8::West | Direction8::SouthWest | Direction8::NorthWest)
    }

    /// Whether the face is visible (not turned away from the viewer)
    pub fn shows_face(self) -> bool {
        !matches!(self, Direction8::North | Direction8::NorthEast | Direction8::NorthWest)
    }
}
