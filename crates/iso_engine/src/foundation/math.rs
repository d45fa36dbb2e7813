//! Math utilities and types
//!
//! Provides the small set of 2D math types the isometric view needs.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Inverse of [`lerp`]: where `value` sits between `a` and `b`
    ///
    /// Returns 0 when the range is empty.
    pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
        let span = b - a;
        if span.abs() <= f32::EPSILON {
            0.0
        } else {
            (value - a) / span
        }
    }

    /// Wrap a value into `[0, period)`
    pub fn wrap(value: f32, period: f32) -> f32 {
        let wrapped = value.rem_euclid(period);
        // rem_euclid can return `period` itself for tiny negative inputs
        if wrapped >= period { 0.0 } else { wrapped }
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_endpoints() {
        assert_relative_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_relative_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_relative_eq!(lerp(2.0, 6.0, 0.25), 3.0);
    }

    #[test]
    fn test_inverse_lerp() {
        assert_relative_eq!(inverse_lerp(10.0, 20.0, 15.0), 0.5);
        assert_relative_eq!(inverse_lerp(3.0, 3.0, 7.0), 0.0);
    }

    #[test]
    fn test_wrap_hours() {
        assert_relative_eq!(wrap(25.0, 24.0), 1.0);
        assert_relative_eq!(wrap(-1.0, 24.0), 23.0);
        assert_relative_eq!(wrap(24.0, 24.0), 0.0);
    }
}
