//! Easing curves
//!
//! Every curve maps `[0, 1]` onto `[0, 1]` with `f(0) = 0` and `f(1) = 1`.

use serde::{Deserialize, Serialize};

use crate::foundation::math::constants::PI;

/// Interpolation curve applied to tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Accelerating quadratic
    QuadIn,
    /// Decelerating quadratic
    QuadOut,
    /// Quadratic ease in and out
    QuadInOut,
    /// Accelerating cubic
    CubicIn,
    /// Decelerating cubic
    CubicOut,
    /// Cubic ease in and out
    CubicInOut,
    /// Accelerating sine
    SineIn,
    /// Decelerating sine
    SineOut,
    /// Sine ease in and out
    SineInOut,
}

impl Easing {
    /// Every curve, for iteration in tests and pickers
    pub const ALL: [Easing; 10] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
    ];

    /// Evaluate the curve; `t` is clamped to `[0, 1]`
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_endpoints_fixed() {
        for easing in Easing::ALL {
            assert_abs_diff_eq!(easing.apply(0.0), 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(easing.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_in_out_midpoint() {
        assert_abs_diff_eq!(Easing::QuadInOut.apply(0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(Easing::CubicInOut.apply(0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(Easing::SineInOut.apply(0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_in_curves_lag_out_curves() {
        assert!(Easing::QuadIn.apply(0.3) < Easing::QuadOut.apply(0.3));
        assert!(Easing::CubicIn.apply(0.3) < Easing::Linear.apply(0.3));
    }

    #[test]
    fn test_input_is_clamped() {
        assert_abs_diff_eq!(Easing::QuadOut.apply(1.5), 1.0, epsilon = 1e-6);
    }
}
