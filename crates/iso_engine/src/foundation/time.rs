//! Frame timing utilities

/// Reference frame rate that per-frame velocities are authored against
pub const REFERENCE_FPS: f32 = 60.0;

/// Convert a delta in seconds into "reference frames"
///
/// Particle and sprite speeds are expressed in pixels per 60 Hz frame, so a
/// velocity multiplied by this factor moves the same distance per second on
/// any display rate.
pub fn frame_rate_normalization(delta_seconds: f32) -> f32 {
    delta_seconds * REFERENCE_FPS
}

/// Frame clock advanced by the deltas the hosting shell pushes
///
/// Deltas are capped so a stalled or backgrounded host does not produce one
/// enormous step that teleports every tween to its end.
pub struct FrameClock {
    total_time: f32,
    frame_count: u64,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock with a quarter-second delta cap
    pub fn new() -> Self {
        Self::with_max_delta(0.25)
    }

    /// Create a new clock with a custom delta cap (seconds)
    pub fn with_max_delta(max_delta: f32) -> Self {
        Self {
            total_time: 0.0,
            frame_count: 0,
            max_delta,
        }
    }

    /// Advance the clock by a host delta; returns the capped delta in seconds
    pub fn advance(&mut self, delta_seconds: f32) -> f32 {
        let delta = delta_seconds.clamp(0.0, self.max_delta);
        self.total_time += delta;
        self.frame_count += 1;
        delta
    }

    /// Get the total elapsed time since clock creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_caps_delta() {
        let mut clock = FrameClock::with_max_delta(0.1);
        assert_relative_eq!(clock.advance(0.5), 0.1);
        assert_relative_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.frame_count(), 2);
        assert_relative_eq!(clock.total_time(), 0.1);
    }

    #[test]
    fn test_frame_rate_normalization() {
        assert_relative_eq!(frame_rate_normalization(1.0 / 60.0), 1.0, epsilon = 1e-5);
        assert_relative_eq!(frame_rate_normalization(0.5), 30.0);
    }
}
