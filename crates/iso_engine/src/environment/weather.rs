//! # Weather Simulator
//!
//! A screen-space particle pool for the current weather mode. Switching mode
//! throws the whole pool away and samples a new one; particles never leave the
//! viewport because they wrap around when they cross an edge.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{FloatRange, ParticleModeConfig, WeatherConfig};
use crate::foundation::math::utils::wrap;
use crate::foundation::math::Vec2;
use crate::foundation::time::frame_rate_normalization;

/// Fraction of the viewport height drifting shapes stay within
const CLOUD_BAND: f32 = 0.4;

/// Weather as far as the view is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeatherMode {
    /// No particles
    #[default]
    Calm,
    /// Sparse, slow drifting shapes
    Overcast,
    /// Dense, fast falling streaks
    Precipitation,
}

impl WeatherMode {
    /// Map a weather condition name from the simulation
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "calm" | "clear" | "sunny" | "partly_cloudy" => Some(WeatherMode::Calm),
            "overcast" | "cloudy" | "fog" | "foggy" => Some(WeatherMode::Overcast),
            "precipitation" | "rain" | "rainy" | "heavy_rain" | "storm" | "snow" => {
                Some(WeatherMode::Precipitation)
            }
            _ => None,
        }
    }
}

impl fmt::Display for WeatherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeatherMode::Calm => "calm",
            WeatherMode::Overcast => "overcast",
            WeatherMode::Precipitation => "precipitation",
        };
        f.write_str(name)
    }
}

/// What a particle looks like and how it wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Falls downwards; re-enters at the top at a new random x
    Raindrop,
    /// Drifts right; re-enters at the left edge at a new random height
    DriftingShape,
}

/// One weather particle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Appearance and wrap rule
    pub kind: ParticleKind,
    /// Position in screen pixels
    pub position: Vec2,
    /// Velocity in pixels per reference frame
    pub velocity: Vec2,
    /// Streak length or shape width in pixels
    pub size: f32,
    /// Opacity in `[0, 1]`
    pub opacity: f32,
}

/// Particle pool for the active weather mode
pub struct WeatherSimulator {
    config: WeatherConfig,
    mode: WeatherMode,
    particles: Vec<Particle>,
    bounds: Vec2,
    rng: ChaCha8Rng,
}

impl WeatherSimulator {
    /// Create a calm simulator for a viewport
    ///
    /// Uses the configured seed, or a random one when none is set.
    pub fn new(config: &WeatherConfig, width: f32, height: f32) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            config: config.clone(),
            mode: WeatherMode::Calm,
            particles: Vec::new(),
            bounds: Vec2::new(width.max(1.0), height.max(1.0)),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Active mode
    pub fn mode(&self) -> WeatherMode {
        self.mode
    }

    /// Live particles
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Viewport size particles are confined to
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Switch mode, replacing the particle pool; returns false if unchanged
    pub fn set_mode(&mut self, mode: WeatherMode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.particles.clear();
        self.mode = mode;
        match mode {
            WeatherMode::Calm => {}
            WeatherMode::Overcast => {
                let settings = self.config.overcast;
                self.spawn(ParticleKind::DriftingShape, &settings);
            }
            WeatherMode::Precipitation => {
                let settings = self.config.precipitation;
                self.spawn(ParticleKind::Raindrop, &settings);
            }
        }
        log::info!("Weather changed to {mode} ({} particles)", self.particles.len());
        true
    }

    /// Advance every particle by `delta_seconds`
    pub fn update(&mut self, delta_seconds: f32) {
        let step = frame_rate_normalization(delta_seconds.max(0.0));
        if step == 0.0 {
            return;
        }
        let bounds = self.bounds;
        for index in 0..self.particles.len() {
            let mut particle = self.particles[index];
            particle.position += particle.velocity * step;
            self.wrap_particle(&mut particle, bounds);
            self.particles[index] = particle;
        }
    }

    /// Change the viewport and pull any particle now outside back in
    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Vec2::new(width.max(1.0), height.max(1.0));
        let bounds = self.bounds;
        for index in 0..self.particles.len() {
            let mut particle = self.particles[index];
            self.wrap_particle(&mut particle, bounds);
            self.particles[index] = particle;
        }
    }

    fn spawn(&mut self, kind: ParticleKind, settings: &ParticleModeConfig) {
        let count = if settings.count.max > settings.count.min {
            self.rng.gen_range(settings.count.min..=settings.count.max)
        } else {
            settings.count.min
        };
        let (width, height) = (self.bounds.x, self.bounds.y);
        self.particles.reserve(count as usize);
        for _ in 0..count {
            let speed = sample(&mut self.rng, settings.speed);
            let size = sample(&mut self.rng, settings.size);
            let particle = match kind {
                ParticleKind::Raindrop => Particle {
                    kind,
                    position: Vec2::new(self.rng.gen_range(0.0..width), self.rng.gen_range(0.0..height)),
                    velocity: Vec2::new(speed * settings.drift, speed),
                    size,
                    opacity: self.rng.gen_range(0.35..0.75),
                },
                ParticleKind::DriftingShape => Particle {
                    kind,
                    position: Vec2::new(
                        self.rng.gen_range(0.0..width),
                        self.rng.gen_range(0.0..=height * CLOUD_BAND),
                    ),
                    velocity: Vec2::new(speed, 0.0),
                    size,
                    opacity: self.rng.gen_range(0.15..0.35),
                },
            };
            self.particles.push(particle);
        }
    }

    fn wrap_particle(&mut self, particle: &mut Particle, bounds: Vec2) {
        match particle.kind {
            ParticleKind::Raindrop => {
                if particle.position.y > bounds.y || particle.position.y < 0.0 {
                    particle.position.y = 0.0;
                    particle.position.x = self.rng.gen_range(0.0..bounds.x);
                } else {
                    particle.position.x = wrap(particle.position.x, bounds.x);
                }
            }
            ParticleKind::DriftingShape => {
                if particle.position.x > bounds.x || particle.position.x < 0.0 {
                    particle.position.x = 0.0;
                    particle.position.y = self.rng.gen_range(0.0..=bounds.y * CLOUD_BAND);
                }
                particle.position.y = particle.position.y.clamp(0.0, bounds.y);
            }
        }
    }
}

fn sample(rng: &mut ChaCha8Rng, range: FloatRange) -> f32 {
    if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> WeatherSimulator {
        WeatherSimulator::new(&WeatherConfig::default().with_seed(11), 800.0, 600.0)
    }

    fn in_bounds(sim: &WeatherSimulator) -> bool {
        let bounds = sim.bounds();
        sim.particles().iter().all(|p| {
            (0.0..=bounds.x).contains(&p.position.x) && (0.0..=bounds.y).contains(&p.position.y)
        })
    }

    #[test]
    fn test_calm_has_no_particles() {
        let sim = seeded();
        assert_eq!(sim.mode(), WeatherMode::Calm);
        assert!(sim.particles().is_empty());
    }

    #[test]
    fn test_counts_within_configured_range() {
        let mut sim = seeded();
        sim.set_mode(WeatherMode::Precipitation);
        assert!((150..=250).contains(&sim.particles().len()));
        assert!(sim.particles().iter().all(|p| p.kind == ParticleKind::Raindrop));
        assert!(sim.particles().iter().all(|p| (8.0..=14.0).contains(&p.velocity.y)));

        sim.set_mode(WeatherMode::Overcast);
        assert!((6..=10).contains(&sim.particles().len()));
        assert!(sim.particles().iter().all(|p| p.kind == ParticleKind::DriftingShape));
    }

    #[test]
    fn test_same_mode_keeps_pool() {
        let mut sim = seeded();
        assert!(sim.set_mode(WeatherMode::Overcast));
        let before = sim.particles().to_vec();
        assert!(!sim.set_mode(WeatherMode::Overcast));
        assert_eq!(sim.particles(), before.as_slice());
    }

    #[test]
    fn test_rain_wraps_to_top() {
        let mut sim = seeded();
        sim.set_mode(WeatherMode::Precipitation);
        let mut wrapped = false;
        // the slowest drop crosses 600px in under a second
        for _ in 0..120 {
            let before: Vec<f32> = sim.particles().iter().map(|p| p.position.y).collect();
            sim.update(1.0 / 60.0);
            assert!(in_bounds(&sim));
            wrapped |= sim
                .particles()
                .iter()
                .zip(before)
                .any(|(p, y)| p.position.y < y);
        }
        assert!(wrapped);
    }

    #[test]
    fn test_clouds_wrap_to_left_edge() {
        let mut sim = seeded();
        sim.set_mode(WeatherMode::Overcast);
        for _ in 0..4000 {
            sim.update(1.0 / 60.0);
        }
        assert!(in_bounds(&sim));
        assert!(sim.particles().iter().all(|p| p.position.y <= 600.0 * CLOUD_BAND));
    }

    #[test]
    fn test_resize_rewraps() {
        let mut sim = seeded();
        sim.set_mode(WeatherMode::Precipitation);
        sim.resize(200.0, 100.0);
        assert!(in_bounds(&sim));
    }

    #[test]
    fn test_seed_is_deterministic() {
        let mut a = seeded();
        let mut b = seeded();
        a.set_mode(WeatherMode::Precipitation);
        b.set_mode(WeatherMode::Precipitation);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(WeatherMode::from_name("Rain"), Some(WeatherMode::Precipitation));
        assert_eq!(WeatherMode::from_name("cloudy"), Some(WeatherMode::Overcast));
        assert_eq!(WeatherMode::from_name("hail"), None);
    }
}
