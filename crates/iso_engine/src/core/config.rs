//! # Unified Configuration System
//!
//! All configuration structures for the view engine live here so they can be
//! discovered, serialized and validated in one place.
//!
//! ## Configuration Categories
//!
//! - **Projection**: tile size and backend grid scaling
//! - **Camera**: zoom limits
//! - **Animation**: frame rate and frame counts per pose
//! - **Daylight**: the hour-keyed lighting table
//! - **Weather**: particle ranges per weather mode
//! - **Entities**: placement jitter, movement timing, picking radius
//! - **Host**: surface size and background
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! needs to name the values it overrides.

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::draw::color::Color;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// # Projection Configuration
///
/// Defines the 2:1 isometric tile and how backend grid units map onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Tile width in world pixels
    pub tile_width: f32,
    /// Tile height in world pixels
    pub tile_height: f32,
    /// Factor applied to backend grid coordinates before projecting
    pub backend_scale: f32,
    /// Upper bound of the backend grid on both axes (lower bound is 0)
    pub grid_max: i32,
}

impl ProjectionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_width <= 0.0 || self.tile_height <= 0.0 {
            return Err(invalid("tile dimensions must be positive"));
        }
        if self.backend_scale <= 0.0 {
            return Err(invalid("backend scale must be positive"));
        }
        if self.grid_max <= 0 {
            return Err(invalid("grid_max must be positive"));
        }
        Ok(())
    }

    /// Number of ground tiles along one axis
    pub fn tiles_per_axis(&self) -> i32 {
        (self.grid_max as f32 * self.backend_scale).round() as i32
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            tile_width: 64.0,
            tile_height: 32.0,
            backend_scale: 0.5,
            grid_max: 100,
        }
    }
}

/// # Camera Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Smallest allowed zoom
    pub min_zoom: f32,
    /// Largest allowed zoom
    pub max_zoom: f32,
    /// Zoom applied when the host starts
    pub initial_zoom: f32,
    /// Multiplicative step used by wheel/keyboard zoom
    pub zoom_step: f32,
}

impl CameraConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(invalid("zoom range must satisfy 0 < min_zoom <= max_zoom"));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.initial_zoom) {
            return Err(invalid("initial zoom must lie within the zoom range"));
        }
        if self.zoom_step <= 0.0 {
            return Err(invalid("zoom step must be positive"));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 3.0,
            initial_zoom: 1.0,
            zoom_step: 0.1,
        }
    }
}

/// # Animation Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames per second for every pose
    pub fps: f32,
    /// Frames in the idle loop
    pub idle_frames: usize,
    /// Frames in the walk cycle
    pub walking_frames: usize,
    /// Frames in the working loop
    pub working_frames: usize,
    /// Frames in the chatting loop
    pub chatting_frames: usize,
}

impl AnimationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps <= 0.0 {
            return Err(invalid("animation fps must be positive"));
        }
        let counts = [
            self.idle_frames,
            self.walking_frames,
            self.working_frames,
            self.chatting_frames,
        ];
        if counts.contains(&0) {
            return Err(invalid("every animation state needs at least one frame"));
        }
        Ok(())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 8.0,
            idle_frames: 2,
            walking_frames: 4,
            working_frames: 4,
            chatting_frames: 2,
        }
    }
}

/// One row of the daylight table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaylightKeyframe {
    /// Hour this row applies to, in `[0, 24)`
    pub hour: f32,
    /// Background sky color
    pub sky: Color,
    /// Multiplicative tint applied to the world
    pub tint: Color,
    /// Ambient light level in `[0, 1]`
    pub ambient: f32,
}

impl DaylightKeyframe {
    /// Create a keyframe from packed hex colors
    pub fn new(hour: f32, sky: u32, tint: u32, ambient: f32) -> Self {
        Self {
            hour,
            sky: Color::from_hex(sky),
            tint: Color::from_hex(tint),
            ambient,
        }
    }
}

/// # Daylight Configuration
///
/// Keyframes are unevenly spaced: dense around sunrise and sunset where the
/// light changes quickly, sparse through midday and the middle of the night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaylightConfig {
    /// Rows sorted by strictly increasing hour
    pub keyframes: Vec<DaylightKeyframe>,
}

impl DaylightConfig {
    /// Validate the table
    ///
    /// Any non-empty table of strictly increasing hours in `[0, 24)` brackets
    /// every hour once wraparound is applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keyframes.is_empty() {
            return Err(invalid("daylight table is empty"));
        }
        for frame in &self.keyframes {
            if !(0.0..24.0).contains(&frame.hour) {
                return Err(invalid(format!("daylight hour {} outside [0, 24)", frame.hour)));
            }
            if !(0.0..=1.0).contains(&frame.ambient) {
                return Err(invalid(format!("ambient {} outside [0, 1]", frame.ambient)));
            }
        }
        if self.keyframes.windows(2).any(|pair| pair[0].hour >= pair[1].hour) {
            return Err(invalid("daylight hours must be strictly increasing"));
        }
        Ok(())
    }
}

impl Default for DaylightConfig {
    fn default() -> Self {
        Self {
            keyframes: vec![
                DaylightKeyframe::new(0.0, 0x0B_10_2A, 0x4A_55_8C, 0.25),
                DaylightKeyframe::new(4.5, 0x12_18_3A, 0x55_5E_94, 0.28),
                DaylightKeyframe::new(5.0, 0x2B_2A_5A, 0x7A_6E_A8, 0.35),
                DaylightKeyframe::new(5.5, 0x6B_4A_7A, 0xB0_8C_A8, 0.5),
                DaylightKeyframe::new(6.0, 0xF0_9A_6C, 0xF2_C0_A0, 0.65),
                DaylightKeyframe::new(6.5, 0xF6_C0_8A, 0xF8_DC_C0, 0.78),
                DaylightKeyframe::new(7.0, 0x9C_D0_F0, 0xFC_F0_E0, 0.88),
                DaylightKeyframe::new(9.0, 0x87_CE_EB, 0xFF_FA_F0, 0.95),
                DaylightKeyframe::new(12.0, 0x7E_C8_F0, 0xFF_FF_FF, 1.0),
                DaylightKeyframe::new(15.0, 0x86_C6_E8, 0xFF_F8_EC, 0.96),
                DaylightKeyframe::new(17.0, 0xA8_C0_D8, 0xFF_E8_D0, 0.85),
                DaylightKeyframe::new(17.5, 0xF2_B0_7A, 0xFA_D2_A8, 0.76),
                DaylightKeyframe::new(18.0, 0xF0_8A_5A, 0xF0_B0_8C, 0.65),
                DaylightKeyframe::new(18.5, 0xB0_5A_6A, 0xC8_92_9C, 0.52),
                DaylightKeyframe::new(19.0, 0x5A_3A_6A, 0x92_80_AC, 0.42),
                DaylightKeyframe::new(19.5, 0x2E_2A_5A, 0x70_6C_A0, 0.34),
                DaylightKeyframe::new(20.0, 0x1A_1E_48, 0x5A_62_98, 0.3),
                DaylightKeyframe::new(22.0, 0x0E_14_32, 0x4E_58_90, 0.26),
            ],
        }
    }
}

/// Inclusive float range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl FloatRange {
    /// Create a range
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn validate(&self, what: &str) -> Result<(), ConfigError> {
        if self.min > self.max || self.min < 0.0 {
            return Err(invalid(format!("{what} range must satisfy 0 <= min <= max")));
        }
        Ok(())
    }
}

/// Inclusive integer range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    /// Lower bound
    pub min: u32,
    /// Upper bound
    pub max: u32,
}

impl CountRange {
    /// Create a range
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Particle parameters for one weather mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleModeConfig {
    /// How many particles the mode spawns
    pub count: CountRange,
    /// Speed in pixels per reference frame
    pub speed: FloatRange,
    /// Streak length or shape width in pixels
    pub size: FloatRange,
    /// Horizontal drift relative to speed (rain slant)
    pub drift: f32,
}

impl ParticleModeConfig {
    fn validate(&self, mode: &str) -> Result<(), ConfigError> {
        if self.count.min > self.count.max {
            return Err(invalid(format!("{mode}: count range must satisfy min <= max")));
        }
        self.speed.validate(mode)?;
        self.size.validate(mode)
    }
}

/// # Weather Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Sparse, slow drifting shapes
    pub overcast: ParticleModeConfig,
    /// Dense, fast streaks
    pub precipitation: ParticleModeConfig,
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl WeatherConfig {
    /// Fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.overcast.validate("overcast")?;
        self.precipitation.validate("precipitation")
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            overcast: ParticleModeConfig {
                count: CountRange::new(6, 10),
                speed: FloatRange::new(0.2, 0.5),
                size: FloatRange::new(60.0, 140.0),
                drift: 0.0,
            },
            precipitation: ParticleModeConfig {
                count: CountRange::new(150, 250),
                speed: FloatRange::new(8.0, 14.0),
                size: FloatRange::new(10.0, 20.0),
                drift: 0.15,
            },
            seed: None,
        }
    }
}

/// # Entity Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Radius in world pixels of the placement jitter around a location
    pub jitter_radius: f32,
    /// Seconds a mobile entity takes to walk to a new position
    pub move_duration: f32,
    /// Seconds a structure takes to slide to a new position
    pub structure_move_duration: f32,
    /// Seconds newly created nodes take to fade in
    pub fade_in_duration: f32,
    /// Default picking radius in world pixels
    pub hit_radius: f32,
    /// Seed mixed into the per-entity jitter hash
    pub jitter_seed: u64,
}

impl EntityConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jitter_radius < 0.0 || self.hit_radius < 0.0 {
            return Err(invalid("radii must not be negative"));
        }
        if self.move_duration < 0.0 || self.structure_move_duration < 0.0 || self.fade_in_duration < 0.0 {
            return Err(invalid("durations must not be negative"));
        }
        Ok(())
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            jitter_radius: 24.0,
            move_duration: 1.5,
            structure_move_duration: 0.4,
            fade_in_duration: 0.3,
            hit_radius: 20.0,
            jitter_seed: 0x5EED,
        }
    }
}

/// # Host Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Initial surface width in pixels
    pub width: u32,
    /// Initial surface height in pixels
    pub height: u32,
    /// Whether structures can be dragged from the start
    pub drag_enabled: bool,
    /// Whether entity names are drawn under sprites
    pub show_labels: bool,
}

impl HostConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid("surface size must be non-zero"));
        }
        Ok(())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            drag_enabled: true,
            show_labels: true,
        }
    }
}

/// # Complete Engine Configuration
///
/// Top-level configuration that encompasses every subsystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Projection settings
    pub projection: ProjectionConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Animation settings
    pub animation: AnimationConfig,
    /// Daylight table
    pub daylight: DaylightConfig,
    /// Weather particle settings
    pub weather: WeatherConfig,
    /// Entity placement and movement settings
    pub entities: EntityConfig,
    /// Host surface settings
    pub host: HostConfig,
}

impl EngineConfig {
    /// Set the surface size
    pub fn with_surface_size(mut self, width: u32, height: u32) -> Self {
        self.host.width = width;
        self.host.height = height;
        self
    }

    /// Fix the weather RNG seed
    pub fn with_weather_seed(mut self, seed: u64) -> Self {
        self.weather.seed = Some(seed);
        self
    }

    /// Set the tile size
    pub fn with_tile_size(mut self, width: f32, height: f32) -> Self {
        self.projection.tile_width = width;
        self.projection.tile_height = height;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.projection.validate()?;
        self.camera.validate()?;
        self.animation.validate()?;
        self.daylight.validate()?;
        self.weather.validate()?;
        self.entities.validate()?;
        self.host.validate()
    }
}

impl Config for EngineConfig {
    fn check(&self) -> Result<(), ConfigError> {
        self.validate()
    }
}
