//! # Core Engine Module
//!
//! Shared configuration used by every subsystem.

pub mod config;

pub use config::{
    AnimationConfig,
    CameraConfig,
    Config,
    ConfigError,
    CountRange,
    DaylightConfig,
    DaylightKeyframe,
    EngineConfig,
    EntityConfig,
    FloatRange,
    HostConfig,
    ParticleModeConfig,
    ProjectionConfig,
    WeatherConfig,
};
