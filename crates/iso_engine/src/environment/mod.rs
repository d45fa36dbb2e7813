//! Environmental effects
//!
//! Lighting driven by the external clock, and the weather particle pool.

pub mod daylight;
pub mod weather;

pub use daylight::{
    building_light_intensity, format_clock, is_night, DayPhase, DaylightCycle, DaylightEvent,
    DaylightSample, TimeOfDay,
};
pub use weather::{Particle, ParticleKind, WeatherMode, WeatherSimulator};
