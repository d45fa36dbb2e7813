//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and interpolation helpers
//! - Frame timing
//! - Handle collections for scene nodes and tweens
//! - Logging initialization

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
