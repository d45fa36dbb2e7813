//! # Iso Engine
//!
//! A 2D isometric view engine for watching a town simulation run. The
//! simulation lives elsewhere; this crate draws it.
//!
//! ## Features
//!
//! - **Isometric Projection**: backend grid, world and screen coordinates with depth ordering
//! - **Scene Graph**: layered nodes, dirty tracking and a pan/zoom camera
//! - **Tweening**: eased property animation with cancellation and completion callbacks
//! - **Procedural Sprites**: per-state animation frames drawn from simple shapes
//! - **Environment**: hour-keyed daylight and screen-space weather particles
//! - **Entity Lifecycle**: reconcile mobile entities and structures against feed snapshots
//! - **Render Host**: async surface creation, buffered inputs and safe teardown
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//!
//! use futures::executor::block_on;
//! use iso_engine::prelude::*;
//!
//! fn main() -> Result<(), HostError> {
//!     let host = RenderHost::new(EngineConfig::default())?;
//!     block_on(host.init(Rc::new(HeadlessSurfaceFactory::new())))?;
//!
//!     host.sync_structures(&[StructureBrief::new("s1", "Cafe", 10.0, 10.0)])?;
//!     host.sync_entities(&[EntityBrief::new("a", "Ada", "Cafe")])?;
//!     host.set_hour(19.5)?;
//!     host.tick(1.0 / 60.0)?;
//!
//!     host.destroy();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Geometry and scene
pub mod coords;
pub mod scene;
pub mod tween;

// Appearance
pub mod animation;
pub mod draw;
pub mod environment;

// Simulation-facing surface
pub mod entities;
pub mod events;
pub mod host;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{AnimationState, AnimationStateMachine, Direction8},
        coords::{CoordinateTransform, DepthKey, GridPoint, IsoPoint},
        core::{Config, ConfigError, EngineConfig},
        draw::{Color, DrawCommand, DrawList},
        entities::{
            DragCommit, EntityBrief, EntityLifecycle, MobileEntityManager, ReconcileReport, StructureBrief,
            StructureManager,
        },
        environment::{DayPhase, DaylightCycle, DaylightEvent, WeatherMode, WeatherSimulator},
        events::{Event, EventHandler, EventType},
        foundation::math::Vec2,
        host::{
            FrameInfo, HeadlessSurfaceFactory, Hit, HostError, HostState, RenderHost, RenderSurface, SurfaceFactory,
        },
        scene::{Camera, SceneGraph, SceneNode},
        tween::{Easing, TweenEngine, TweenProperty, TweenRequest},
    };
}
