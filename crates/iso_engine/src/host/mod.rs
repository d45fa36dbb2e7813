//! Render host lifecycle
//!
//! [`RenderHost`] ties the subsystems together behind one handle: async
//! initialization against a [`SurfaceFactory`], the per-frame tick,
//! external inputs, and teardown.

pub mod error;
pub mod render_host;
pub mod surface;
pub mod world;

pub use error::HostError;
pub use render_host::{CallbackId, FrameInfo, HostState, InitFuture, RenderHost};
pub use surface::{FrameLog, HeadlessSurface, HeadlessSurfaceFactory, RenderSurface, SurfaceFactory, SurfaceFuture};
pub use world::{Hit, SceneWorld};
