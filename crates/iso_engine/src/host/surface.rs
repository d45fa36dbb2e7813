//! # Render Surface Abstraction
//!
//! The host never talks to a 2D API directly. It records a [`DrawList`] per
//! frame and hands it to a [`RenderSurface`], which replays it with whatever
//! canvas the embedding shell owns.
//!
//! Surfaces are created asynchronously by a [`SurfaceFactory`], because real
//! canvases usually need the shell to finish layout (or load fonts) first.
//!
//! [`HeadlessSurface`] keeps the last frame in memory; it backs the demo
//! binary and the tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::draw::DrawList;

use super::error::HostError;

/// Future resolving to a freshly created surface
pub type SurfaceFuture = LocalBoxFuture<'static, Result<Box<dyn RenderSurface>, HostError>>;

/// # Render Surface Trait
///
/// A drawable target sized in pixels.
pub trait RenderSurface {
    /// Current size in pixels
    fn size(&self) -> (u32, u32);

    /// Adapt to a new viewport size
    fn resize(&mut self, width: u32, height: u32);

    /// Replay one frame
    ///
    /// # Arguments
    /// * `frame` - Commands in paint order, in surface pixels
    fn present(&mut self, frame: &DrawList) -> Result<(), HostError>;
}

/// Creates surfaces on request
pub trait SurfaceFactory {
    /// Start creating a surface of the given size
    fn create(&self, width: u32, height: u32) -> SurfaceFuture;
}

/// What a headless surface has been asked to draw
#[derive(Debug, Default)]
pub struct FrameLog {
    /// Frames presented so far
    pub presented: u64,
    /// The most recent frame
    pub last_frame: Option<DrawList>,
    /// Size after the last resize
    pub size: (u32, u32),
}

/// Surface that only remembers what it was given
pub struct HeadlessSurface {
    log: Rc<RefCell<FrameLog>>,
}

impl HeadlessSurface {
    /// Create a surface writing into `log`
    pub fn new(width: u32, height: u32, log: Rc<RefCell<FrameLog>>) -> Self {
        log.borrow_mut().size = (width, height);
        Self { log }
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        self.log.borrow().size
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().size = (width, height);
    }

    fn present(&mut self, frame: &DrawList) -> Result<(), HostError> {
        let mut log = self.log.borrow_mut();
        log.presented += 1;
        log.last_frame = Some(frame.clone());
        Ok(())
    }
}

/// Factory producing [`HeadlessSurface`]s that share one [`FrameLog`]
#[derive(Default)]
pub struct HeadlessSurfaceFactory {
    log: Rc<RefCell<FrameLog>>,
    created: Cell<usize>,
    fail_with: Option<String>,
}

impl HeadlessSurfaceFactory {
    /// Create a factory that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory whose surfaces always fail to come up
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Shared record of what was presented
    pub fn frame_log(&self) -> Rc<RefCell<FrameLog>> {
        Rc::clone(&self.log)
    }

    /// How many surfaces were requested
    pub fn created(&self) -> usize {
        self.created.get()
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create(&self, width: u32, height: u32) -> SurfaceFuture {
        self.created.set(self.created.get() + 1);
        let result: Result<Box<dyn RenderSurface>, HostError> = match &self.fail_with {
            Some(reason) => Err(HostError::SurfaceCreation(reason.clone())),
            None => Ok(Box::new(HeadlessSurface::new(width, height, Rc::clone(&self.log)))),
        };
        future::ready(result).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_headless_surface_records_frames() {
        let factory = HeadlessSurfaceFactory::new();
        let mut surface = match block_on(factory.create(320, 200)) {
            Ok(surface) => surface,
            Err(error) => panic!("headless surface failed: {error}"),
        };
        surface.present(&DrawList::new()).expect("present succeeds");
        surface.resize(640, 400);

        let log = factory.frame_log();
        assert_eq!(log.borrow().presented, 1);
        assert_eq!(surface.size(), (640, 400));
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn test_failing_factory() {
        let factory = HeadlessSurfaceFactory::failing("no canvas");
        let result = block_on(factory.create(1, 1));
        assert!(matches!(result, Err(HostError::SurfaceCreation(reason)) if reason == "no canvas"));
    }
}
