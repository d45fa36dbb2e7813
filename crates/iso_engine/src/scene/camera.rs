//! # 2D View Camera
//!
//! Maps world (isometric) coordinates to screen pixels:
//!
//! ```text
//! screen = viewport_center + world * zoom + pan
//! ```
//!
//! `pan` is kept in screen pixels so dragging the view moves it exactly with
//! the pointer at any zoom level.

use crate::core::config::CameraConfig;
use crate::coords::IsoPoint;
use crate::foundation::math::Vec2;

/// Pan and zoom state of the world view
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pan: Vec2,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    zoom_step: f32,
    viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default(), 1280.0, 720.0)
    }
}

impl Camera {
    /// Create a camera for a viewport of the given size
    pub fn new(config: &CameraConfig, width: f32, height: f32) -> Self {
        Self {
            pan: Vec2::zeros(),
            zoom: config.initial_zoom.clamp(config.min_zoom, config.max_zoom),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_step: config.zoom_step,
            viewport: Vec2::new(width, height),
        }
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current pan in screen pixels
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Center of the viewport in pixels
    pub fn viewport_center(&self) -> Vec2 {
        self.viewport / 2.0
    }

    /// Set the zoom, clamped to the configured range; zooms about the viewport center
    pub fn set_zoom(&mut self, zoom: f32) {
        let center = self.viewport_center();
        self.zoom_at(center, zoom / self.zoom);
    }

    /// Multiply the zoom by `factor`, keeping the world point under `anchor` fixed
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let world = self.screen_to_world(anchor);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        self.pan = anchor - self.viewport_center() - world.to_vec() * self.zoom;
    }

    /// Step the zoom in by the configured step
    pub fn zoom_in(&mut self, anchor: Vec2) {
        self.zoom_at(anchor, 1.0 + self.zoom_step);
    }

    /// Step the zoom out by the configured step
    pub fn zoom_out(&mut self, anchor: Vec2) {
        self.zoom_at(anchor, 1.0 / (1.0 + self.zoom_step));
    }

    /// Translate the view by a screen-space delta
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Replace the pan
    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Center the view on a world point
    pub fn focus_on(&mut self, world: IsoPoint) {
        self.pan = -world.to_vec() * self.zoom;
    }

    /// Update the viewport size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    /// World position to screen pixels
    pub fn world_to_screen(&self, world: IsoPoint) -> Vec2 {
        self.viewport_center() + world.to_vec() * self.zoom + self.pan
    }

    /// Screen pixels to world position
    pub fn screen_to_world(&self, screen: Vec2) -> IsoPoint {
        IsoPoint::from_vec((screen - self.viewport_center() - self.pan) / self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_screen_world_roundtrip() {
        let mut camera = Camera::default();
        camera.pan_by(Vec2::new(35.0, -12.0));
        camera.set_zoom(1.7);
        let world = IsoPoint::new(120.0, 640.0);
        let back = camera.screen_to_world(camera.world_to_screen(world));
        assert_relative_eq!(back.x, world.x, epsilon = 1e-3);
        assert_relative_eq!(back.y, world.y, epsilon = 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.set_zoom(10.0);
        assert_relative_eq!(camera.zoom(), 3.0);
        camera.set_zoom(0.01);
        assert_relative_eq!(camera.zoom(), 0.5);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut camera = Camera::default();
        let anchor = Vec2::new(900.0, 200.0);
        let before = camera.screen_to_world(anchor);
        camera.zoom_at(anchor, 2.0);
        let after = camera.screen_to_world(anchor);
        assert_relative_eq!(before.x, after.x, epsilon = 1e-3);
        assert_relative_eq!(before.y, after.y, epsilon = 1e-3);
    }

    #[test]
    fn test_focus_centers_point() {
        let mut camera = Camera::default();
        camera.set_zoom(2.0);
        camera.focus_on(IsoPoint::new(0.0, 800.0));
        let screen = camera.world_to_screen(IsoPoint::new(0.0, 800.0));
        assert_relative_eq!(screen.x, 640.0, epsilon = 1e-3);
        assert_relative_eq!(screen.y, 360.0, epsilon = 1e-3);
    }
}
