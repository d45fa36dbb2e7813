//! Backend-neutral drawing commands
//!
//! The painter records a frame as a flat list of primitives in screen pixels.
//! A [`crate::host::RenderSurface`] replays the list with whatever 2D API it
//! wraps.

use crate::foundation::math::Vec2;

use super::color::Color;

/// One screen-space drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface
    Clear(Color),
    /// Axis-aligned filled rectangle
    Rect {
        /// Top-left corner
        origin: Vec2,
        /// Width and height
        size: Vec2,
        /// Fill
        color: Color,
    },
    /// Filled convex polygon
    Polygon {
        /// Vertices in winding order
        points: Vec<Vec2>,
        /// Fill
        color: Color,
    },
    /// Filled ellipse
    Ellipse {
        /// Center
        center: Vec2,
        /// Horizontal and vertical radii
        radii: Vec2,
        /// Fill
        color: Color,
    },
    /// Straight stroke
    Line {
        /// Start point
        from: Vec2,
        /// End point
        to: Vec2,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Color,
    },
    /// Text anchored at its top-center
    Text {
        /// Anchor
        position: Vec2,
        /// Content
        text: String,
        /// Font size in pixels
        size: f32,
        /// Text color
        color: Color,
    },
    /// Translucent full-surface wash
    Tint(Color),
}

/// Ordered commands for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Fill the surface
    pub fn clear(&mut self, color: Color) {
        self.push(DrawCommand::Clear(color));
    }

    /// Filled rectangle
    pub fn rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.push(DrawCommand::Rect { origin, size, color });
    }

    /// Filled polygon; fewer than three points draws nothing
    pub fn polygon(&mut self, points: Vec<Vec2>, color: Color) {
        if points.len() >= 3 {
            self.push(DrawCommand::Polygon { points, color });
        }
    }

    /// Filled ellipse
    pub fn ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.push(DrawCommand::Ellipse { center, radii, color });
    }

    /// Stroke
    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(DrawCommand::Line { from, to, width, color });
    }

    /// Text
    pub fn text(&mut self, position: Vec2, text: impl Into<String>, size: f32, color: Color) {
        self.push(DrawCommand::Text {
            position,
            text: text.into(),
            size,
            color,
        });
    }

    /// Full-surface wash; fully transparent tints are skipped
    pub fn tint(&mut self, color: Color) {
        if color.a > 0.0 {
            self.push(DrawCommand::Tint(color));
        }
    }

    /// Recorded commands in order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every command, keeping the allocation
    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_primitives_skipped() {
        let mut list = DrawList::new();
        list.polygon(vec![Vec2::zeros(), Vec2::new(1.0, 0.0)], Color::WHITE);
        list.tint(Color::TRANSPARENT);
        assert!(list.is_empty());
    }

    #[test]
    fn test_commands_keep_order() {
        let mut list = DrawList::new();
        list.clear(Color::BLACK);
        list.text(Vec2::zeros(), "06:00", 12.0, Color::WHITE);
        assert_eq!(list.len(), 2);
        assert!(matches!(list.commands()[0], DrawCommand::Clear(_)));
        list.reset();
        assert!(list.is_empty());
    }
}
