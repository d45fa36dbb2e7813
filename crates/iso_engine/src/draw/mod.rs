//! Procedural drawing
//!
//! Everything on screen is built from flat primitives: diamonds for ground
//! tiles, shaded boxes for structures, rectangle recipes for figures.

pub mod color;
pub mod draw_list;
pub mod painter;
pub mod sprite;

pub use color::{Color, ColorRole, Palette};
pub use draw_list::{DrawCommand, DrawList};
pub use painter::{FrameContext, Painter};
pub use sprite::{SpriteAtlas, SpritePart};
