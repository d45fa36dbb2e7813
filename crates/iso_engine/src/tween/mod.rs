//! Property interpolation
//!
//! [`TweenEngine`] drives time-bounded interpolation of node properties;
//! [`Easing`] supplies the curves.

pub mod easing;
pub mod engine;

pub use easing::Easing;
pub use engine::{CompletionCallback, TweenEngine, TweenProperty, TweenRequest, Tweenable};
