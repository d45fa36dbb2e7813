//! Coordinate spaces and depth ordering

pub mod transform;

pub use transform::{point_in_diamond, CoordinateTransform, DepthKey, GridPoint, IsoPoint};
