//! Isometric coordinate conversions
//!
//! Four spaces are involved:
//!
//! - **Backend grid**: integers in `[0, grid_max]²`, owned by the simulation.
//! - **Cartesian**: backend grid scaled by `backend_scale`; one unit is one tile.
//! - **Isometric (world)**: the 2:1 diamond projection of cartesian space.
//! - **Screen**: world space after camera pan and zoom (see [`crate::scene::Camera`]).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::config::ProjectionConfig;
use crate::foundation::math::Vec2;

/// A position on the backend grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl GridPoint {
    /// Create a grid point without clamping
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a float pair onto the grid and clamp into `[0, max]²`
    pub fn clamped(x: f32, y: f32, max: i32) -> Self {
        let round = |v: f32| {
            if v.is_finite() {
                (v.round() as i32).clamp(0, max)
            } else {
                0
            }
        };
        let point = Self::new(round(x), round(y));
        if (point.x as f32 - x).abs() > 0.5 || (point.y as f32 - y).abs() > 0.5 {
            log::warn!("Grid position ({x:.2}, {y:.2}) clamped to ({}, {})", point.x, point.y);
        }
        point
    }

    /// Clamp an integer point into `[0, max]²`
    pub fn clamp_to(self, max: i32) -> Self {
        Self::new(self.x.clamp(0, max), self.y.clamp(0, max))
    }
}

/// A position on the isometric world plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IsoPoint {
    /// Horizontal world coordinate
    pub x: f32,
    /// Vertical world coordinate; larger is nearer the viewer
    pub y: f32,
}

impl IsoPoint {
    /// Create an iso point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// As an nalgebra vector
    pub fn to_vec(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// From an nalgebra vector
    pub fn from_vec(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }

    /// Offset by a vector
    pub fn offset(self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Self) -> f32 {
        (self.to_vec() - other.to_vec()).norm()
    }
}

/// Paint-order key for nodes in the depth-sorted layers
///
/// Ordered by `iso.y * 1000` first and `iso.x * 0.1` second. Comparing the two
/// parts lexicographically keeps the order strictly monotonic in `y` even when
/// a large `x` would otherwise outweigh a small `y` difference in the sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthKey {
    primary: f64,
    tie: f64,
}

impl DepthKey {
    /// Depth key for a world position
    pub fn of(iso: IsoPoint) -> Self {
        Self {
            primary: f64::from(iso.y) * 1000.0,
            tie: f64::from(iso.x) * 0.1,
        }
    }

    /// The scalar form `y * 1000 + x * 0.1`
    pub fn value(self) -> f64 {
        self.primary + self.tie
    }
}

impl PartialEq for DepthKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DepthKey {}

impl PartialOrd for DepthKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DepthKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then_with(|| self.tie.total_cmp(&other.tie))
    }
}

/// Scaled Manhattan test used for diamond-shaped tiles and footprints
pub fn point_in_diamond(point: IsoPoint, center: IsoPoint, half_width: f32, half_height: f32) -> bool {
    if half_width <= 0.0 || half_height <= 0.0 {
        return false;
    }
    let dx = (point.x - center.x).abs() / half_width;
    let dy = (point.y - center.y).abs() / half_height;
    dx + dy <= 1.0
}

/// Conversions between backend grid, cartesian and isometric space
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTransform {
    tile_width: f32,
    tile_height: f32,
    backend_scale: f32,
    grid_max: i32,
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new(&ProjectionConfig::default())
    }
}

impl CoordinateTransform {
    /// Create a transform from projection settings
    pub fn new(config: &ProjectionConfig) -> Self {
        Self {
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            backend_scale: config.backend_scale,
            grid_max: config.grid_max,
        }
    }

    /// Tile width in world pixels
    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Tile height in world pixels
    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Largest valid backend coordinate
    pub fn grid_max(&self) -> i32 {
        self.grid_max
    }

    /// Ground tiles along one axis
    pub fn tiles_per_axis(&self) -> i32 {
        (self.grid_max as f32 * self.backend_scale).round() as i32
    }

    /// Project cartesian coordinates onto the iso plane
    pub fn cartesian_to_iso(&self, x: f32, y: f32) -> IsoPoint {
        IsoPoint::new(
            (x - y) * self.tile_width / 2.0,
            (x + y) * self.tile_height / 2.0,
        )
    }

    /// Exact inverse of [`Self::cartesian_to_iso`]
    pub fn iso_to_cartesian(&self, iso: IsoPoint) -> Vec2 {
        let a = iso.x / (self.tile_width / 2.0);
        let b = iso.y / (self.tile_height / 2.0);
        Vec2::new((a + b) / 2.0, (b - a) / 2.0)
    }

    /// Project a backend grid point
    pub fn backend_to_iso(&self, point: GridPoint) -> IsoPoint {
        self.backend_float_to_iso(point.x as f32, point.y as f32)
    }

    /// Project fractional backend coordinates (footprint corners, jitter)
    pub fn backend_float_to_iso(&self, x: f32, y: f32) -> IsoPoint {
        self.cartesian_to_iso(x * self.backend_scale, y * self.backend_scale)
    }

    /// Unrounded backend coordinates of a world position
    pub fn iso_to_backend_float(&self, iso: IsoPoint) -> Vec2 {
        self.iso_to_cartesian(iso) / self.backend_scale
    }

    /// Backend grid point of a world position, rounded and clamped
    pub fn iso_to_backend(&self, iso: IsoPoint) -> GridPoint {
        let backend = self.iso_to_backend_float(iso);
        GridPoint::clamped(backend.x, backend.y, self.grid_max)
    }

    /// Paint-order key of a world position
    pub fn depth_key(&self, iso: IsoPoint) -> DepthKey {
        DepthKey::of(iso)
    }

    /// Iso corners (top, right, bottom, left) of a footprint centered on `anchor`
    ///
    /// `width` and `height` are in backend units.
    pub fn footprint_corners(&self, anchor: GridPoint, width: f32, height: f32) -> [IsoPoint; 4] {
        let (cx, cy) = (anchor.x as f32, anchor.y as f32);
        let (hw, hh) = (width / 2.0, height / 2.0);
        [
            self.backend_float_to_iso(cx - hw, cy - hh),
            self.backend_float_to_iso(cx + hw, cy - hh),
            self.backend_float_to_iso(cx + hw, cy + hh),
            self.backend_float_to_iso(cx - hw, cy + hh),
        ]
    }

    /// World position of the center of ground tile `(column, row)`
    pub fn tile_center(&self, column: i32, row: i32) -> IsoPoint {
        self.cartesian_to_iso(column as f32 + 0.5, row as f32 + 0.5)
    }

    /// Ground tile containing a world position, if it lies on the grid
    pub fn ground_tile_at(&self, iso: IsoPoint) -> Option<(i32, i32)> {
        let cart = self.iso_to_cartesian(iso);
        let (column, row) = (cart.x.floor() as i32, cart.y.floor() as i32);
        let tiles = self.tiles_per_axis();
        if !(0..tiles).contains(&column) || !(0..tiles).contains(&row) {
            return None;
        }
        let center = self.tile_center(column, row);
        point_in_diamond(iso, center, self.tile_width / 2.0, self.tile_height / 2.0)
            .then_some((column, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_center_example() {
        let transform = CoordinateTransform::default();
        let iso = transform.backend_to_iso(GridPoint::new(50, 50));
        assert_relative_eq!(iso.x, 0.0);
        assert_relative_eq!(iso.y, 800.0);

        let cart = transform.iso_to_cartesian(iso);
        assert_relative_eq!(cart.x, 25.0);
        assert_relative_eq!(cart.y, 25.0);

        assert_eq!(transform.iso_to_backend(iso), GridPoint::new(50, 50));
    }

    #[test]
    fn test_backend_roundtrip_whole_grid() {
        let transform = CoordinateTransform::default();
        for x in 0..=100 {
            for y in 0..=100 {
                let back = transform.iso_to_backend(transform.backend_to_iso(GridPoint::new(x, y)));
                assert!((back.x - x).abs() <= 1 && (back.y - y).abs() <= 1, "({x}, {y}) -> {back:?}");
            }
        }
    }

    #[test]
    fn test_cartesian_inverse() {
        let transform = CoordinateTransform::default();
        let iso = transform.cartesian_to_iso(3.25, -7.5);
        let cart = transform.iso_to_cartesian(iso);
        assert_relative_eq!(cart.x, 3.25, epsilon = 1e-4);
        assert_relative_eq!(cart.y, -7.5, epsilon = 1e-4);
    }

    #[test]
    fn test_iso_to_backend_clamps() {
        let transform = CoordinateTransform::default();
        let far = transform.backend_float_to_iso(180.0, -40.0);
        assert_eq!(transform.iso_to_backend(far), GridPoint::new(100, 0));
    }

    #[test]
    fn test_depth_key_monotonic_in_y() {
        let front = DepthKey::of(IsoPoint::new(-5000.0, 10.001));
        let back = DepthKey::of(IsoPoint::new(5000.0, 10.0));
        assert!(back < front);
    }

    #[test]
    fn test_depth_key_ties_broken_by_x() {
        let left = DepthKey::of(IsoPoint::new(-1.0, 40.0));
        let right = DepthKey::of(IsoPoint::new(1.0, 40.0));
        assert!(left < right);
        assert_relative_eq!(right.value(), 40_000.1, epsilon = 1e-6);
    }

    #[test]
    fn test_point_in_diamond() {
        let center = IsoPoint::new(0.0, 0.0);
        assert!(point_in_diamond(IsoPoint::new(16.0, 8.0), center, 32.0, 16.0));
        assert!(point_in_diamond(IsoPoint::new(32.0, 0.0), center, 32.0, 16.0));
        assert!(!point_in_diamond(IsoPoint::new(20.0, 10.0), center, 32.0, 16.0));
    }

    #[test]
    fn test_ground_tile_lookup() {
        let transform = CoordinateTransform::default();
        let center = transform.tile_center(3, 7);
        assert_eq!(transform.ground_tile_at(center), Some((3, 7)));
        assert_eq!(transform.ground_tile_at(IsoPoint::new(0.0, -50.0)), None);
    }

    #[test]
    fn test_footprint_corners_surround_anchor() {
        let transform = CoordinateTransform::default();
        let anchor = GridPoint::new(20, 20);
        let [top, right, bottom, left] = transform.footprint_corners(anchor, 4.0, 4.0);
        let center = transform.backend_to_iso(anchor);
        assert!(top.y < center.y && bottom.y > center.y);
        assert!(left.x < center.x && right.x > center.x);
    }

    #[test]
    fn test_clamped_handles_non_finite() {
        assert_eq!(GridPoint::clamped(f32::NAN, 5.4, 100), GridPoint::new(0, 5));
    }
}
