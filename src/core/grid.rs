use crate::core::constants::{GRID_MAX, GRID_MIN, TILE_SIZE};
use serde::{Deserialize, Serialize};

/// Represents a point in screen or world pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.subtract(other).magnitude()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Axis-aligned rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether this rect intersects `other` inflated by `buffer` on every side
    pub fn intersects_inflated(&self, other: &ScreenRect, buffer: f64) -> bool {
        self.x < other.x + other.width + buffer
            && self.x + self.width > other.x - buffer
            && self.y < other.y + other.height + buffer
            && self.y + self.height > other.y - buffer
    }
}

/// Identity of one fixed 512px raster tile in the map grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileKey {
    pub level: i32,
    pub gx: i32,
    pub gy: i32,
}

impl TileKey {
    pub fn new(level: i32, gx: i32, gy: i32) -> Self {
        Self { level, gx, gy }
    }

    /// Creates a key with grid coordinates clamped into MAP_BOUNDS
    pub fn clamped(level: i32, gx: i32, gy: i32) -> Self {
        Self {
            level,
            gx: gx.clamp(GRID_MIN, GRID_MAX),
            gy: gy.clamp(GRID_MIN, GRID_MAX),
        }
    }

    /// World pixel position of the tile's top-left corner
    pub fn world_origin(&self) -> Point {
        Point::new(self.gx as f64 * TILE_SIZE, self.gy as f64 * TILE_SIZE)
    }

    /// Checks the key lies within the map grid
    pub fn in_bounds(&self) -> bool {
        self.gx >= GRID_MIN && self.gx <= GRID_MAX && self.gy >= GRID_MIN && self.gy <= GRID_MAX
    }
}
