use crate::core::constants::{MAX_OFFSET, TILE_SIZE};
use crate::core::grid::{Point, ScreenRect, TileKey};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// The host-owned view of the map: pixel offset, scale, and screen size.
///
/// The engine never mutates this; it reads a fresh copy every tick and asks
/// the host to change it through the move callback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Screen-space translation applied to the world, in pixels
    pub offset_x: f64,
    pub offset_y: f64,
    /// World-to-screen magnification, must be finite and > 0
    pub scale: f64,
    /// Viewport size in pixels
    pub width: i32,
    pub height: i32,
}

impl ViewportState {
    pub fn new(offset_x: f64, offset_y: f64, scale: f64, width: i32, height: i32) -> Self {
        Self {
            offset_x,
            offset_y,
            scale,
            width,
            height,
        }
    }

    /// Projects a world pixel position to screen coordinates
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.offset_x,
            world.y * self.scale + self.offset_y,
        )
    }

    /// Unprojects a screen position back to world pixels.
    ///
    /// Guarded against a degenerate scale rather than dividing through; a
    /// non-positive scale is corrupted state the safety monitor recovers
    /// from, not something to propagate into the tile math.
    pub fn screen_to_world(&self, screen: Point) -> Result<Point> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(MapError::InvalidCoordinates(format!(
                "cannot unproject with scale {}",
                self.scale
            ))
            .into());
        }
        Ok(Point::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        ))
    }

    /// World pixel position at the center of the screen
    pub fn center_world(&self) -> Result<Point> {
        self.screen_to_world(Point::new(
            self.width as f64 / 2.0,
            self.height as f64 / 2.0,
        ))
    }

    /// Fractional tile-grid coordinates of the screen center
    pub fn center_tile(&self) -> Result<Point> {
        let center = self.center_world()?;
        Ok(Point::new(center.x / TILE_SIZE, center.y / TILE_SIZE))
    }

    /// Screen rectangle covered by a tile at the current scale
    pub fn tile_screen_rect(&self, key: &TileKey) -> ScreenRect {
        let origin = self.world_to_screen(key.world_origin());
        let edge = TILE_SIZE * self.scale;
        ScreenRect::new(origin.x, origin.y, edge, edge)
    }

    /// The full viewport as a screen rectangle
    pub fn screen_rect(&self) -> ScreenRect {
        ScreenRect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }

    /// Whether every numeric field is usable for tile math.
    ///
    /// Violations are handed to [`crate::safety::SafetyMonitor`], never
    /// propagated into the pipeline.
    pub fn is_sane(&self) -> bool {
        self.offset_x.is_finite()
            && self.offset_y.is_finite()
            && self.offset_x.abs() < MAX_OFFSET
            && self.offset_y.abs() < MAX_OFFSET
            && self.scale.is_finite()
            && self.scale > 0.0
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 800, 600)
    }
}
