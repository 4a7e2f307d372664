//! Host bridge traits for the two paint backends
//!
//! The engine computes what to paint; the embedding host owns the actual
//! drawing primitives (DOM nodes, a 2D canvas context, a GUI framework's
//! painter). One trait per backend, sharing the tile-descriptor contract.
//! Recording implementations are provided for tests and headless use.

use crate::core::grid::{Point, ScreenRect, TileKey};
use crate::prelude::HashSet;
use crate::tiles::cache::Bitmap;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Handle to a compiled repeating pattern, issued by the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternId(pub u64);

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Checkerboard placeholder colors for tiles whose image is not loaded
    pub const CHECKER_LIGHT: Rgba = Rgba::new(0x2a, 0x2a, 0x2a, 0xff);
    pub const CHECKER_DARK: Rgba = Rgba::new(0x1e, 0x1e, 0x1e, 0xff);
}

/// Positioned-element backend: the host keeps one image node per tile.
///
/// Bitmap loading is implicit to the host's image primitive; the engine only
/// binds URLs and positions.
pub trait ElementSurface {
    /// Create or update the positioned node for `key`.
    fn place_tile(&mut self, key: TileKey, rect: ScreenRect, url: &str);

    /// Drop every node whose key is not in `live`.
    fn retain_only(&mut self, live: &HashSet<TileKey>);
}

/// 2D-canvas backend: the host exposes rect fills and repeating patterns.
pub trait CanvasSurface {
    /// Reset the canvas for a fresh pass.
    fn clear(&mut self, width: f64, height: f64);

    /// Fill an axis-aligned rectangle with a solid color.
    fn fill_rect(&mut self, rect: ScreenRect, color: Rgba);

    /// Compile a bitmap into a repeating pattern; may fail (e.g. host
    /// resource exhaustion), in which case the tile is skipped this pass.
    fn make_pattern(&mut self, bitmap: &Bitmap) -> Result<PatternId>;

    /// Paint one unit tile of `pattern` with the context translated to
    /// `origin` and scaled by `scale`, so a single compiled pattern serves
    /// every zoom level.
    fn fill_tile_pattern(&mut self, pattern: PatternId, origin: Point, scale: f64) -> Result<()>;
}

/// Element surface that records placements, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingElements {
    /// Placement order of the latest pass
    pub placed: Vec<(TileKey, ScreenRect, String)>,
    /// Keys currently alive after retain_only
    pub live: Vec<TileKey>,
}

impl ElementSurface for RecordingElements {
    fn place_tile(&mut self, key: TileKey, rect: ScreenRect, url: &str) {
        self.placed.push((key, rect, url.to_string()));
    }

    fn retain_only(&mut self, live: &HashSet<TileKey>) {
        self.live = self.placed.iter().map(|(key, _, _)| *key).collect();
        self.live.retain(|key| live.contains(key));
    }
}

/// One recorded canvas operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Clear,
    FillRect(ScreenRect, Rgba),
    FillPattern(PatternId, Point, f64),
}

/// Canvas surface that records operations, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<CanvasOp>,
    next_pattern: u64,
    /// When set, `make_pattern` fails; exercises per-tile error containment
    pub fail_patterns: bool,
}

impl RecordingCanvas {
    /// Surface whose pattern compilation always fails.
    pub fn failing() -> Self {
        Self {
            fail_patterns: true,
            ..Self::default()
        }
    }
}

impl CanvasSurface for RecordingCanvas {
    fn clear(&mut self, _width: f64, _height: f64) {
        self.ops.push(CanvasOp::Clear);
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Rgba) {
        self.ops.push(CanvasOp::FillRect(rect, color));
    }

    fn make_pattern(&mut self, _bitmap: &Bitmap) -> Result<PatternId> {
        if self.fail_patterns {
            return Err(crate::MapError::Render("pattern creation failed".into()).into());
        }
        self.next_pattern += 1;
        Ok(PatternId(self.next_pattern))
    }

    fn fill_tile_pattern(&mut self, pattern: PatternId, origin: Point, scale: f64) -> Result<()> {
        self.ops.push(CanvasOp::FillPattern(pattern, origin, scale));
        Ok(())
    }
}
