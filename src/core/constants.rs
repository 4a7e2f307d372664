//! Fixed constants of the tile grid

/// Edge length of one raster tile in world pixels
pub const TILE_SIZE: f64 = 512.0;

/// Inclusive grid coordinate range, per axis
pub const GRID_MIN: i32 = 0;
pub const GRID_MAX: i32 = 50;

/// Offsets past this magnitude are treated as corrupted state
pub const MAX_OFFSET: f64 = 1_000_000.0;

/// Global cap on tiles scheduled per calculation pass
pub const TILE_BUDGET: usize = 100;
