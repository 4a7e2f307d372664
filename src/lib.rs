//! # tilepane
//!
//! A tiled raster-map viewport engine.
//!
//! The crate turns an externally owned viewport (offset, scale, size) into a
//! prioritized set of 512px map tiles, loads the tile images asynchronously
//! with per-URL deduplication, and paints them through one of two host-backed
//! rendering backends (positioned elements or a 2D canvas).

pub mod context;
pub mod core;
pub mod engine;
pub mod input;
pub mod render;
pub mod runtime;
pub mod safety;
pub mod tiles;
pub use crate::core::constants;

pub mod prelude;

// Re-export public API
pub use crate::core::{
    grid::{Point, ScreenRect, TileKey},
    viewport::ViewportState,
    zoom::{bucket_for_scale, ZoomTracker},
};

pub use tiles::{
    cache::{Bitmap, TileCaches},
    loader::{FetchPriority, TileFetcher, TileLoader},
    set::TileDescriptor,
    source::{FixedGridSource, TileSource},
};

pub use render::{
    dual::{BackendKind, BackendSelector},
    frame::{FrameCadence, FrameLoop},
    surface::{CanvasSurface, ElementSurface, PatternId, Rgba},
};

pub use input::{commands::KeyCommand, events::PointerEvent, motion::MotionTracker};

pub use engine::{MapView, MapViewOptions, TickReport};

pub use safety::{SafetyMonitor, SafetyVerdict};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
