//! Prelude module for common tilepane types and traits
//!
//! Re-exports the most commonly used types, traits, and functions for easy
//! importing with `use tilepane::prelude::*;`

pub use crate::core::{
    config::{CullingConfig, EngineConfig, FrameTimingConfig, PriorityConfig, WindowConfig},
    constants::{GRID_MAX, GRID_MIN, TILE_BUDGET, TILE_SIZE},
    grid::{Point, ScreenRect, TileKey},
    viewport::ViewportState,
    zoom::{bucket_for_scale, ZoomTracker},
};

pub use crate::tiles::{
    cache::{Bitmap, TileCaches},
    loader::{FetchPriority, HttpFetcher, TileFetcher, TileLoader},
    set::{compute_tile_set, TileDescriptor, TileSetParams},
    source::{FixedGridSource, TileSource},
};

pub use crate::render::{
    canvas::CanvasRenderer,
    dual::{BackendKind, BackendSelector},
    element::ElementRenderer,
    frame::{FrameCadence, FrameLoop},
    surface::{
        CanvasSurface, ElementSurface, PatternId, RecordingCanvas, RecordingElements, Rgba,
    },
};

pub use crate::input::{
    commands::{jump_offset, parse_jump, KeyCommand},
    events::PointerEvent,
    motion::{MotionSnapshot, MotionTracker},
};

pub use crate::context::{EngineContext, Notice};

pub use crate::engine::{MapView, MapViewOptions, TickReport};

pub use crate::safety::{SafetyMonitor, SafetyVerdict};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::Future;
pub use std::pin::Pin;
