//! Tile set calculation: which tiles the current viewport needs
//!
//! Two modes share one descriptor contract. Windowed mode covers the visible
//! area around a motion-predicted center and ring-expands to a state-dependent
//! tile limit; load-all mode takes a fixed square neighborhood around the true
//! center regardless of visibility.

use crate::core::config::EngineConfig;
use crate::core::constants::{GRID_MAX, GRID_MIN, TILE_SIZE};
use crate::core::grid::{Point, ScreenRect, TileKey};
use crate::core::viewport::ViewportState;
use crate::input::motion::MotionSnapshot;
use crate::tiles::source::TileSource;
use crate::Result;

/// One tile scheduled for this pass, recomputed from scratch every time.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDescriptor {
    pub key: TileKey,
    pub screen: ScreenRect,
    pub priority: f64,
    pub visible: bool,
    pub url: String,
}

/// Inputs for one calculation pass.
pub struct TileSetParams<'a> {
    pub view: &'a ViewportState,
    pub bucket: i32,
    pub motion: &'a MotionSnapshot,
    pub load_all: bool,
    pub canvas_path: bool,
    pub config: &'a EngineConfig,
}

/// Computes the tile set for the current pass.
///
/// Deterministic: identical inputs produce identical descriptors in
/// identical order. Priorities are filled in by the scheduler afterwards.
pub fn compute_tile_set(
    params: &TileSetParams<'_>,
    source: &dyn TileSource,
) -> Result<Vec<TileDescriptor>> {
    let keys = if params.load_all {
        load_all_keys(params)?
    } else {
        windowed_keys(params)?
    };

    let buffer = if params.canvas_path {
        params.config.culling.canvas_buffer_px
    } else if params.motion.moving {
        params.config.culling.moving_buffer_px
    } else {
        params.config.culling.idle_buffer_px
    };
    let viewport_rect = params.view.screen_rect();

    let descriptors = keys
        .into_iter()
        .map(|key| {
            let screen = params.view.tile_screen_rect(&key);
            let visible = screen.intersects_inflated(&viewport_rect, buffer);
            TileDescriptor {
                key,
                screen,
                priority: 0.0,
                visible,
                url: source.url(key),
            }
        })
        .collect();

    Ok(descriptors)
}

/// Center of the base window: the true center tile pushed up to
/// `lead_tiles` along the motion vector, shrinking as the scale grows.
pub fn predicted_center(
    view: &ViewportState,
    motion: &MotionSnapshot,
    lead_tiles: f64,
) -> Result<Point> {
    let center = view.center_tile()?;
    let bias = motion.prefetch_bias();
    let magnitude = bias.magnitude();
    if magnitude < f64::EPSILON {
        return Ok(center);
    }

    let lead = (lead_tiles / view.scale).min(lead_tiles);
    let direction = bias.multiply(1.0 / magnitude);
    Ok(center.add(&direction.multiply(lead)))
}

fn windowed_keys(params: &TileSetParams<'_>) -> Result<Vec<TileKey>> {
    let view = params.view;
    let window = &params.config.window;
    let limit = window.ring_limit(params.motion.moving, view.scale);

    let center = predicted_center(view, params.motion, window.lead_tiles)?;
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;

    // Base window: the visible tile span, capped to the configured window.
    let tile_edge = TILE_SIZE * view.scale;
    let cols = ((view.width as f64 / tile_edge).ceil() as i32).clamp(1, window.window_span);
    let rows = ((view.height as f64 / tile_edge).ceil() as i32).clamp(1, window.window_span);
    let half_x = cols / 2;
    let half_y = rows / 2;

    let mut keys = Vec::with_capacity(limit);
    for gy in (cy - half_y)..=(cy + half_y) {
        for gx in (cx - half_x)..=(cx + half_x) {
            push_in_bounds(&mut keys, params.bucket, gx, gy, limit);
        }
    }

    // Ring expansion beyond the base window until the limit is hit or the
    // rings walk off the map entirely.
    let mut radius = half_x.max(half_y) + 1;
    while keys.len() < limit && radius <= GRID_MAX {
        let before = keys.len();
        for gy in (cy - radius)..=(cy + radius) {
            for gx in (cx - radius)..=(cx + radius) {
                let on_ring = (gx - cx).abs().max((gy - cy).abs()) == radius;
                if !on_ring {
                    continue;
                }
                // Skip cells the base window already produced.
                if (gx - cx).abs() <= half_x && (gy - cy).abs() <= half_y {
                    continue;
                }
                push_in_bounds(&mut keys, params.bucket, gx, gy, limit);
            }
        }
        if keys.len() == before && fully_off_grid(cx, cy, radius) {
            break;
        }
        radius += 1;
    }

    Ok(keys)
}

fn load_all_keys(params: &TileSetParams<'_>) -> Result<Vec<TileKey>> {
    let view = params.view;
    let center = view.center_tile()?;
    let cx = center.x.floor() as i32;
    let cy = center.y.floor() as i32;
    let radius = params.config.load_all.radius(view.scale);

    let mut keys = Vec::new();
    for gy in (cy - radius)..=(cy + radius) {
        for gx in (cx - radius)..=(cx + radius) {
            push_in_bounds(&mut keys, params.bucket, gx, gy, usize::MAX);
        }
    }
    Ok(keys)
}

fn push_in_bounds(keys: &mut Vec<TileKey>, level: i32, gx: i32, gy: i32, limit: usize) {
    if keys.len() >= limit {
        return;
    }
    let key = TileKey::new(level, gx, gy);
    if key.in_bounds() {
        keys.push(key);
    }
}

fn fully_off_grid(cx: i32, cy: i32, radius: i32) -> bool {
    cx + radius < GRID_MIN
        || cx - radius > GRID_MAX
        || cy + radius < GRID_MIN
        || cy - radius > GRID_MAX
}
