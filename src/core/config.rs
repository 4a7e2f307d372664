//! Configuration for tile selection, scheduling, and frame pacing
//!
//! Every empirically tuned constant in the pipeline lives here as a default
//! rather than a hard-coded literal, so embedders can retune without forking
//! the selection code.

use crate::core::constants::TILE_BUDGET;
use serde::{Deserialize, Serialize};

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub load_all: LoadAllConfig,
    pub priority: PriorityConfig,
    pub culling: CullingConfig,
    pub frame: FrameTimingConfig,
    /// Scale above which the canvas backend takes over from elements
    pub canvas_scale_threshold: f64,
    /// Lifetime of transient overlay notices, also the safety-recovery
    /// cooldown window
    pub notice_ttl_ms: u64,
    /// Motion or drag speed (px per sample) past which fetches are hinted
    /// high priority
    pub fast_input_speed: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            load_all: LoadAllConfig::default(),
            priority: PriorityConfig::default(),
            culling: CullingConfig::default(),
            frame: FrameTimingConfig::default(),
            canvas_scale_threshold: 3.5,
            notice_ttl_ms: 3000,
            fast_input_speed: 8.0,
        }
    }
}

/// Windowed-mode tile selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Base window edge (tiles) around the predicted center
    pub window_span: i32,
    /// Maximum look-ahead along the motion vector, in tiles
    pub lead_tiles: f64,
    /// Scale boundary separating the "zoomed in" ring limits from the wide
    /// ones
    pub zoom_split: f64,
    /// Ring-expansion tile limits per (moving, zoomed) state
    pub limit_moving_zoomed: usize,
    pub limit_moving_wide: usize,
    pub limit_idle_zoomed: usize,
    pub limit_idle_wide: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_span: 7,
            lead_tiles: 3.0,
            zoom_split: 1.5,
            limit_moving_zoomed: 49,
            limit_moving_wide: 64,
            limit_idle_zoomed: 64,
            limit_idle_wide: 81,
        }
    }
}

impl WindowConfig {
    /// Tile limit for the current motion/scale state
    pub fn ring_limit(&self, moving: bool, scale: f64) -> usize {
        match (moving, scale > self.zoom_split) {
            (true, true) => self.limit_moving_zoomed,
            (true, false) => self.limit_moving_wide,
            (false, true) => self.limit_idle_zoomed,
            (false, false) => self.limit_idle_wide,
        }
    }
}

/// Load-all prefetch neighborhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadAllConfig {
    /// Radius is `floor(radius_numerator / scale)` clamped to the range below
    pub radius_numerator: f64,
    pub min_radius: i32,
    pub max_radius: i32,
}

impl Default for LoadAllConfig {
    fn default() -> Self {
        Self {
            radius_numerator: 15.0,
            min_radius: 5,
            max_radius: 10,
        }
    }
}

impl LoadAllConfig {
    pub fn radius(&self, scale: f64) -> i32 {
        ((self.radius_numerator / scale).floor() as i32).clamp(self.min_radius, self.max_radius)
    }
}

/// Priority scoring weights and the per-pass budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Maximum tiles scheduled per pass after sorting
    pub budget: usize,
    /// Weight of motion-vector alignment while panning
    pub motion_weight: f64,
    /// Weight of drag-velocity alignment once the drag is past the
    /// activation distance
    pub drag_weight: f64,
    /// Drag travel (px) before drag alignment starts to count
    pub drag_activation_px: f64,
    /// Added to every visible tile outside load-all mode; large and negative
    /// so on-screen tiles always sort first
    pub visible_boost: f64,
    /// Flat score applied to every tile in load-all mode
    pub load_all_flat: f64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            budget: TILE_BUDGET,
            motion_weight: 0.5,
            drag_weight: 0.8,
            drag_activation_px: 100.0,
            visible_boost: -100.0,
            load_all_flat: 0.1,
        }
    }
}

/// Visibility-test buffers around the viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CullingConfig {
    pub moving_buffer_px: f64,
    pub idle_buffer_px: f64,
    pub canvas_buffer_px: f64,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            moving_buffer_px: 20.0,
            idle_buffer_px: 100.0,
            canvas_buffer_px: 50.0,
        }
    }
}

/// Frame-loop throttle intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTimingConfig {
    pub load_all_interval_ms: u64,
    pub moving_interval_ms: u64,
    pub idle_interval_ms: u64,
}

impl Default for FrameTimingConfig {
    fn default() -> Self {
        Self {
            load_all_interval_ms: 500,
            moving_interval_ms: 16,
            idle_interval_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_limits() {
        let window = WindowConfig::default();
        assert_eq!(window.ring_limit(true, 2.0), 49);
        assert_eq!(window.ring_limit(true, 1.0), 64);
        assert_eq!(window.ring_limit(false, 2.0), 64);
        assert_eq!(window.ring_limit(false, 1.0), 81);
    }

    #[test]
    fn test_load_all_radius_clamps() {
        let cfg = LoadAllConfig::default();
        assert_eq!(cfg.radius(1.0), 10); // floor(15) clamped down to 10
        assert_eq!(cfg.radius(2.0), 7);
        assert_eq!(cfg.radius(5.0), 5); // floor(3) clamped up to 5
        assert_eq!(cfg.radius(0.25), 10);
    }
}
