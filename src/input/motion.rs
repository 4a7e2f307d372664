//! Motion and drag tracking
//!
//! Derives velocity and a look-ahead bias from pointer events and viewport
//! deltas. The tracker never mutates the viewport; its only output is the
//! snapshot the tile calculator and scheduler consume.

use crate::core::grid::Point;
use crate::input::events::PointerEvent;
use crate::prelude::{Duration, Instant};
use std::collections::VecDeque;

/// Pointer velocities are capped relative to this baseline frame rate.
const BASELINE_FPS: f64 = 60.0;
/// Velocity cap at the baseline frame rate, px per pointer sample.
const BASE_MAX_VELOCITY: f64 = 20.0;
/// Release speed above which a drag leaves a momentum bias behind.
const MOMENTUM_THRESHOLD: f64 = 1.0;
/// Viewport delta below which the view counts as idle, px per tick.
const MOVEMENT_EPSILON: f64 = 0.01;

/// Rolling frame-rate estimate over the last 5 frame intervals,
/// recomputed at most every 500ms.
#[derive(Debug)]
struct FpsEstimator {
    samples: VecDeque<f64>,
    last_frame: Option<Instant>,
    last_recompute: Option<Instant>,
    fps: f64,
}

impl FpsEstimator {
    const SAMPLE_WINDOW: usize = 5;
    const RECOMPUTE_INTERVAL: Duration = Duration::from_millis(500);

    fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(Self::SAMPLE_WINDOW),
            last_frame: None,
            last_recompute: None,
            fps: BASELINE_FPS,
        }
    }

    fn on_frame(&mut self, now: Instant) {
        if let Some(last) = self.last_frame {
            let interval = now.duration_since(last).as_secs_f64();
            if interval > 0.0 {
                if self.samples.len() == Self::SAMPLE_WINDOW {
                    self.samples.pop_front();
                }
                self.samples.push_back(interval);
            }
        }
        self.last_frame = Some(now);

        let due = match self.last_recompute {
            Some(at) => now.duration_since(at) >= Self::RECOMPUTE_INTERVAL,
            None => true,
        };
        if due && !self.samples.is_empty() {
            let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
            self.fps = 1.0 / mean;
            self.last_recompute = Some(now);
        }
    }

    fn fps(&self) -> f64 {
        self.fps
    }
}

/// Read-only view of the tracker state for one pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionSnapshot {
    pub movement_vector: Point,
    pub movement_speed: f64,
    pub moving: bool,
    pub drag_velocity: Point,
    pub dragging: bool,
    pub drag_distance: f64,
    pub momentum: Point,
}

impl MotionSnapshot {
    /// Direction used to push the predicted center ahead of the view: the
    /// live movement vector while panning, otherwise the momentum left by
    /// the last drag release.
    pub fn prefetch_bias(&self) -> Point {
        if self.moving {
            self.movement_vector
        } else {
            self.momentum
        }
    }
}

/// Tracks pointer drags and viewport deltas.
#[derive(Debug)]
pub struct MotionTracker {
    fps: FpsEstimator,
    dragging: bool,
    last_pointer: Option<Point>,
    drag_velocity: Point,
    drag_distance: f64,
    momentum: Point,
    last_offset: Option<(f64, f64)>,
    movement_vector: Point,
    movement_speed: f64,
    moving: bool,
}

impl MotionTracker {
    pub fn new() -> Self {
        Self {
            fps: FpsEstimator::new(),
            dragging: false,
            last_pointer: None,
            drag_velocity: Point::default(),
            drag_distance: 0.0,
            momentum: Point::default(),
            last_offset: None,
            movement_vector: Point::default(),
            movement_speed: 0.0,
            moving: false,
        }
    }

    /// Feed one frame tick; keeps the FPS estimate current.
    pub fn on_frame(&mut self, now: Instant) {
        self.fps.on_frame(now);
    }

    /// Velocity cap for the current frame rate. Slower frames mean fewer
    /// pointer samples, so the cap grows to keep perceived responsiveness
    /// constant under frame-rate variance.
    pub fn max_velocity(&self) -> f64 {
        BASE_MAX_VELOCITY / (BASELINE_FPS / self.fps.fps())
    }

    pub fn on_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => {
                self.dragging = true;
                self.last_pointer = Some(position);
                self.drag_velocity = Point::default();
                self.drag_distance = 0.0;
                self.momentum = Point::default();
            }
            PointerEvent::Move { position } => {
                if !self.dragging {
                    return;
                }
                if let Some(previous) = self.last_pointer {
                    let delta = position.subtract(&previous);
                    self.drag_distance += delta.magnitude();
                    self.drag_velocity = cap_magnitude(delta, self.max_velocity());
                }
                self.last_pointer = Some(position);
            }
            PointerEvent::Up { .. } => {
                self.dragging = false;
                self.last_pointer = None;
                if self.drag_velocity.magnitude() > MOMENTUM_THRESHOLD {
                    // Content follows the pointer, so the view itself coasts
                    // the opposite way; the look-ahead points where the view
                    // is going, like the movement vector.
                    self.momentum = self.drag_velocity.multiply(-1.0);
                } else {
                    self.momentum = Point::default();
                }
            }
        }
    }

    /// Feed the viewport offset observed this tick; the delta against the
    /// previous tick drives the moving state.
    ///
    /// A shrinking offset means the view travels toward larger world
    /// coordinates, so the movement vector is the negated offset delta:
    /// it points where the view is heading, which is where prefetch wants
    /// to lead.
    pub fn on_viewport(&mut self, offset_x: f64, offset_y: f64) {
        if let Some((last_x, last_y)) = self.last_offset {
            self.movement_vector = Point::new(last_x - offset_x, last_y - offset_y);
            self.movement_speed = self.movement_vector.magnitude();
            self.moving = self.movement_speed > MOVEMENT_EPSILON;
        }
        self.last_offset = Some((offset_x, offset_y));
    }

    /// Drop all derived state, keeping only the FPS estimate. Used by the
    /// safety reset so a recovery does not inherit a stale motion bias.
    pub fn reset(&mut self) {
        self.dragging = false;
        self.last_pointer = None;
        self.drag_velocity = Point::default();
        self.drag_distance = 0.0;
        self.momentum = Point::default();
        self.last_offset = None;
        self.movement_vector = Point::default();
        self.movement_speed = 0.0;
        self.moving = false;
    }

    pub fn snapshot(&self) -> MotionSnapshot {
        MotionSnapshot {
            movement_vector: self.movement_vector,
            movement_speed: self.movement_speed,
            moving: self.moving,
            drag_velocity: self.drag_velocity,
            dragging: self.dragging,
            drag_distance: self.drag_distance,
            momentum: self.momentum,
        }
    }

    pub fn measured_fps(&self) -> f64 {
        self.fps.fps()
    }
}

impl Default for MotionTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn cap_magnitude(vector: Point, cap: f64) -> Point {
    let magnitude = vector.magnitude();
    if magnitude <= cap || magnitude == 0.0 {
        vector
    } else {
        vector.multiply(cap / magnitude)
    }
}
