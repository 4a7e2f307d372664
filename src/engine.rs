//! The engine façade: one tick of the full pipeline
//!
//! Per tick: validate the viewport, react to zoom-bucket changes, fold the
//! viewport delta into the motion state, drain finished fetches, compute and
//! schedule the tile set, request missing images, and remember the scheduled
//! descriptors for the paint pass. The host owns the viewport and the paint
//! surfaces; the engine owns everything in between.

use crate::context::EngineContext;
use crate::core::config::EngineConfig;
use crate::core::viewport::ViewportState;
use crate::core::zoom::{bucket_for_scale, ZoomTracker};
use crate::input::commands::{jump_offset, parse_jump, KeyCommand};
use crate::input::events::PointerEvent;
use crate::prelude::{Arc, Duration, Instant};
use crate::render::canvas::CanvasRenderer;
use crate::render::dual::{BackendKind, BackendSelector};
use crate::render::element::ElementRenderer;
use crate::render::frame::FrameCadence;
use crate::render::surface::{CanvasSurface, ElementSurface};
use crate::safety::{SafetyMonitor, SafetyVerdict};
use crate::tiles::loader::{FetchPriority, TileFetcher, TileLoader};
use crate::tiles::priority::schedule;
use crate::tiles::set::{compute_tile_set, predicted_center, TileDescriptor, TileSetParams};
use crate::tiles::source::TileSource;
use crate::Result;
use serde::Serialize;

/// Host callback requesting an authoritative viewport move.
pub type MoveCallback = Box<dyn Fn(f64, f64) + Send>;

/// Construction options.
#[derive(Debug, Clone)]
pub struct MapViewOptions {
    pub config: EngineConfig,
    /// Start in load-all prefetch mode (the historical default)
    pub load_all: bool,
}

impl Default for MapViewOptions {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            load_all: true,
        }
    }
}

/// What one tick did, for the host and the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub backend: BackendKind,
    pub bucket: i32,
    pub scheduled: usize,
    pub recovered: bool,
    pub cadence: FrameCadence,
}

/// Debug-overlay state, serializable for display or logging.
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    pub backend: BackendKind,
    pub bucket: i32,
    pub load_all: bool,
    pub scheduled: usize,
    pub visible: usize,
    pub cached_images: usize,
    pub cached_patterns: usize,
    pub failed_urls: usize,
    pub pending_fetches: usize,
    pub measured_fps: f64,
    pub moving: bool,
    pub dragging: bool,
}

pub struct MapView {
    config: EngineConfig,
    ctx: EngineContext,
    loader: TileLoader,
    source: Box<dyn TileSource>,
    selector: BackendSelector,
    zoom: ZoomTracker,
    safety: SafetyMonitor,
    element_renderer: ElementRenderer,
    canvas_renderer: CanvasRenderer,
    on_move: Option<MoveCallback>,
    backend: BackendKind,
    scheduled: Vec<TileDescriptor>,
    jump_open: bool,
    jump_error: Option<String>,
}

impl MapView {
    /// Engine over the HTTP fetcher with default options.
    pub fn new(source: Box<dyn TileSource>) -> Self {
        Self::with_options(source, Arc::new(crate::tiles::loader::HttpFetcher), MapViewOptions::default())
    }

    pub fn with_options(
        source: Box<dyn TileSource>,
        fetcher: Arc<dyn TileFetcher>,
        options: MapViewOptions,
    ) -> Self {
        let notice_ttl = Duration::from_millis(options.config.notice_ttl_ms);
        Self {
            selector: BackendSelector::new(options.config.canvas_scale_threshold),
            safety: SafetyMonitor::new(notice_ttl),
            ctx: EngineContext::new(notice_ttl, options.load_all),
            loader: TileLoader::new(fetcher),
            source,
            zoom: ZoomTracker::new(),
            element_renderer: ElementRenderer::new(),
            canvas_renderer: CanvasRenderer::new(),
            on_move: None,
            backend: BackendKind::Element,
            scheduled: Vec::new(),
            jump_open: false,
            jump_error: None,
            config: options.config,
        }
    }

    /// Windowed-mode engine over a fetch double, for tests.
    pub fn for_testing(source: Box<dyn TileSource>, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self::with_options(
            source,
            fetcher,
            MapViewOptions {
                load_all: false,
                ..Default::default()
            },
        )
    }

    /// Registers the host callback for recovery and jump moves.
    pub fn set_move_callback(&mut self, callback: impl Fn(f64, f64) + Send + 'static) {
        self.on_move = Some(Box::new(callback));
    }

    /// Runs one calculation pass against the host's current viewport.
    pub fn tick(&mut self, view: &ViewportState) -> Result<TickReport> {
        let now = Instant::now();
        self.ctx.motion.on_frame(now);
        self.ctx.notices.sweep(now);

        match self.safety.check(view, now) {
            SafetyVerdict::Recovered { offset_x, offset_y } => {
                self.clear_caches();
                self.ctx.motion.reset();
                self.ctx.notices.push("invalid view state, recentered");
                if let Some(callback) = &self.on_move {
                    callback(offset_x, offset_y);
                }
                self.scheduled.clear();
                return Ok(self.report(0, true, FrameCadence::Idle));
            }
            SafetyVerdict::CoolingDown => {
                self.scheduled.clear();
                return Ok(self.report(0, false, FrameCadence::Idle));
            }
            SafetyVerdict::Healthy => {}
        }

        if self.zoom.observe(view.scale).is_some() {
            log::debug!("zoom bucket changed to {}", bucket_for_scale(view.scale));
            self.clear_caches();
            self.ctx.notices.push("tile caches cleared");
        }

        self.ctx.motion.on_viewport(view.offset_x, view.offset_y);
        self.loader.drain(&self.ctx.caches);

        let (backend, switched) = self.selector.select(view.scale);
        if switched {
            self.ctx.notices.push(match backend {
                BackendKind::Canvas => "switched to canvas rendering",
                BackendKind::Element => "switched to element rendering",
            });
        }
        self.backend = backend;

        let motion = self.ctx.motion.snapshot();
        let bucket = bucket_for_scale(view.scale);
        let params = TileSetParams {
            view,
            bucket,
            motion: &motion,
            load_all: self.ctx.load_all,
            canvas_path: backend == BackendKind::Canvas,
            config: &self.config,
        };
        let mut tiles = compute_tile_set(&params, self.source.as_ref())?;

        let predicted = predicted_center(view, &motion, self.config.window.lead_tiles)?;
        schedule(
            &mut tiles,
            predicted,
            &motion,
            self.ctx.load_all,
            &self.config.priority,
        );

        let fetch_priority = self.fetch_priority(&motion);
        for tile in &tiles {
            self.loader
                .request(&tile.url, &self.ctx.caches, fetch_priority);
        }

        let scheduled = tiles.len();
        self.scheduled = tiles;
        let cadence = self.cadence_for(&motion);
        Ok(self.report(scheduled, false, cadence))
    }

    /// Paints the tiles scheduled by the last tick through the backend the
    /// tick selected. Both backends receive the identical descriptor order.
    pub fn render(
        &mut self,
        view: &ViewportState,
        elements: &mut dyn ElementSurface,
        canvas: &mut dyn CanvasSurface,
    ) -> Result<()> {
        match self.backend {
            BackendKind::Element => self
                .element_renderer
                .render_pass(elements, &self.scheduled),
            BackendKind::Canvas => self.canvas_renderer.render_pass(
                canvas,
                &self.ctx.caches,
                view,
                &self.scheduled,
            ),
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.ctx.motion.on_pointer(event);
    }

    pub fn handle_command(&mut self, command: KeyCommand, view: &ViewportState) {
        match command {
            KeyCommand::ToggleDebug => {
                self.ctx.debug_overlay = !self.ctx.debug_overlay;
            }
            KeyCommand::ToggleBackend => {
                self.backend = self.selector.force_toggle(view.scale);
                self.ctx.notices.push(match self.backend {
                    BackendKind::Canvas => "render backend forced to canvas",
                    BackendKind::Element => "render backend forced to elements",
                });
            }
            KeyCommand::OpenJumpDialog => {
                self.jump_open = true;
                self.jump_error = None;
            }
            KeyCommand::ToggleLoadAll => {
                self.ctx.load_all = !self.ctx.load_all;
                if self.ctx.load_all {
                    self.ctx
                        .notices
                        .push("load-all prefetch on: expect heavy tile traffic");
                } else {
                    self.ctx.notices.push("load-all prefetch off");
                }
            }
            KeyCommand::ClearCaches => {
                self.clear_caches();
                self.ctx.notices.push("tile caches cleared");
            }
        }
    }

    /// Submits jump-dialog input. Invalid input sets an inline error and
    /// mutates nothing; valid input closes the dialog and asks the host to
    /// center the tile.
    pub fn submit_jump(&mut self, x: &str, y: &str, view: &ViewportState) -> bool {
        match parse_jump(x, y) {
            Ok((tile_x, tile_y)) => {
                let (offset_x, offset_y) = jump_offset(tile_x, tile_y, view);
                self.jump_open = false;
                self.jump_error = None;
                if let Some(callback) = &self.on_move {
                    callback(offset_x, offset_y);
                }
                true
            }
            Err(message) => {
                log::debug!("jump rejected: {}", message);
                self.jump_error = Some(message);
                false
            }
        }
    }

    /// Texts of the currently visible overlay notices.
    pub fn notices(&self) -> Vec<String> {
        let now = Instant::now();
        self.ctx
            .notices
            .active(now)
            .into_iter()
            .map(|notice| notice.text.clone())
            .collect()
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let motion = self.ctx.motion.snapshot();
        DebugSnapshot {
            backend: self.backend,
            bucket: self.zoom.current().unwrap_or(0),
            load_all: self.ctx.load_all,
            scheduled: self.scheduled.len(),
            visible: self.scheduled.iter().filter(|t| t.visible).count(),
            cached_images: self.ctx.caches.image_count(),
            cached_patterns: self.ctx.caches.pattern_count(),
            failed_urls: self.ctx.caches.failed_count(),
            pending_fetches: self.loader.pending_count(),
            measured_fps: self.ctx.motion.measured_fps(),
            moving: motion.moving,
            dragging: motion.dragging,
        }
    }

    pub fn debug_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.debug_snapshot())?)
    }

    /// Stops reporting fetch results; outstanding requests are ignored, not
    /// cancelled. Pair with cancelling the frame loop on teardown.
    pub fn shutdown(&self) {
        self.loader.shutdown();
    }

    pub fn scheduled(&self) -> &[TileDescriptor] {
        &self.scheduled
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn load_all(&self) -> bool {
        self.ctx.load_all
    }

    pub fn debug_overlay(&self) -> bool {
        self.ctx.debug_overlay
    }

    pub fn jump_open(&self) -> bool {
        self.jump_open
    }

    pub fn jump_error(&self) -> Option<&str> {
        self.jump_error.as_deref()
    }

    pub fn caches(&self) -> &crate::tiles::cache::TileCaches {
        &self.ctx.caches
    }

    pub fn pending_fetches(&self) -> usize {
        self.loader.pending_count()
    }

    fn clear_caches(&mut self) {
        self.ctx.caches.clear_all();
        self.loader.clear_pending();
    }

    fn fetch_priority(&self, motion: &crate::input::motion::MotionSnapshot) -> FetchPriority {
        let fast = motion.movement_speed > self.config.fast_input_speed
            || motion.drag_velocity.magnitude() > self.config.fast_input_speed;
        if fast || self.ctx.load_all {
            FetchPriority::High
        } else {
            FetchPriority::Auto
        }
    }

    fn cadence_for(&self, motion: &crate::input::motion::MotionSnapshot) -> FrameCadence {
        if self.ctx.load_all {
            FrameCadence::LoadAll
        } else if motion.moving || motion.dragging {
            FrameCadence::Moving
        } else {
            FrameCadence::Idle
        }
    }

    fn report(&self, scheduled: usize, recovered: bool, cadence: FrameCadence) -> TickReport {
        TickReport {
            backend: self.backend,
            bucket: self.zoom.current().unwrap_or(0),
            scheduled,
            recovered,
            cadence,
        }
    }
}
