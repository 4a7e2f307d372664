//! End-to-end pipeline tests over a fetch double
//!
//! These exercise the engine the way a host would: feed viewport states,
//! tick, paint into recording surfaces, and watch the caches.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tilepane::prelude::*;

/// Fetcher that counts calls per URL and resolves instantly.
struct CountingFetcher {
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl CountingFetcher {
    fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::default()),
            total: AtomicUsize::new(0),
        }
    }

    fn max_calls_for_one_url(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .values()
            .copied()
            .max()
            .unwrap_or(0)
    }
}

#[async_trait]
impl TileFetcher for CountingFetcher {
    async fn fetch(&self, url: &str, _priority: FetchPriority) -> Result<Bitmap> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        self.total.fetch_add(1, Ordering::SeqCst);
        Ok(Bitmap::solid(2, 2, [128, 128, 128, 255]))
    }
}

fn engine(load_all: bool) -> (MapView, Arc<CountingFetcher>) {
    let fetcher = Arc::new(CountingFetcher::new());
    let source = Box::new(FixedGridSource::new("http://tiles.test/map"));
    let mut view = MapView::for_testing(source, fetcher.clone());
    if load_all {
        // for_testing starts windowed; flip through the command layer.
        view.handle_command(KeyCommand::ToggleLoadAll, &ViewportState::default());
    }
    (view, fetcher)
}

/// Viewport whose center sits on tile (25, 25) at the given scale.
fn centered_view(scale: f64) -> ViewportState {
    ViewportState::new(
        400.0 - 25.0 * TILE_SIZE * scale,
        300.0 - 25.0 * TILE_SIZE * scale,
        scale,
        800,
        600,
    )
}

#[tokio::test]
async fn identical_state_schedules_identical_tiles() {
    let (mut map, _) = engine(false);
    let view = centered_view(1.0);

    map.tick(&view).unwrap();
    let first: Vec<_> = map.scheduled().to_vec();

    map.tick(&view).unwrap();
    let second: Vec<_> = map.scheduled().to_vec();

    assert_eq!(first, second);
    assert!(!first.is_empty());
    assert!(first.iter().all(|t| t.key.in_bounds()));
}

#[tokio::test]
async fn windowed_first_tile_is_the_center() {
    let (mut map, _) = engine(false);
    let view = centered_view(1.0);

    map.tick(&view).unwrap();
    let first = &map.scheduled()[0];
    assert_eq!((first.key.gx, first.key.gy), (25, 25));
    assert!(first.visible);
}

#[tokio::test]
async fn load_all_flattens_priorities_but_truncates_to_budget() {
    let (mut map, _) = engine(true);
    let view = centered_view(1.0);

    let report = map.tick(&view).unwrap();
    assert_eq!(report.cadence, FrameCadence::LoadAll);
    assert_eq!(map.scheduled().len(), 100);
    assert!(map.scheduled().iter().all(|t| t.priority == 0.1));

    // Flat priorities fall back to key order, so the lowest key leads.
    let first = &map.scheduled()[0];
    let last = map.scheduled().last().unwrap();
    assert!(first.key <= last.key);
}

#[tokio::test]
async fn bucket_transition_clears_caches() {
    let (mut map, _) = engine(false);

    map.tick(&centered_view(0.9)).unwrap();
    // Simulate loaded state from earlier passes.
    map.caches().insert_image(
        "http://tiles.test/map/3/25/25.jpg".to_string(),
        Arc::new(Bitmap::solid(1, 1, [0; 4])),
    );
    map.caches()
        .insert_pattern(TileKey::new(3, 25, 25), PatternId(1));
    assert_eq!(map.caches().image_count(), 1);

    // 0.9 -> 1.1 crosses bucket 3 -> 4.
    map.tick(&centered_view(1.1)).unwrap();
    assert_eq!(map.caches().image_count(), 0);
    assert_eq!(map.caches().pattern_count(), 0);
    assert!(map
        .notices()
        .iter()
        .any(|text| text.contains("caches cleared")));
}

#[tokio::test]
async fn same_url_is_fetched_once_across_passes() {
    let (mut map, fetcher) = engine(false);
    let view = centered_view(1.0);

    // Several passes before any fetch settles into the cache.
    map.tick(&view).unwrap();
    map.tick(&view).unwrap();
    map.tick(&view).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(fetcher.total.load(Ordering::SeqCst) > 0);
    assert_eq!(fetcher.max_calls_for_one_url(), 1);
}

#[tokio::test]
async fn nan_offset_recovers_once_per_cooldown() {
    let (mut map, _) = engine(false);
    let moves: Arc<Mutex<Vec<(f64, f64)>>> = Arc::new(Mutex::new(Vec::new()));
    let moves_cb = moves.clone();
    map.set_move_callback(move |x, y| moves_cb.lock().unwrap().push((x, y)));

    let mut broken = centered_view(1.0);
    broken.offset_x = f64::NAN;

    let report = map.tick(&broken).unwrap();
    assert!(report.recovered);
    assert_eq!(report.scheduled, 0);

    // Repeated invalid frames inside the 3s cooldown stay quiet.
    for _ in 0..5 {
        let report = map.tick(&broken).unwrap();
        assert!(!report.recovered);
    }

    let moves = moves.lock().unwrap();
    assert_eq!(moves.len(), 1);
    let (x, y) = moves[0];
    assert_eq!((x, y), (400.0, 300.0));
    assert!(x.is_finite() && y.is_finite());
}

#[tokio::test]
async fn jump_centers_tile_or_rejects_inline() {
    let (mut map, _) = engine(false);
    let moves: Arc<Mutex<Vec<(f64, f64)>>> = Arc::new(Mutex::new(Vec::new()));
    let moves_cb = moves.clone();
    map.set_move_callback(move |x, y| moves_cb.lock().unwrap().push((x, y)));

    let view = ViewportState::new(0.0, 0.0, 1.0, 800, 600);
    map.handle_command(KeyCommand::OpenJumpDialog, &view);
    assert!(map.jump_open());

    assert!(!map.submit_jump("twenty", "25", &view));
    assert!(map.jump_error().is_some());
    assert!(moves.lock().unwrap().is_empty());

    assert!(map.submit_jump("25", "25", &view));
    assert!(map.jump_error().is_none());
    assert!(!map.jump_open());
    assert_eq!(*moves.lock().unwrap(), vec![(-12400.0, -12500.0)]);
}

#[tokio::test]
async fn both_backends_paint_the_scheduled_order() {
    let (mut map, _) = engine(false);
    let view = centered_view(1.0);

    map.tick(&view).unwrap();
    let scheduled_keys: Vec<TileKey> = map.scheduled().iter().map(|t| t.key).collect();
    assert_eq!(map.backend(), BackendKind::Element);

    let mut elements = RecordingElements::default();
    let mut canvas = RecordingCanvas::default();
    map.render(&view, &mut elements, &mut canvas).unwrap();

    let element_keys: Vec<TileKey> = elements.placed.iter().map(|(key, _, _)| *key).collect();
    assert_eq!(element_keys, scheduled_keys);

    // Force the canvas backend over the same scheduled set.
    map.handle_command(KeyCommand::ToggleBackend, &view);
    assert_eq!(map.backend(), BackendKind::Canvas);

    let mut elements = RecordingElements::default();
    let mut canvas = RecordingCanvas::default();
    map.render(&view, &mut elements, &mut canvas).unwrap();

    let canvas_rects: Vec<ScreenRect> = canvas
        .ops
        .iter()
        .filter_map(|op| match op {
            tilepane::render::surface::CanvasOp::FillRect(rect, _) => Some(*rect),
            _ => None,
        })
        .collect();
    let scheduled_rects: Vec<ScreenRect> = map.scheduled().iter().map(|t| t.screen).collect();
    assert_eq!(canvas_rects, scheduled_rects);
}

#[tokio::test]
async fn backend_switches_with_scale_and_raises_a_notice() {
    let (mut map, _) = engine(false);

    let report = map.tick(&centered_view(1.0)).unwrap();
    assert_eq!(report.backend, BackendKind::Element);

    let report = map.tick(&centered_view(4.0)).unwrap();
    assert_eq!(report.backend, BackendKind::Canvas);
    assert!(map
        .notices()
        .iter()
        .any(|text| text.contains("canvas")));
}

#[tokio::test]
async fn debug_snapshot_serializes() {
    let (mut map, _) = engine(false);
    map.tick(&centered_view(1.0)).unwrap();

    let json = map.debug_json().unwrap();
    assert!(json.contains("\"scheduled\""));
    assert!(json.contains("\"cached_images\""));

    map.shutdown();
}
