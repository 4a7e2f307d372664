use async_trait::async_trait;
use std::sync::Arc;
use tilepane::prelude::*;

/// Fetch double that materializes solid-color tiles, so the demo exercises
/// the full pipeline without a tile server.
struct SyntheticFetcher;

#[async_trait]
impl TileFetcher for SyntheticFetcher {
    async fn fetch(&self, _url: &str, _priority: FetchPriority) -> Result<Bitmap> {
        Ok(Bitmap::solid(512, 512, [90, 120, 90, 255]))
    }
}

/// Example of driving the engine in headless mode without any UI
#[tokio::main]
async fn main() -> Result<()> {
    #[cfg(feature = "debug")]
    env_logger::init();

    println!("tilepane headless example");
    println!("=========================");

    let source = Box::new(FixedGridSource::new("http://tiles.invalid/map"));
    let mut map = MapView::for_testing(source, Arc::new(SyntheticFetcher));
    map.set_move_callback(|x, y| println!("   host asked to move to ({x:.0}, {y:.0})"));

    // Center tile (25, 25) on an 800x600 screen at scale 1.
    let mut view = ViewportState::new(
        400.0 - 25.0 * TILE_SIZE,
        300.0 - 25.0 * TILE_SIZE,
        1.0,
        800,
        600,
    );

    let report = map.tick(&view)?;
    println!(
        "tick: {} tiles scheduled, backend {:?}, bucket {}",
        report.scheduled, report.backend, report.bucket
    );

    // Let the synthetic fetches settle, then tick again so they drain.
    tokio::time::sleep(Duration::from_millis(50)).await;
    map.tick(&view)?;
    println!("cached images after settle: {}", map.caches().image_count());

    // Paint through both backends into recording surfaces.
    let mut elements = RecordingElements::default();
    let mut canvas = RecordingCanvas::default();
    map.render(&view, &mut elements, &mut canvas)?;
    println!("element backend placed {} nodes", elements.placed.len());

    map.handle_command(KeyCommand::ToggleBackend, &view);
    map.render(&view, &mut elements, &mut canvas)?;
    println!("canvas backend recorded {} ops", canvas.ops.len());

    // Pan east for a few frames; the scheduler starts favoring eastern tiles.
    for _ in 0..5 {
        view.offset_x -= 24.0;
        map.tick(&view)?;
    }
    let first = &map.scheduled()[0];
    println!(
        "after panning east the first scheduled tile is ({}, {})",
        first.key.gx, first.key.gy
    );

    // Jump command: center tile (10, 40).
    map.handle_command(KeyCommand::OpenJumpDialog, &view);
    map.submit_jump("10", "40", &view);

    // Invalid numeric state recovers instead of crashing.
    let mut broken = view;
    broken.offset_x = f64::NAN;
    let report = map.tick(&broken)?;
    println!("recovered from NaN offset: {}", report.recovered);
    for notice in map.notices() {
        println!("   notice: {notice}");
    }

    println!("{}", map.debug_json()?);

    map.shutdown();
    Ok(())
}
