//! 2D-canvas render backend

use crate::core::viewport::ViewportState;
use crate::render::surface::{CanvasSurface, Rgba};
use crate::tiles::cache::TileCaches;
use crate::tiles::set::TileDescriptor;
use crate::Result;

/// Paints tiles into a host 2D canvas.
///
/// Each pass repaints from scratch: a checkerboard placeholder per tile,
/// then the tile's repeating bitmap pattern once its image has arrived in
/// the cache. Patterns are compiled once per tile key and reused across
/// zoom levels by scaling the draw context instead of re-rasterizing.
#[derive(Debug, Default)]
pub struct CanvasRenderer;

impl CanvasRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_pass(
        &mut self,
        surface: &mut dyn CanvasSurface,
        caches: &TileCaches,
        view: &ViewportState,
        descriptors: &[TileDescriptor],
    ) -> Result<()> {
        surface.clear(view.width as f64, view.height as f64);

        for descriptor in descriptors {
            self.paint_tile(surface, caches, view, descriptor);
        }
        Ok(())
    }

    /// Paints one tile. Failures are contained here: a bad pattern or paint
    /// call logs, leaves the placeholder, and never aborts the pass.
    fn paint_tile(
        &mut self,
        surface: &mut dyn CanvasSurface,
        caches: &TileCaches,
        view: &ViewportState,
        descriptor: &TileDescriptor,
    ) {
        let checker = if (descriptor.key.gx + descriptor.key.gy) % 2 == 0 {
            Rgba::CHECKER_LIGHT
        } else {
            Rgba::CHECKER_DARK
        };
        surface.fill_rect(descriptor.screen, checker);

        let pattern = match caches.pattern(&descriptor.key) {
            Some(id) => Some(id),
            None => match caches.image(&descriptor.url) {
                Some(bitmap) => match surface.make_pattern(&bitmap) {
                    Ok(id) => {
                        caches.insert_pattern(descriptor.key, id);
                        Some(id)
                    }
                    Err(e) => {
                        log::warn!("pattern creation failed for {:?}: {}", descriptor.key, e);
                        None
                    }
                },
                None => None,
            },
        };

        if let Some(id) = pattern {
            if let Err(e) =
                surface.fill_tile_pattern(id, descriptor.screen.origin(), view.scale)
            {
                log::warn!("pattern paint failed for {:?}: {}", descriptor.key, e);
            }
        }
    }
}
