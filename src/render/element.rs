//! Positioned-element render backend

use crate::prelude::HashSet;
use crate::render::surface::ElementSurface;
use crate::tiles::set::TileDescriptor;
use crate::Result;

/// Paints tiles as positioned image nodes managed by the host.
///
/// Stateless between passes: the surface owns the node pool, the renderer
/// only declares which tiles exist this pass and in what order.
#[derive(Debug, Default)]
pub struct ElementRenderer;

impl ElementRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Places one node per descriptor in scheduling order, then prunes
    /// nodes for tiles no longer in the set.
    pub fn render_pass(
        &mut self,
        surface: &mut dyn ElementSurface,
        descriptors: &[TileDescriptor],
    ) -> Result<()> {
        let mut live = HashSet::default();
        for descriptor in descriptors {
            surface.place_tile(descriptor.key, descriptor.screen, &descriptor.url);
            live.insert(descriptor.key);
        }
        surface.retain_only(&live);
        Ok(())
    }
}
