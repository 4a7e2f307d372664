use crate::core::grid::TileKey;

/// Trait representing anything that can produce tile URLs for a given key.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `key`.
    fn url(&self, key: TileKey) -> String;
}

/// Standard fixed-grid source: `{base}/{level}/{gx}/{gy}.jpg`.
pub struct FixedGridSource {
    base_url: String,
}

impl FixedGridSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

impl TileSource for FixedGridSource {
    fn url(&self, key: TileKey) -> String {
        format!("{}/{}/{}/{}.jpg", self.base_url, key.level, key.gx, key.gy)
    }
}
