use crate::core::grid::TileKey;
use crate::prelude::{Arc, HashMap, HashSet};
use crate::render::surface::PatternId;
use crate::Result;
use image::RgbaImage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A decoded tile image, shared between the cache and the painters.
#[derive(Debug, Clone)]
pub struct Bitmap {
    image: RgbaImage,
}

impl Bitmap {
    /// Decode raw fetched bytes (JPEG or PNG) into an RGBA bitmap.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(crate::MapError::Decode)?
            .to_rgba8();
        Ok(Self { image })
    }

    /// Uniform-color bitmap, used by tests and fetch doubles.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// The cross-pass cache state: decoded images by URL, compiled canvas
/// patterns by tile key, and URLs whose fetch already failed.
///
/// Entries persist until a wholesale clear (zoom-bucket change or safety
/// reset); nothing is evicted piecemeal, and unbounded growth between clears
/// is accepted. Every clear bumps the generation counter so fetch results
/// spawned against an older key space are dropped on arrival instead of
/// repopulating a cleared cache.
#[derive(Debug, Default)]
pub struct TileCaches {
    images: Mutex<HashMap<String, Arc<Bitmap>>>,
    patterns: Mutex<HashMap<TileKey, PatternId>>,
    failed: Mutex<HashSet<String>>,
    generation: AtomicU64,
}

impl TileCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self, url: &str) -> Option<Arc<Bitmap>> {
        self.images.lock().ok()?.get(url).cloned()
    }

    pub fn insert_image(&self, url: String, bitmap: Arc<Bitmap>) {
        if let Ok(mut images) = self.images.lock() {
            images.insert(url, bitmap);
        }
    }

    pub fn pattern(&self, key: &TileKey) -> Option<PatternId> {
        self.patterns.lock().ok()?.get(key).copied()
    }

    pub fn insert_pattern(&self, key: TileKey, id: PatternId) {
        if let Ok(mut patterns) = self.patterns.lock() {
            patterns.insert(key, id);
        }
    }

    /// Record a permanently failed URL; it will not be refetched until the
    /// next clear.
    pub fn mark_failed(&self, url: String) {
        if let Ok(mut failed) = self.failed.lock() {
            failed.insert(url);
        }
    }

    pub fn is_failed(&self, url: &str) -> bool {
        self.failed
            .lock()
            .map(|failed| failed.contains(url))
            .unwrap_or(false)
    }

    /// Wholesale invalidation: images, patterns, and the failure list go
    /// together so the pattern cache can never outlive its source images.
    pub fn clear_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut images) = self.images.lock() {
            images.clear();
        }
        if let Ok(mut patterns) = self.patterns.lock() {
            patterns.clear();
        }
        if let Ok(mut failed) = self.failed.lock() {
            failed.clear();
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn image_count(&self) -> usize {
        self.images.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn failed_count(&self) -> usize {
        self.failed.lock().map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_round_trip() {
        let caches = TileCaches::new();
        let bitmap = Arc::new(Bitmap::solid(4, 4, [10, 20, 30, 255]));

        assert!(caches.image("u").is_none());
        caches.insert_image("u".to_string(), bitmap.clone());

        let got = caches.image("u").unwrap();
        assert_eq!(got.width(), 4);
        assert_eq!(caches.image_count(), 1);
    }

    #[test]
    fn test_clear_empties_everything_and_bumps_generation() {
        let caches = TileCaches::new();
        caches.insert_image("u".to_string(), Arc::new(Bitmap::solid(1, 1, [0; 4])));
        caches.insert_pattern(TileKey::new(3, 1, 1), PatternId(7));
        caches.mark_failed("bad".to_string());

        let before = caches.generation();
        caches.clear_all();

        assert_eq!(caches.image_count(), 0);
        assert_eq!(caches.pattern_count(), 0);
        assert_eq!(caches.failed_count(), 0);
        assert_eq!(caches.generation(), before + 1);
    }

    #[test]
    fn test_failed_urls_stick_until_clear() {
        let caches = TileCaches::new();
        caches.mark_failed("gone".to_string());
        assert!(caches.is_failed("gone"));

        caches.clear_all();
        assert!(!caches.is_failed("gone"));
    }
}
