//! Asynchronous tile image loading with per-URL deduplication
//!
//! The loader owns an explicit in-flight request table: the first request
//! for a URL spawns exactly one fetch task, later requests for the same URL
//! are no-ops until that task settles, and every pass observes completion by
//! re-checking the shared cache. Results come back over a channel drained
//! non-blockingly from the frame pass, tagged with the cache generation at
//! spawn time so results that straddle a wholesale clear are discarded.

use crate::prelude::{Arc, HashSet};
use crate::tiles::cache::{Bitmap, TileCaches};
use crate::Result;
use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, Sender};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Shared async HTTP client for tile fetching.
///
/// No request timeout: a stalled tile stays blank until the next cache
/// clear rather than surfacing an error.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent("tilepane/0.1.0")
        .tcp_keepalive(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .pool_max_idle_per_host(16)
        .build()
        .expect("failed to build reqwest async client")
});

/// Transport-level urgency hint forwarded to the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPriority {
    Auto,
    /// Elevated while the view moves or drags fast, and in load-all mode
    High,
}

/// Anything that can resolve a tile URL to a decoded bitmap.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, url: &str, priority: FetchPriority) -> Result<Bitmap>;
}

/// HTTP fetcher over the shared client.
pub struct HttpFetcher;

#[async_trait]
impl TileFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, priority: FetchPriority) -> Result<Bitmap> {
        let mut request = HTTP_CLIENT.get(url);
        if priority == FetchPriority::High {
            request = request.header("Priority", "u=2");
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(format!("HTTP {} for {}", response.status(), url).into());
        }

        let bytes = response.bytes().await?;
        Bitmap::from_bytes(&bytes)
    }
}

/// One settled fetch, reported back to the frame pass.
struct FetchOutcome {
    url: String,
    generation: u64,
    result: Result<Bitmap>,
}

/// Deduplicating async image loader.
pub struct TileLoader {
    fetcher: Arc<dyn TileFetcher>,
    in_flight: Mutex<HashSet<String>>,
    result_tx: Sender<FetchOutcome>,
    result_rx: Receiver<FetchOutcome>,
    alive: Arc<AtomicBool>,
}

impl TileLoader {
    pub fn new(fetcher: Arc<dyn TileFetcher>) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            fetcher,
            in_flight: Mutex::new(HashSet::default()),
            result_tx,
            result_rx,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_http() -> Self {
        Self::new(Arc::new(HttpFetcher))
    }

    /// Requests a tile image. Returns the cached bitmap immediately when
    /// present; otherwise ensures at most one fetch task exists for the URL
    /// and returns `None` so the caller re-checks on a later pass.
    ///
    /// URLs whose fetch already failed are left alone: no retry until a
    /// cache clear wipes the failure list.
    pub fn request(
        &self,
        url: &str,
        caches: &TileCaches,
        priority: FetchPriority,
    ) -> Option<Arc<Bitmap>> {
        if let Some(bitmap) = caches.image(url) {
            return Some(bitmap);
        }
        if caches.is_failed(url) {
            return None;
        }

        {
            let mut in_flight = match self.in_flight.lock() {
                Ok(guard) => guard,
                Err(_) => return None,
            };
            if in_flight.contains(url) {
                return None;
            }
            in_flight.insert(url.to_string());
        }

        let fetcher = self.fetcher.clone();
        let result_tx = self.result_tx.clone();
        let alive = self.alive.clone();
        let generation = caches.generation();
        let url = url.to_string();

        crate::runtime::spawn(async move {
            let result = fetcher.fetch(&url, priority).await;
            if alive.load(Ordering::SeqCst) {
                let _ = result_tx.send(FetchOutcome {
                    url,
                    generation,
                    result,
                });
            }
        });

        None
    }

    /// Drains settled fetches into the cache (non-blocking); returns how
    /// many bitmaps were applied. Outcomes from an older generation already
    /// belong to a cleared key space and are dropped.
    pub fn drain(&self, caches: &TileCaches) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.result_rx.try_recv() {
            if let Ok(mut in_flight) = self.in_flight.lock() {
                in_flight.remove(&outcome.url);
            }

            if outcome.generation != caches.generation() {
                log::debug!("dropping stale fetch result for {}", outcome.url);
                continue;
            }

            match outcome.result {
                Ok(bitmap) => {
                    caches.insert_image(outcome.url, Arc::new(bitmap));
                    applied += 1;
                }
                Err(e) => {
                    log::debug!("tile fetch failed for {}: {}", outcome.url, e);
                    caches.mark_failed(outcome.url);
                }
            }
        }
        applied
    }

    /// Number of URLs with an outstanding fetch task.
    pub fn pending_count(&self) -> usize {
        self.in_flight.lock().map(|set| set.len()).unwrap_or(0)
    }

    /// Forget all in-flight URLs so they may be requested again. Called
    /// alongside a cache clear; late results are rejected by generation.
    pub fn clear_pending(&self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.clear();
        }
    }

    /// Teardown liveness flag: outstanding fetches are not cancelled, their
    /// results are simply never reported.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
