//! The engine's single owned context: caches, motion state, notices, flags
//!
//! Everything that survives across passes lives here and is passed by
//! reference, so there are no ambient singletons to leak between views.

use crate::input::motion::MotionTracker;
use crate::prelude::{Duration, Instant};
use crate::tiles::cache::TileCaches;

/// One transient overlay message with a fixed lifetime.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    created: Instant,
    ttl: Duration,
}

impl Notice {
    pub fn is_active(&self, now: Instant) -> bool {
        now.duration_since(self.created) < self.ttl
    }
}

/// Expiring list of overlay notices.
#[derive(Debug)]
pub struct Notices {
    items: Vec<Notice>,
    ttl: Duration,
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.items.push(Notice {
            text: text.into(),
            created: Instant::now(),
            ttl: self.ttl,
        });
    }

    /// Drop expired notices.
    pub fn sweep(&mut self, now: Instant) {
        self.items.retain(|notice| notice.is_active(now));
    }

    pub fn active(&self, now: Instant) -> Vec<&Notice> {
        self.items
            .iter()
            .filter(|notice| notice.is_active(now))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cross-pass engine state, owned by [`crate::engine::MapView`].
#[derive(Debug)]
pub struct EngineContext {
    pub caches: TileCaches,
    pub motion: MotionTracker,
    pub notices: Notices,
    /// Prefetch everything around the center regardless of visibility
    pub load_all: bool,
    pub debug_overlay: bool,
}

impl EngineContext {
    pub fn new(notice_ttl: Duration, load_all: bool) -> Self {
        Self {
            caches: TileCaches::new(),
            motion: MotionTracker::new(),
            notices: Notices::new(notice_ttl),
            load_all,
            debug_overlay: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_expire() {
        let mut notices = Notices::new(Duration::from_millis(100));
        notices.push("cache cleared");
        let created = Instant::now();

        assert_eq!(notices.active(created).len(), 1);

        let later = created + Duration::from_millis(150);
        assert!(notices.active(later).is_empty());

        notices.sweep(later);
        assert!(notices.is_empty());
    }
}
