//! Discrete zoom-level bucketing of the continuous scale

/// Maps a continuous scale factor onto the discrete tile resolution level
/// used in tile URLs.
///
/// The breakpoints are fixed: levels for scales 0.5 and 0.75 intentionally
/// collapse onto the same bucket, so the produced set is {0, 2, 3, 4, 5}
/// with no level 1. The gap ships this way upstream and consumers depend on
/// the URL space, so it is preserved verbatim.
pub fn bucket_for_scale(scale: f64) -> i32 {
    if scale <= 0.25 {
        0
    } else if scale <= 0.5 {
        2
    } else if scale <= 0.75 {
        2
    } else if scale <= 1.0 {
        3
    } else if scale <= 2.0 {
        4
    } else {
        5
    }
}

/// Watches the scale across ticks and reports bucket transitions.
///
/// A transition is the signal for a wholesale cache clear; the caches are
/// keyed by level and stale entries must never survive into the new bucket's
/// key space.
#[derive(Debug, Default)]
pub struct ZoomTracker {
    last_bucket: Option<i32>,
}

impl ZoomTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current scale; returns the new bucket when it changed.
    ///
    /// The first observation establishes the baseline and is not a change.
    pub fn observe(&mut self, scale: f64) -> Option<i32> {
        let bucket = bucket_for_scale(scale);
        let changed = match self.last_bucket {
            Some(last) => last != bucket,
            None => false,
        };
        self.last_bucket = Some(bucket);
        if changed {
            Some(bucket)
        } else {
            None
        }
    }

    pub fn current(&self) -> Option<i32> {
        self.last_bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoints() {
        assert_eq!(bucket_for_scale(0.1), 0);
        assert_eq!(bucket_for_scale(0.25), 0);
        assert_eq!(bucket_for_scale(0.3), 2);
        assert_eq!(bucket_for_scale(0.9), 3);
        assert_eq!(bucket_for_scale(1.0), 3);
        assert_eq!(bucket_for_scale(1.5), 4);
        assert_eq!(bucket_for_scale(2.0), 4);
        assert_eq!(bucket_for_scale(3.7), 5);
    }

    #[test]
    fn test_half_and_three_quarters_share_a_bucket() {
        // The level-1 gap is load-bearing for tile URLs; do not "fix" it.
        assert_eq!(bucket_for_scale(0.5), 2);
        assert_eq!(bucket_for_scale(0.75), 2);
        assert_eq!(bucket_for_scale(0.5), bucket_for_scale(0.75));
    }

    #[test]
    fn test_tracker_reports_transitions_only() {
        let mut tracker = ZoomTracker::new();

        // Baseline observation is not a transition.
        assert_eq!(tracker.observe(0.9), None);
        assert_eq!(tracker.observe(0.95), None);

        // 0.9 -> 1.1 crosses the bucket 3 -> 4 boundary.
        assert_eq!(tracker.observe(1.1), Some(4));
        assert_eq!(tracker.observe(1.1), None);

        assert_eq!(tracker.observe(0.5), Some(2));
        assert_eq!(tracker.observe(0.75), None);
    }
}
