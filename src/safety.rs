//! Defensive recovery from invalid numeric viewport state
//!
//! Pan math on corrupted input (NaN offsets, a zero or negative scale)
//! would otherwise poison every downstream coordinate. The monitor detects
//! it, hands back a safe centered offset for the host to apply, and holds a
//! cooldown so a stream of invalid frames produces one recovery, not a
//! cascade.

use crate::core::viewport::ViewportState;
use crate::prelude::{Duration, Instant};

/// Outcome of one validity check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafetyVerdict {
    Healthy,
    /// State was invalid; apply this offset via the move callback and clear
    /// all caches.
    Recovered { offset_x: f64, offset_y: f64 },
    /// State is still invalid but a recovery already fired within the
    /// cooldown window; do nothing this frame.
    CoolingDown,
}

#[derive(Debug)]
pub struct SafetyMonitor {
    cooldown: Duration,
    last_recovery: Option<Instant>,
}

impl SafetyMonitor {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_recovery: None,
        }
    }

    /// Validates the viewport. Must be called before any tile math each
    /// tick; the recovered offset centers the map origin tile on screen.
    pub fn check(&mut self, view: &ViewportState, now: Instant) -> SafetyVerdict {
        if view.is_sane() {
            return SafetyVerdict::Healthy;
        }

        if let Some(last) = self.last_recovery {
            if now.duration_since(last) < self.cooldown {
                return SafetyVerdict::CoolingDown;
            }
        }

        self.last_recovery = Some(now);
        log::warn!(
            "invalid viewport state (offset {}, {}; scale {}), recentering",
            view.offset_x,
            view.offset_y,
            view.scale
        );

        SafetyVerdict::Recovered {
            offset_x: view.width as f64 / 2.0,
            offset_y: view.height as f64 / 2.0,
        }
    }
}
