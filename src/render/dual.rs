//! Backend selection between the element and canvas painters

use serde::{Deserialize, Serialize};

/// Which paint mechanism is active. Both render the identical tile set in
/// identical priority order; only the painting differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    Element,
    Canvas,
}

/// Picks the backend from the current scale, with a manual override.
///
/// The flip at the threshold is immediate in both directions; there is no
/// hysteresis band, so a scale oscillating across the threshold flips the
/// backend every tick.
#[derive(Debug)]
pub struct BackendSelector {
    threshold: f64,
    forced: Option<BackendKind>,
    last: Option<BackendKind>,
}

impl BackendSelector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            forced: None,
            last: None,
        }
    }

    /// Selects the backend for this pass; the bool reports a switch since
    /// the previous pass (used to raise the switch notice).
    pub fn select(&mut self, scale: f64) -> (BackendKind, bool) {
        let backend = self.forced.unwrap_or(if scale > self.threshold {
            BackendKind::Canvas
        } else {
            BackendKind::Element
        });

        let switched = self.last.map(|last| last != backend).unwrap_or(false);
        self.last = Some(backend);
        (backend, switched)
    }

    /// Debug override: pins the opposite of the current backend, or releases
    /// the pin when already forced.
    pub fn force_toggle(&mut self, scale: f64) -> BackendKind {
        match self.forced {
            Some(_) => {
                self.forced = None;
            }
            None => {
                let (current, _) = self.select(scale);
                self.forced = Some(match current {
                    BackendKind::Element => BackendKind::Canvas,
                    BackendKind::Canvas => BackendKind::Element,
                });
            }
        }
        self.select(scale).0
    }

    pub fn forced(&self) -> Option<BackendKind> {
        self.forced
    }
}
