//! Cancellable frame-driven render loop
//!
//! A spawned task that ticks a host callback on the engine's cadence. The
//! callback does the actual work (tick + paint) and reports the cadence for
//! the next interval; the task must be cancelled explicitly on teardown.

use crate::core::config::FrameTimingConfig;
use crate::prelude::{Arc, Duration};
use crate::runtime::{async_delay, spawn, AsyncHandle};
use std::sync::atomic::{AtomicBool, Ordering};

/// Pace of the frame loop, decided fresh after every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCadence {
    /// Load-all mode: heavy passes, long interval
    LoadAll,
    /// The view is panning or dragging
    Moving,
    Idle,
    /// Tear the loop down from inside the callback
    Stop,
}

impl FrameCadence {
    fn interval(&self, timing: &FrameTimingConfig) -> Duration {
        match self {
            FrameCadence::LoadAll => Duration::from_millis(timing.load_all_interval_ms),
            FrameCadence::Moving => Duration::from_millis(timing.moving_interval_ms),
            FrameCadence::Idle => Duration::from_millis(timing.idle_interval_ms),
            FrameCadence::Stop => Duration::from_millis(0),
        }
    }
}

/// Handle to the running loop.
pub struct FrameLoop {
    handle: Box<dyn AsyncHandle>,
    alive: Arc<AtomicBool>,
}

impl FrameLoop {
    /// Spawns the loop on the global runtime. `tick` runs once per frame and
    /// returns the cadence governing the delay before the next frame.
    pub fn spawn<F>(timing: FrameTimingConfig, mut tick: F) -> Self
    where
        F: FnMut() -> FrameCadence + Send + 'static,
    {
        let alive = Arc::new(AtomicBool::new(true));
        let alive_task = alive.clone();

        let handle = spawn(async move {
            loop {
                if !alive_task.load(Ordering::SeqCst) {
                    break;
                }
                let cadence = tick();
                if cadence == FrameCadence::Stop {
                    alive_task.store(false, Ordering::SeqCst);
                    break;
                }
                async_delay(cadence.interval(&timing)).await;
            }
            log::debug!("frame loop exited");
        });

        Self { handle, alive }
    }

    /// Stops the loop and aborts its pending delay.
    pub fn cancel(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.handle.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.handle.is_finished()
    }
}

#[cfg(all(test, feature = "tokio-runtime"))]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn fast_timing() -> FrameTimingConfig {
        FrameTimingConfig {
            load_all_interval_ms: 5,
            moving_interval_ms: 5,
            idle_interval_ms: 5,
        }
    }

    #[tokio::test]
    async fn test_loop_ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_cb = ticks.clone();

        let frame_loop = FrameLoop::spawn(fast_timing(), move || {
            ticks_cb.fetch_add(1, Ordering::SeqCst);
            FrameCadence::Idle
        });

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(frame_loop.is_running());
        frame_loop.cancel();

        let at_cancel = ticks.load(Ordering::SeqCst);
        assert!(at_cancel >= 2);

        // No further ticks after cancellation.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!frame_loop.is_running());
        assert_eq!(ticks.load(Ordering::SeqCst), at_cancel);
    }

    #[tokio::test]
    async fn test_callback_can_stop_the_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_cb = ticks.clone();

        let frame_loop = FrameLoop::spawn(fast_timing(), move || {
            let n = ticks_cb.fetch_add(1, Ordering::SeqCst);
            if n >= 2 {
                FrameCadence::Stop
            } else {
                FrameCadence::Moving
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!frame_loop.is_running());
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }
}
