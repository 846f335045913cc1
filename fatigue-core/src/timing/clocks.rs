use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::stop_signal::StopSignal;
use crate::traits::clock::Clock;

/// Real monotonic clock backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool {
        if duration.is_zero() {
            return !stop.is_triggered();
        }
        !stop.wait_timeout(duration)
    }
}

/// Virtual clock for deterministic runs.
///
/// Time only moves when `sleep` or `advance` is called, so a session
/// with a 30 s quiescence threshold completes instantly.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward, e.g. to simulate slow reads.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool {
        if stop.is_triggered() {
            return false;
        }
        self.advance(duration);
        true
    }
}
