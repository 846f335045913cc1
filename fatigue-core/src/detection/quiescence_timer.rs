use std::sync::Arc;
use std::time::Duration;

use crate::traits::clock::Clock;

/// Tracks time since the last transition on a monotonic clock.
pub struct QuiescenceTimer {
    clock: Arc<dyn Clock>,
    reference: Duration,
}

impl QuiescenceTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let reference = clock.now();
        Self { clock, reference }
    }

    pub fn reset(&mut self) {
        self.reference = self.clock.now();
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.reference)
    }

    pub fn expired(&self, threshold: Duration) -> bool {
        self.elapsed() >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::clocks::ManualClock;

    #[test]
    fn expires_exactly_at_threshold() {
        let clock = Arc::new(ManualClock::new());
        let timer = QuiescenceTimer::new(clock.clone());
        let threshold = Duration::from_secs(30);

        clock.advance(Duration::from_secs(29));
        assert!(!timer.expired(threshold));

        clock.advance(Duration::from_secs(1));
        assert!(timer.expired(threshold));
        assert_eq!(timer.elapsed(), threshold);
    }

    #[test]
    fn reset_restarts_the_window() {
        let clock = Arc::new(ManualClock::new());
        let mut timer = QuiescenceTimer::new(clock.clone());

        clock.advance(Duration::from_secs(4));
        timer.reset();
        assert_eq!(timer.elapsed(), Duration::ZERO);

        clock.advance(Duration::from_secs(4));
        assert!(!timer.expired(Duration::from_secs(5)));
        clock.advance(Duration::from_secs(1));
        assert!(timer.expired(Duration::from_secs(5)));
    }

    #[test]
    fn reference_taken_at_construction() {
        let clock = Arc::new(ManualClock::new());
        clock.advance(Duration::from_secs(100));
        let timer = QuiescenceTimer::new(clock.clone());
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }
}
