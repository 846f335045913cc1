use std::time::Duration;

use crate::timing::stop_signal::StopSignal;

/// Monotonic time source driving the sampling schedule.
///
/// Implemented by:
/// - `MonotonicClock` (real time)
/// - `ManualClock` (virtual time, advanced by `sleep`)
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin. Never goes backwards.
    fn now(&self) -> Duration;

    /// Sleep for `duration` unless `stop` is triggered first.
    ///
    /// Returns `false` if the sleep was cut short by the stop signal.
    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool;
}
