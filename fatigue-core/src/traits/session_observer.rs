use crate::models::error::SessionError;
use crate::models::sample::Sample;
use crate::models::session_result::SessionResult;
use crate::models::state::SamplingState;

/// Event delegate for sampling session notifications.
///
/// All methods are called from the sampling thread between iterations,
/// so implementations must return quickly. Every method has an empty
/// default.
pub trait SessionObserver: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, _state: &SamplingState) {}

    /// Called after a sample's row is durable.
    fn on_sample_recorded(&self, _sample: &Sample) {}

    /// Called when a transition increments the cycle count.
    fn on_transition(&self, _cycle_count: u64) {}

    /// Called when a read or write failure ends the run.
    fn on_error(&self, _error: &SessionError) {}

    /// Called once the log is finalized.
    fn on_session_closed(&self, _result: &SessionResult) {}
}
