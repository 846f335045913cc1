use std::time::Duration;

use super::error::SessionError;
use super::session_result::SessionResult;

/// Live counters of a sampling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub cycle_count: u64,
    pub time_since_last_transition: Duration,
    /// Number of completed iterations (index of the next sample).
    pub iteration: u64,
}

/// Sampling session state machine.
///
/// State transitions:
/// ```text
/// idle → running → draining → closed
///           ↓                   ↑
///         failed ───────────────┘
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingState {
    Idle,
    Running { iteration: u64, cycle_count: u64 },
    Draining,
    Failed(SessionError),
    Closed(Box<SessionResult>),
}

impl SamplingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed(_))
    }

    /// The result, once the session is closed.
    pub fn result(&self) -> Option<&SessionResult> {
        match self {
            Self::Closed(result) => Some(result),
            _ => None,
        }
    }
}
