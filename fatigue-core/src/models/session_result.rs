use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::SessionConfig;
use super::error::SessionError;
use super::state::SessionState;

/// Why a session left the running state.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// No transition for the configured quiescence threshold.
    Quiescent,
    /// The optional hard ceiling was reached.
    MaxDuration,
    /// An external stop was requested.
    Stopped,
    /// A read or write failed; the run ended at the last good sample.
    Failed(SessionError),
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&SessionError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiescent => f.write_str("quiescent"),
            Self::MaxDuration => f.write_str("max duration reached"),
            Self::Stopped => f.write_str("stopped"),
            Self::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Terminal result of a sampling session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub reason: StopReason,
    pub final_state: SessionState,
    pub total_samples: u64,
    /// Monotonic time from the first sample to the end of the loop.
    pub elapsed_secs: f64,
    /// Path of the durable log, when the session wrote to a file.
    pub log_path: Option<PathBuf>,
    /// SHA-256 of the finished log, when the session wrote to a file.
    pub checksum: Option<String>,
    pub metadata: SessionMetadata,
}

impl SessionResult {
    pub fn is_failure(&self) -> bool {
        self.reason.is_failure()
    }
}

/// Summary stored next to the log as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub id: String,
    pub created_at: String,
    pub log_file: Option<String>,
    pub checksum: Option<String>,
    pub channel_count: usize,
    pub delay_secs: f64,
    pub quiescence_secs: f64,
    pub total_cycles: u64,
    pub total_samples: u64,
    pub elapsed_secs: f64,
    pub stop_reason: String,
}

impl SessionMetadata {
    pub fn new(config: &SessionConfig, reason: &StopReason, state: &SessionState, elapsed_secs: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            log_file: None,
            checksum: None,
            channel_count: config.channel_count,
            delay_secs: config.delay_secs,
            quiescence_secs: config.quiescence_secs,
            total_cycles: state.cycle_count,
            total_samples: state.iteration,
            elapsed_secs,
            stop_reason: reason.to_string(),
        }
    }
}
