use thiserror::Error;

use fatigue_core::SessionError;

/// Errors from building or running a simulated session.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("invalid rig: {0}")]
    InvalidRig(String),

    #[error("replay log has no samples")]
    EmptyLog,

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
