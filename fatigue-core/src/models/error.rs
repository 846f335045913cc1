use std::fmt;

use thiserror::Error;

/// Identifies which input a device error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Analog(usize),
    Binary,
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analog(index) => write!(f, "analog channel {}", index),
            Self::Binary => f.write_str("binary channel"),
        }
    }
}

/// Errors reported by a `ChannelSource` implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("device disconnected")]
    Disconnected,

    #[error("read timed out")]
    Timeout,

    #[error("channel {0} out of range")]
    ChannelOutOfRange(usize),

    #[error("device error: {0}")]
    Other(String),
}

/// Errors that can occur while configuring or running a sampling session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("read failed on {channel}: {source}")]
    DeviceReadFailure { channel: ChannelId, source: DeviceError },

    #[error("log write failed: {0}")]
    LogWriteFailure(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl SessionError {
    pub(crate) fn device(channel: ChannelId, source: DeviceError) -> Self {
        Self::DeviceReadFailure { channel, source }
    }

    /// Whether this error ends a run that was already sampling.
    pub fn is_runtime_failure(&self) -> bool {
        matches!(self, Self::DeviceReadFailure { .. } | Self::LogWriteFailure(_))
    }
}
