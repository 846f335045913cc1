pub mod channel_source;
pub mod clock;
pub mod log_sink;
pub mod session_observer;
