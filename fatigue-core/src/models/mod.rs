pub mod config;
pub mod error;
pub mod sample;
pub mod session_result;
pub mod state;
