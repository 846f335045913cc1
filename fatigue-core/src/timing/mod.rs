pub mod clocks;
pub mod stop_signal;
