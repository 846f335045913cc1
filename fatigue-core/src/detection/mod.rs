pub mod cycle_detector;
pub mod quiescence_timer;
