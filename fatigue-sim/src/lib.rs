//! # fatigue-sim
//!
//! Hardware-free backends for fatigue-core.
//!
//! Provides:
//! - `SimulatedRig`: deterministic synthetic bridge channels and cycle signal
//! - `ReplaySource`: plays a recorded CSV log back through a new session
//! - `run_simulation`: one-shot batch run driven by a `SimulationConfig`
//!
//! ## Usage
//! ```ignore
//! use fatigue_core::{SamplingSession, SessionConfig};
//! use fatigue_sim::{RigConfig, SimulatedRig};
//!
//! let rig = SimulatedRig::new(RigConfig::default()).unwrap();
//! let mut session = SamplingSession::new(rig, SessionConfig::default());
//! let result = session.start().unwrap();
//! ```

pub mod error;
pub mod replay;
pub mod runner;
pub mod simulated_rig;

pub use error::SimError;
pub use replay::ReplaySource;
pub use runner::{run_simulation, SimulationConfig};
pub use simulated_rig::{RigConfig, SimulatedRig};
