use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fatigue_core::{Clock, ManualClock, MonotonicClock, Sample, SamplingSession, SessionConfig, SessionResult};

use crate::error::SimError;
use crate::simulated_rig::{RigConfig, SimulatedRig};

/// Everything needed for one simulated run.
///
/// Loaded from JSON; any omitted field takes its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub session: SessionConfig,
    pub rig: RigConfig,

    /// Sleep on the real clock instead of virtual time (default: false).
    pub realtime: bool,
}

impl SimulationConfig {
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Run one session against a `SimulatedRig`.
///
/// Returns the session result and the recorded samples.
pub fn run_simulation(config: SimulationConfig) -> Result<(SessionResult, Vec<Sample>), SimError> {
    let rig = SimulatedRig::new(config.rig)?;
    let clock: Arc<dyn Clock> = if config.realtime {
        Arc::new(MonotonicClock::new())
    } else {
        Arc::new(ManualClock::new())
    };

    log::info!(
        "Simulating {} channels, {} transitions, {} clock",
        config.session.channel_count,
        rig.config().transitions,
        if config.realtime { "real" } else { "virtual" }
    );

    let mut session = SamplingSession::new(rig, config.session).with_clock(clock);
    let result = session.start()?;
    Ok((result, session.samples().to_vec()))
}
