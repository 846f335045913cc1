//! Synthetic test rig.
//!
//! Stands in for the bridge inputs and the PLC cycle signal of a real
//! fatigue frame. Output is fully deterministic: it depends only on how
//! many reads have been made, never on wall-clock time.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use fatigue_core::{BinaryState, ChannelSource, DeviceError};

use crate::error::SimError;

/// Shape of the simulated rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Number of analog (bridge) channels (default: 10).
    pub channels: usize,

    /// Binary reads spent at each level before toggling (default: 3).
    pub half_period: u64,

    /// Transitions produced before the signal holds (default: 20).
    pub transitions: u64,

    /// Bridge output at rest, in V/V (default: 0.0).
    pub offset: f64,

    /// Peak deviation from `offset`, in V/V (default: 0.002).
    pub amplitude: f64,

    /// Analog reads that succeed before the rig reports a disconnect.
    pub fail_after_analog_reads: Option<u64>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            channels: 10,
            half_period: 3,
            transitions: 20,
            offset: 0.0,
            amplitude: 0.002,
            fail_after_analog_reads: None,
        }
    }
}

impl RigConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.channels == 0 {
            return Err("rig needs at least one analog channel".into());
        }
        if self.half_period == 0 {
            return Err("half period must be at least one read".into());
        }
        if !self.offset.is_finite() || !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(format!(
                "waveform must be finite with non-negative amplitude, got offset {} amplitude {}",
                self.offset, self.amplitude
            ));
        }
        Ok(())
    }
}

/// `ChannelSource` driven by a `RigConfig`.
///
/// The binary channel starts low and toggles every `half_period` reads
/// until `transitions` toggles have happened, then holds. Analog channels
/// follow a sine wave in phase with the binary signal, each channel
/// shifted slightly so the traces are distinguishable.
#[derive(Debug, Clone)]
pub struct SimulatedRig {
    config: RigConfig,
    binary_reads: u64,
    analog_reads: u64,
}

impl SimulatedRig {
    pub fn new(config: RigConfig) -> Result<Self, SimError> {
        config.validate().map_err(SimError::InvalidRig)?;
        Ok(Self {
            config,
            binary_reads: 0,
            analog_reads: 0,
        })
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn binary_reads(&self) -> u64 {
        self.binary_reads
    }

    pub fn analog_reads(&self) -> u64 {
        self.analog_reads
    }

    fn level_at(&self, read: u64) -> BinaryState {
        let toggles = (read / self.config.half_period).min(self.config.transitions);
        BinaryState::from(toggles % 2 == 1)
    }
}

impl ChannelSource for SimulatedRig {
    fn analog_channel_count(&self) -> usize {
        self.config.channels
    }

    fn read_analog(&mut self, channel: usize) -> Result<f64, DeviceError> {
        if channel >= self.config.channels {
            return Err(DeviceError::ChannelOutOfRange(channel));
        }
        if let Some(limit) = self.config.fail_after_analog_reads {
            if self.analog_reads >= limit {
                log::warn!("Simulated rig dropping out after {} analog reads", limit);
                return Err(DeviceError::Disconnected);
            }
        }
        self.analog_reads += 1;

        let step = self.binary_reads.saturating_sub(1) as f64;
        let phase = step * PI / self.config.half_period as f64 + channel as f64 * 0.1;
        Ok(self.config.offset + self.config.amplitude * phase.sin())
    }

    fn read_binary(&mut self) -> Result<BinaryState, DeviceError> {
        let state = self.level_at(self.binary_reads);
        self.binary_reads += 1;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fatigue_core::{CycleDetector, ManualClock, SamplingSession, SessionConfig, StopReason};

    fn rig(half_period: u64, transitions: u64) -> SimulatedRig {
        SimulatedRig::new(RigConfig {
            channels: 2,
            half_period,
            transitions,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn binary_toggles_then_holds() {
        let mut rig = rig(2, 3);
        let levels: Vec<u8> = (0..10).map(|_| rig.read_binary().unwrap().as_u8()).collect();
        assert_eq!(levels, vec![0, 0, 1, 1, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn produces_requested_transition_count() {
        let mut rig = rig(3, 7);
        let mut detector = CycleDetector::new();
        for _ in 0..100 {
            detector.observe(rig.read_binary().unwrap());
        }
        assert_eq!(detector.current_count(), 7);
    }

    #[test]
    fn analog_stays_within_amplitude() {
        let mut rig = SimulatedRig::new(RigConfig {
            channels: 3,
            offset: 0.01,
            amplitude: 0.002,
            ..Default::default()
        })
        .unwrap();
        for _ in 0..50 {
            rig.read_binary().unwrap();
            for channel in 0..3 {
                let value = rig.read_analog(channel).unwrap();
                assert!((0.0079..=0.0121).contains(&value), "value {} out of band", value);
            }
        }
    }

    #[test]
    fn out_of_range_channel_is_rejected() {
        let mut rig = rig(1, 1);
        assert_eq!(rig.read_analog(2), Err(DeviceError::ChannelOutOfRange(2)));
        assert_eq!(rig.analog_reads(), 0);
    }

    #[test]
    fn injected_fault_disconnects() {
        let mut rig = SimulatedRig::new(RigConfig {
            channels: 1,
            fail_after_analog_reads: Some(2),
            ..Default::default()
        })
        .unwrap();
        assert!(rig.read_analog(0).is_ok());
        assert!(rig.read_analog(0).is_ok());
        assert_eq!(rig.read_analog(0), Err(DeviceError::Disconnected));
    }

    #[test]
    fn rejects_zero_half_period() {
        let config = RigConfig {
            half_period: 0,
            ..Default::default()
        };
        assert!(matches!(SimulatedRig::new(config), Err(SimError::InvalidRig(_))));
    }

    #[test]
    fn session_counts_every_rig_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            delay_secs: 1.0,
            quiescence_secs: 5.0,
            channel_count: 2,
            log_path: dir.path().join("rig.csv"),
            settle_secs: 0.0,
            ..Default::default()
        };
        let mut session = SamplingSession::new(rig(2, 4), config).with_clock(Arc::new(ManualClock::new()));

        let result = session.start().unwrap();

        // Last toggle lands on read 8 (t=8s); quiet for 5s at t=13s.
        assert_eq!(result.reason, StopReason::Quiescent);
        assert_eq!(result.final_state.cycle_count, 4);
        assert_eq!(result.total_samples, 13);
        assert_eq!(session.source().binary_reads(), 13);
    }
}
