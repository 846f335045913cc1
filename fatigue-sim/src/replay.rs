//! Replays a recorded log as a `ChannelSource`.
//!
//! Useful for re-running detection on archived runs or feeding a saved
//! session into a new pipeline. The binary level is rebuilt from the
//! parity of each row's cycle count, so replaying a log through a fresh
//! session reproduces its transitions exactly (relative to the first row).

use std::path::Path;

use fatigue_core::{read_log, BinaryState, ChannelSource, DeviceError, Sample};

use crate::error::SimError;

pub struct ReplaySource {
    samples: Vec<Sample>,
    channels: usize,
    // Row selected by the last binary read
    current: Option<usize>,
    next: usize,
}

impl ReplaySource {
    pub fn new(samples: Vec<Sample>) -> Result<Self, SimError> {
        let channels = samples.first().map(Sample::channel_count).ok_or(SimError::EmptyLog)?;
        Ok(Self {
            samples,
            channels,
            current: None,
            next: 0,
        })
    }

    /// Load every complete row of the log at `path`.
    pub fn open(path: &Path) -> Result<Self, SimError> {
        let samples = read_log(path)?;
        log::info!("Replaying {} samples from {}", samples.len(), path.display());
        Self::new(samples)
    }

    /// Rows not yet replayed.
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.next
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl ChannelSource for ReplaySource {
    fn analog_channel_count(&self) -> usize {
        self.channels
    }

    fn read_analog(&mut self, channel: usize) -> Result<f64, DeviceError> {
        let row = self
            .current
            .and_then(|index| self.samples.get(index))
            .ok_or_else(|| DeviceError::Other("no row selected; read the binary channel first".into()))?;
        row.value(channel).ok_or(DeviceError::ChannelOutOfRange(channel))
    }

    fn read_binary(&mut self) -> Result<BinaryState, DeviceError> {
        let row = self.samples.get(self.next).ok_or(DeviceError::Disconnected)?;
        let state = BinaryState::from(row.cycle_count() % 2 == 1);
        self.current = Some(self.next);
        self.next += 1;
        Ok(state)
    }
}
