use serde::{Deserialize, Serialize};

/// Value of the dedicated two-state channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryState {
    Low,
    High,
}

impl BinaryState {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for BinaryState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<u8> for BinaryState {
    fn from(value: u8) -> Self {
        Self::from(value != 0)
    }
}

/// One analog value (unitless ratio) tagged with its channel index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelReading {
    pub channel: usize,
    pub value: f64,
}

impl ChannelReading {
    pub fn new(channel: usize, value: f64) -> Self {
        Self { channel, value }
    }
}

/// One timestamped, cycle-tagged snapshot of every analog channel.
///
/// Fields are private so a recorded sample cannot be altered afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    iteration: u64,
    time_secs: f64,
    cycle_count: u64,
    readings: Vec<ChannelReading>,
}

impl Sample {
    pub fn new(iteration: u64, time_secs: f64, cycle_count: u64, readings: Vec<ChannelReading>) -> Self {
        Self {
            iteration,
            time_secs,
            cycle_count,
            readings,
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Seconds since session start (`iteration × delay`).
    pub fn time_secs(&self) -> f64 {
        self.time_secs
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn readings(&self) -> &[ChannelReading] {
        &self.readings
    }

    /// Value of `channel`, if this sample carries it.
    pub fn value(&self, channel: usize) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.channel == channel)
            .map(|r| r.value)
    }

    pub fn channel_count(&self) -> usize {
        self.readings.len()
    }
}
