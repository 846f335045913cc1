use crate::models::error::{ChannelId, DeviceError, SessionError};
use crate::models::sample::{BinaryState, ChannelReading};

/// Interface for the attached acquisition hardware.
///
/// The session polls it synchronously once per iteration. Opening,
/// attaching and closing the device are the owner's responsibility.
/// Implemented by:
/// - `SimulatedRig`, `ReplaySource` (fatigue-sim)
pub trait ChannelSource: Send {
    /// Number of analog channels this source can read.
    fn analog_channel_count(&self) -> usize;

    /// Current ratio value of analog channel `channel`.
    fn read_analog(&mut self, channel: usize) -> Result<f64, DeviceError>;

    /// Current value of the binary state channel.
    fn read_binary(&mut self) -> Result<BinaryState, DeviceError>;

    /// Read channels `0..count` into one logically simultaneous set.
    ///
    /// Any failing channel fails the whole set; no partial result is returned.
    fn read_analog_all(&mut self, count: usize) -> Result<Vec<ChannelReading>, SessionError> {
        let mut readings = Vec::with_capacity(count);
        for channel in 0..count {
            let value = self
                .read_analog(channel)
                .map_err(|e| SessionError::device(ChannelId::Analog(channel), e))?;
            readings.push(ChannelReading::new(channel, value));
        }
        Ok(readings)
    }
}

impl<T: ChannelSource + ?Sized> ChannelSource for Box<T> {
    fn analog_channel_count(&self) -> usize {
        (**self).analog_channel_count()
    }

    fn read_analog(&mut self, channel: usize) -> Result<f64, DeviceError> {
        (**self).read_analog(channel)
    }

    fn read_binary(&mut self) -> Result<BinaryState, DeviceError> {
        (**self).read_binary()
    }
}
