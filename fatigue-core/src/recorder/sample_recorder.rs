use std::path::{Path, PathBuf};

use crate::models::error::SessionError;
use crate::models::sample::Sample;
use crate::storage::csv_log::{format_row, header_line};
use crate::traits::log_sink::LogSink;

/// Owns the durable log and the in-memory sample sequence for one session.
///
/// A sample is appended to memory only after its row is durable, so
/// `samples()` never shows anything the log lacks. The sink is finished
/// exactly once: by `close()`, or by `Drop` on any other exit path.
pub struct SampleRecorder {
    sink: Box<dyn LogSink>,
    samples: Vec<Sample>,
    channel_count: usize,
    closed: bool,
}

impl SampleRecorder {
    /// Take ownership of `sink` and write the log header to it.
    pub fn start(sink: Box<dyn LogSink>, channel_count: usize) -> Result<Self, SessionError> {
        let mut recorder = Self {
            sink,
            samples: Vec::new(),
            channel_count,
            closed: false,
        };
        recorder
            .sink
            .append(header_line(channel_count).as_bytes())
            .map_err(|e| SessionError::LogWriteFailure(format!("failed to write header: {}", e)))?;
        Ok(recorder)
    }

    /// Persist `sample`, then keep it in memory.
    pub fn record(&mut self, sample: Sample) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::LogWriteFailure("recorder is closed".into()));
        }
        if sample.channel_count() != self.channel_count {
            return Err(SessionError::LogWriteFailure(format!(
                "sample {} has {} channels, log expects {}",
                sample.iteration(),
                sample.channel_count(),
                self.channel_count
            )));
        }

        let row = format_row(&sample);
        self.sink
            .append(row.as_bytes())
            .map_err(|e| SessionError::LogWriteFailure(format!("row {}: {}", sample.iteration(), e)))?;

        log::debug!(
            "Recorded sample {} (t={}s, cycles={})",
            sample.iteration(),
            sample.time_secs(),
            sample.cycle_count()
        );
        self.samples.push(sample);
        Ok(())
    }

    /// Flush and release the log. Later calls are no-ops.
    pub fn close(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink
            .finish()
            .map_err(|e| SessionError::LogWriteFailure(format!("failed to finalize log: {}", e)))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.sink.location().map(Path::to_path_buf)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(mut self) -> Vec<Sample> {
        std::mem::take(&mut self.samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(time_secs, value)` pairs for one channel, in recording order.
    pub fn channel_series(&self, channel: usize) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .filter_map(|s| s.value(channel).map(|v| (s.time_secs(), v)))
            .collect()
    }

    /// `(time_secs, cycle_count)` pairs in recording order.
    pub fn cycle_series(&self) -> Vec<(f64, u64)> {
        self.samples
            .iter()
            .map(|s| (s.time_secs(), s.cycle_count()))
            .collect()
    }
}

impl Drop for SampleRecorder {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                log::error!("Failed to release log on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::models::sample::ChannelReading;

    /// In-memory sink that can be told to fail on a given append.
    #[derive(Clone, Default)]
    struct MemorySink {
        lines: Arc<Mutex<Vec<String>>>,
        finished: Arc<Mutex<u32>>,
        fail_on_append: Option<usize>,
    }

    impl LogSink for MemorySink {
        fn append(&mut self, line: &[u8]) -> io::Result<()> {
            let mut lines = self.lines.lock();
            if Some(lines.len() + 1) == self.fail_on_append {
                return Err(io::Error::other("disk full"));
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
            Ok(())
        }

        fn finish(&mut self) -> io::Result<()> {
            *self.finished.lock() += 1;
            Ok(())
        }
    }

    fn sample(iteration: u64, cycles: u64) -> Sample {
        Sample::new(
            iteration,
            iteration as f64,
            cycles,
            vec![ChannelReading::new(0, iteration as f64 * 0.1), ChannelReading::new(1, 0.5)],
        )
    }

    #[test]
    fn records_to_sink_and_memory() {
        let sink = MemorySink::default();
        let mut recorder = SampleRecorder::start(Box::new(sink.clone()), 2).unwrap();

        recorder.record(sample(0, 0)).unwrap();
        recorder.record(sample(1, 1)).unwrap();

        assert_eq!(recorder.len(), 2);
        assert_eq!(
            sink.lines.lock().as_slice(),
            [
                "iteration,time_seconds,cycle_count,channel_0,channel_1\n",
                "0,0,0,0,0.5\n",
                "1,1,1,0.1,0.5\n",
            ]
        );
        assert_eq!(recorder.cycle_series(), vec![(0.0, 0), (1.0, 1)]);
        assert_eq!(recorder.channel_series(0), vec![(0.0, 0.0), (1.0, 0.1)]);
        assert!(recorder.channel_series(9).is_empty());
    }

    #[test]
    fn failed_write_keeps_sample_out_of_memory() {
        let sink = MemorySink {
            fail_on_append: Some(4),
            ..Default::default()
        };
        let mut recorder = SampleRecorder::start(Box::new(sink.clone()), 2).unwrap();

        recorder.record(sample(0, 0)).unwrap();
        recorder.record(sample(1, 0)).unwrap();
        let err = recorder.record(sample(2, 1)).unwrap_err();

        assert!(matches!(err, SessionError::LogWriteFailure(_)));
        assert_eq!(recorder.len(), 2);
        assert_eq!(sink.lines.lock().len(), 3);
    }

    #[test]
    fn header_failure_is_reported() {
        let sink = MemorySink {
            fail_on_append: Some(1),
            ..Default::default()
        };
        let err = SampleRecorder::start(Box::new(sink), 2).err().unwrap();
        assert!(err.to_string().contains("header"));
    }

    #[test]
    fn rejects_wrong_channel_count() {
        let mut recorder = SampleRecorder::start(Box::new(MemorySink::default()), 3).unwrap();
        assert!(recorder.record(sample(0, 0)).is_err());
        assert!(recorder.is_empty());
    }

    #[test]
    fn close_is_idempotent_and_blocks_records() {
        let sink = MemorySink::default();
        let mut recorder = SampleRecorder::start(Box::new(sink.clone()), 2).unwrap();
        recorder.close().unwrap();
        recorder.close().unwrap();
        assert_eq!(*sink.finished.lock(), 1);
        assert!(recorder.record(sample(0, 0)).is_err());
        drop(recorder);
        assert_eq!(*sink.finished.lock(), 1);
    }

    #[test]
    fn drop_releases_unclosed_log() {
        let sink = MemorySink::default();
        {
            let mut recorder = SampleRecorder::start(Box::new(sink.clone()), 2).unwrap();
            recorder.record(sample(0, 0)).unwrap();
        }
        assert_eq!(*sink.finished.lock(), 1);
    }

    #[test]
    fn into_samples_hands_over_buffer() {
        let mut recorder = SampleRecorder::start(Box::new(MemorySink::default()), 2).unwrap();
        recorder.record(sample(0, 0)).unwrap();
        let samples = recorder.into_samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].iteration(), 0);
    }
}
