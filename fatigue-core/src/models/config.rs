use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a sampling session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sampling interval in seconds (default: 1.0).
    pub delay_secs: f64,

    /// Seconds without a transition before the run stops (default: 30.0).
    pub quiescence_secs: f64,

    /// Number of analog channels sampled per iteration (default: 10).
    pub channel_count: usize,

    /// Destination of the durable CSV log. Truncated when a session starts.
    pub log_path: PathBuf,

    /// Wait between opening the log and the first sample (default: 5.0).
    pub settle_secs: f64,

    /// Hard ceiling on run time in seconds (None = quiescence only).
    pub max_duration_secs: Option<f64>,

    /// Write a `.metadata.json` sidecar next to the log on close (default: true).
    pub write_metadata: bool,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.delay_secs.is_finite() || self.delay_secs <= 0.0 {
            return Err(format!("delay must be a positive number of seconds, got {}", self.delay_secs));
        }
        if !self.quiescence_secs.is_finite() || self.quiescence_secs <= 0.0 {
            return Err(format!(
                "quiescence threshold must be a positive number of seconds, got {}",
                self.quiescence_secs
            ));
        }
        if self.channel_count == 0 {
            return Err("at least one analog channel is required".into());
        }
        if self.log_path.as_os_str().is_empty() {
            return Err("log path is empty".into());
        }
        if self.log_path.is_dir() {
            return Err(format!("log path {} is a directory", self.log_path.display()));
        }
        if !self.settle_secs.is_finite() || self.settle_secs < 0.0 {
            return Err(format!("settle delay must be non-negative, got {}", self.settle_secs));
        }
        if let Some(max) = self.max_duration_secs {
            if !max.is_finite() || max <= 0.0 {
                return Err(format!("maximum duration must be positive, got {}", max));
            }
        }

        let mut spans = vec![
            ("delay", self.delay_secs),
            ("quiescence threshold", self.quiescence_secs),
            ("settle delay", self.settle_secs),
        ];
        spans.extend(self.max_duration_secs.map(|max| ("maximum duration", max)));
        for (name, secs) in spans {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(format!("{} of {}s is out of range", name, secs));
            }
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }

    pub fn quiescence_threshold(&self) -> Duration {
        Duration::from_secs_f64(self.quiescence_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs_f64(self.settle_secs)
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs_f64)
    }

    /// Timestamp of a given iteration: `iteration × delay`, independent of wall-clock drift.
    pub fn timestamp_for(&self, iteration: u64) -> f64 {
        iteration as f64 * self.delay_secs
    }

    /// Offset of a given iteration's slot from the run origin.
    ///
    /// `None` once `iteration × delay` no longer fits in a `Duration`.
    pub fn slot_offset(&self, iteration: u64) -> Option<Duration> {
        Duration::try_from_secs_f64(self.timestamp_for(iteration)).ok()
    }

    /// A fresh `fatigue_<uuid>.csv` path inside `directory`.
    pub fn unique_log_path(directory: &Path) -> PathBuf {
        directory.join(format!("fatigue_{}.csv", uuid::Uuid::new_v4()))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            delay_secs: 1.0,
            quiescence_secs: 30.0,
            channel_count: 10,
            log_path: PathBuf::from("fatigue_test.csv"),
            settle_secs: 5.0,
            max_duration_secs: None,
            write_metadata: true,
        }
    }
}
