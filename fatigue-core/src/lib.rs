//! # fatigue-core
//!
//! Hardware-agnostic core of the fatigue cycle-counting recorder.
//!
//! Samples a set of analog channels and one binary channel at a fixed
//! interval, counts binary transitions as fatigue cycles, appends every
//! sample to a CSV log and stops once no transition has been seen for
//! the quiescence threshold. Acquisition backends implement the
//! `ChannelSource` trait and plug into the generic `SamplingSession`.
//!
//! ## Architecture
//!
//! ```text
//! fatigue-core (this crate)
//! ├── traits/     ← ChannelSource, Clock, LogSink, SessionObserver
//! ├── models/     ← SessionError, SamplingState, SessionConfig, Sample, etc.
//! ├── detection/  ← CycleDetector, CycleWindow, QuiescenceTimer
//! ├── timing/     ← MonotonicClock, ManualClock, StopSignal
//! ├── recorder/   ← SampleRecorder
//! ├── session/    ← SamplingSession (orchestrator), RunningSession
//! └── storage/    ← CsvLogWriter, log reader, metadata sidecar
//! ```

pub mod detection;
pub mod models;
pub mod recorder;
pub mod session;
pub mod storage;
pub mod timing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use detection::cycle_detector::{CycleDetector, CycleWindow};
pub use detection::quiescence_timer::QuiescenceTimer;
pub use models::config::SessionConfig;
pub use models::error::{ChannelId, DeviceError, SessionError};
pub use models::sample::{BinaryState, ChannelReading, Sample};
pub use models::session_result::{SessionMetadata, SessionResult, StopReason};
pub use models::state::{SamplingState, SessionState};
pub use recorder::sample_recorder::SampleRecorder;
pub use session::sampling_session::{RunningSession, SamplingSession};
pub use storage::csv_log::CsvLogWriter;
pub use storage::log_reader::read_log;
pub use storage::metadata::{read_metadata, write_metadata};
pub use timing::clocks::{ManualClock, MonotonicClock};
pub use timing::stop_signal::StopSignal;
pub use traits::channel_source::ChannelSource;
pub use traits::clock::Clock;
pub use traits::log_sink::LogSink;
pub use traits::session_observer::SessionObserver;
