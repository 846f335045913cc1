use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::detection::cycle_detector::CycleDetector;
use crate::detection::quiescence_timer::QuiescenceTimer;
use crate::models::config::SessionConfig;
use crate::models::error::{ChannelId, SessionError};
use crate::models::sample::Sample;
use crate::models::session_result::{SessionMetadata, SessionResult, StopReason};
use crate::models::state::{SamplingState, SessionState};
use crate::recorder::sample_recorder::SampleRecorder;
use crate::storage::csv_log::{sha256_file, CsvLogWriter};
use crate::storage::metadata::write_metadata;
use crate::timing::clocks::MonotonicClock;
use crate::timing::stop_signal::StopSignal;
use crate::traits::channel_source::ChannelSource;
use crate::traits::clock::Clock;
use crate::traits::log_sink::LogSink;
use crate::traits::session_observer::SessionObserver;

/// State shared with observers and `RunningSession` handles.
struct SharedState {
    state: SamplingState,
    progress: SessionState,
}

/// Fixed-interval sampling loop over a `ChannelSource`.
///
/// One session performs one run:
/// ```text
/// [ChannelSource] → binary → [CycleDetector] → [QuiescenceTimer]
///                 → analog ─────────────┬────→ [SampleRecorder] → CSV log
///                                cycle count
/// ```
/// The loop runs on the thread that calls [`SamplingSession::start`]
/// (or on a dedicated thread via [`SamplingSession::spawn`]). Iterations
/// never overlap; the only suspension point is the inter-sample sleep.
pub struct SamplingSession<S: ChannelSource> {
    source: S,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    stop: StopSignal,
    observer: Option<Arc<dyn SessionObserver>>,
    shared: Arc<Mutex<SharedState>>,

    // Replaces the CSV file log when set
    sink: Option<Box<dyn LogSink>>,

    // Samples of the finished run, for plotting
    samples: Vec<Sample>,
}

impl<S: ChannelSource> SamplingSession<S> {
    pub fn new(source: S, config: SessionConfig) -> Self {
        Self {
            source,
            config,
            clock: Arc::new(MonotonicClock::new()),
            stop: StopSignal::new(),
            observer: None,
            shared: Arc::new(Mutex::new(SharedState {
                state: SamplingState::Idle,
                progress: SessionState::default(),
            })),
            sink: None,
            samples: Vec::new(),
        }
    }

    /// Drive timing from `clock` instead of the real monotonic clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record into `sink` instead of creating a CSV file at `log_path`.
    pub fn with_log_sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    /// Token that ends the run at the next sleep when triggered.
    pub fn stop_handle(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SamplingState {
        self.shared.lock().state.clone()
    }

    /// Latest counters; final values once closed.
    pub fn snapshot(&self) -> SessionState {
        self.shared.lock().progress
    }

    /// Samples of the finished run, in order. Empty until closed.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give the channel source back to its owner.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Validate, open the log and run until quiescence, stop or failure.
    ///
    /// Transitions: idle → running → draining/failed → closed.
    ///
    /// Configuration problems, and a log whose header cannot be written,
    /// are returned as `Err` before anything is sampled. Read and write
    /// failures during the run end it and are reported through
    /// `SessionResult::reason`.
    pub fn start(&mut self) -> Result<SessionResult, SessionError> {
        {
            let state = &self.shared.lock().state;
            if !state.is_idle() {
                return Err(SessionError::InvalidState("can only start from idle state".into()));
            }
        }

        self.config.validate().map_err(SessionError::ConfigurationError)?;

        let available = self.source.analog_channel_count();
        if available < self.config.channel_count {
            return Err(SessionError::ConfigurationError(format!(
                "source has {} analog channels, {} requested",
                available, self.config.channel_count
            )));
        }

        // `created` is set when this session made the log file itself.
        let (sink, created): (Box<dyn LogSink>, Option<PathBuf>) = match self.sink.take() {
            Some(sink) => (sink, None),
            None => {
                let writer = CsvLogWriter::create(self.config.log_path.clone())
                    .map_err(|e| SessionError::ConfigurationError(format!("cannot open log: {}", e)))?;
                let sink: Box<dyn LogSink> = Box::new(writer);
                (sink, Some(self.config.log_path.clone()))
            }
        };
        let mut recorder = match SampleRecorder::start(sink, self.config.channel_count) {
            Ok(recorder) => recorder,
            Err(e) => {
                if let Some(path) = created {
                    discard_empty_log(&path);
                }
                return Err(e);
            }
        };

        log::info!(
            "Sampling {} channels every {}s, stopping after {}s without a transition",
            self.config.channel_count,
            self.config.delay_secs,
            self.config.quiescence_secs
        );
        self.set_state(SamplingState::Running {
            iteration: 0,
            cycle_count: 0,
        });

        let settle = self.config.settle_delay();
        let (reason, elapsed) = if !settle.is_zero() && !self.clock.sleep(settle, &self.stop) {
            (StopReason::Stopped, Duration::ZERO)
        } else {
            self.run_loop(&mut recorder)
        };

        Ok(self.finish(recorder, reason, elapsed))
    }

    /// Run the session on a dedicated thread.
    pub fn spawn(self) -> Result<RunningSession<S>, SessionError>
    where
        S: 'static,
    {
        if !self.shared.lock().state.is_idle() {
            return Err(SessionError::InvalidState("can only start from idle state".into()));
        }
        self.config.validate().map_err(SessionError::ConfigurationError)?;

        let stop = self.stop.clone();
        let shared = Arc::clone(&self.shared);
        let mut session = self;

        let handle = thread::Builder::new()
            .name("fatigue-sampling".into())
            .spawn(move || {
                let result = session.start();
                (session, result)
            })
            .map_err(|e| SessionError::InvalidState(format!("failed to spawn sampling thread: {}", e)))?;

        Ok(RunningSession { stop, shared, handle })
    }

    // --- Internal helpers ---

    /// The running state. Returns why the loop ended and how long it ran.
    fn run_loop(&mut self, recorder: &mut SampleRecorder) -> (StopReason, Duration) {
        let threshold = self.config.quiescence_threshold();
        let max_duration = self.config.max_duration();
        let channel_count = self.config.channel_count;

        let mut detector = CycleDetector::new();
        let mut timer = QuiescenceTimer::new(Arc::clone(&self.clock));
        let origin = self.clock.now();
        let mut iteration: u64 = 0;

        let reason = loop {
            let state = match self.source.read_binary() {
                Ok(state) => state,
                Err(e) => break StopReason::Failed(SessionError::device(ChannelId::Binary, e)),
            };
            let transitioned = detector.observe(state);
            if transitioned {
                timer.reset();
                log::debug!("Transition to {:?}, cycle {}", state, detector.current_count());
            }

            let time_secs = self.config.timestamp_for(iteration);
            let readings = match self.source.read_analog_all(channel_count) {
                Ok(readings) => readings,
                Err(e) => break StopReason::Failed(e),
            };

            let sample = Sample::new(iteration, time_secs, detector.current_count(), readings);
            if let Err(e) = recorder.record(sample) {
                break StopReason::Failed(e);
            }
            iteration += 1;

            // Only counts that reached the log are announced.
            if transitioned {
                if let Some(ref observer) = self.observer {
                    observer.on_transition(detector.current_count());
                }
            }

            self.update_progress(iteration, detector.current_count(), timer.elapsed());
            if let (Some(observer), Some(sample)) = (&self.observer, recorder.samples().last()) {
                observer.on_sample_recorded(sample);
            }

            // Sleep until the next slot on the iteration × delay grid.
            let next_slot = match self.config.slot_offset(iteration).and_then(|offset| origin.checked_add(offset)) {
                Some(slot) => slot,
                None => {
                    break StopReason::Failed(SessionError::InvalidState(format!(
                        "slot {} is beyond the clock range",
                        iteration
                    )))
                }
            };
            let now = self.clock.now();
            if now < next_slot {
                if !self.clock.sleep(next_slot - now, &self.stop) {
                    break StopReason::Stopped;
                }
            } else {
                log::warn!(
                    "Iteration {} overran the {}s interval by {:?}",
                    iteration - 1,
                    self.config.delay_secs,
                    now - next_slot
                );
                if self.stop.is_triggered() {
                    break StopReason::Stopped;
                }
            }

            self.update_progress(iteration, detector.current_count(), timer.elapsed());
            if timer.expired(threshold) {
                break StopReason::Quiescent;
            }
            if let Some(max) = max_duration {
                if self.clock.now().saturating_sub(origin) >= max {
                    break StopReason::MaxDuration;
                }
            }
        };

        let elapsed = self.clock.now().saturating_sub(origin);
        (reason, elapsed)
    }

    /// Single exit path for every way the loop can end.
    fn finish(&mut self, mut recorder: SampleRecorder, mut reason: StopReason, elapsed: Duration) -> SessionResult {
        match &reason {
            StopReason::Failed(err) => {
                log::error!("Sampling failed: {}", err);
                if let Some(ref observer) = self.observer {
                    observer.on_error(err);
                }
                self.set_state(SamplingState::Failed(err.clone()));
            }
            _ => self.set_state(SamplingState::Draining),
        }

        if let Err(e) = recorder.close() {
            if reason.is_failure() {
                log::error!("Log finalization also failed: {}", e);
            } else {
                log::error!("Log finalization failed: {}", e);
                if let Some(ref observer) = self.observer {
                    observer.on_error(&e);
                }
                reason = StopReason::Failed(e);
            }
        }

        let log_path = recorder.log_path();
        let checksum = log_path.as_deref().and_then(|path| match sha256_file(path) {
            Ok(checksum) => Some(checksum),
            Err(e) => {
                log::warn!("Could not checksum {}: {}", path.display(), e);
                None
            }
        });

        let final_state = self.snapshot();
        let elapsed_secs = elapsed.as_secs_f64();
        let mut metadata = SessionMetadata::new(&self.config, &reason, &final_state, elapsed_secs);
        metadata.log_file = log_path.as_ref().map(|p| p.to_string_lossy().into_owned());
        metadata.checksum = checksum.clone();

        if self.config.write_metadata {
            if let Some(ref path) = log_path {
                if let Err(e) = write_metadata(&metadata, path) {
                    log::warn!("Could not write metadata sidecar: {}", e);
                }
            }
        }

        let total_samples = recorder.len() as u64;
        self.samples = recorder.into_samples();

        let result = SessionResult {
            reason,
            final_state,
            total_samples,
            elapsed_secs,
            log_path,
            checksum,
            metadata,
        };

        log::info!(
            "Session closed ({}): {} cycles over {} samples in {:.1}s",
            result.reason,
            final_state.cycle_count,
            total_samples,
            elapsed_secs
        );

        self.set_state(SamplingState::Closed(Box::new(result.clone())));
        if let Some(ref observer) = self.observer {
            observer.on_session_closed(&result);
        }
        result
    }

    fn set_state(&self, new_state: SamplingState) {
        {
            let mut s = self.shared.lock();
            s.state = new_state.clone();
        }
        if let Some(ref observer) = self.observer {
            observer.on_state_changed(&new_state);
        }
    }

    /// Refresh counters without notifying observers.
    fn update_progress(&self, iteration: u64, cycle_count: u64, since_transition: Duration) {
        let mut s = self.shared.lock();
        s.progress = SessionState {
            cycle_count,
            time_since_last_transition: since_transition,
            iteration,
        };
        if s.state.is_running() {
            s.state = SamplingState::Running { iteration, cycle_count };
        }
    }
}

/// Remove a log this session created but never wrote a header to.
///
/// Only plain empty files are removed, so a device path such as
/// `/dev/full` is left alone.
fn discard_empty_log(path: &Path) {
    let empty_file = fs::metadata(path).map(|m| m.is_file() && m.len() == 0).unwrap_or(false);
    if empty_file {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("Could not remove empty log {}: {}", path.display(), e);
        }
    }
}

/// Handle to a session running on its own thread.
pub struct RunningSession<S: ChannelSource> {
    stop: StopSignal,
    shared: Arc<Mutex<SharedState>>,
    handle: thread::JoinHandle<(SamplingSession<S>, Result<SessionResult, SessionError>)>,
}

impl<S: ChannelSource> RunningSession<S> {
    /// Ask the loop to drain at its next sleep.
    pub fn stop(&self) {
        self.stop.trigger();
    }

    pub fn stop_handle(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn state(&self) -> SamplingState {
        self.shared.lock().state.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.shared.lock().progress
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to close. Returns the result and the session
    /// (for its samples and channel source).
    pub fn join(self) -> Result<(SessionResult, SamplingSession<S>), SessionError> {
        let (session, result) = self
            .handle
            .join()
            .map_err(|_| SessionError::InvalidState("sampling thread panicked".into()))?;
        result.map(|result| (result, session))
    }
}
