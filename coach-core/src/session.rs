//! # Practice Session Module
//!
//! The start/stop-controlled sampling loop. While running, a dedicated
//! worker thread repeatedly captures one audio block, detects the sounding
//! pitch classes, scores them against the current target chord, appends the
//! score to the shared history and publishes the result to registered
//! observers.
//!
//! ## Architecture
//! - **Caller thread**: owns the [`Session`] and issues `start`/`stop`;
//!   never blocked by audio acquisition.
//! - **Worker thread**: one per active run; builds its own capture source
//!   (CPAL streams do not cross threads) and polls a per-run cancellation
//!   token each iteration.
//! - **Shared state**: history, target chord name, observers and the last
//!   capture fault, each behind a mutex inside one `Arc`.
//!
//! The history belongs to the session, not to a run: stopping and starting
//! again continues the same trend rather than resetting it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::capture::{AudioSource, CaptureError, CpalSource};
use crate::chord;
use crate::detect::PitchDetector;
use crate::history::ScoreHistory;
use crate::score::match_score;

/// Whether a sampling loop is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No worker thread is running.
    Stopped,
    /// A worker thread is capturing and scoring.
    Running,
}

/// Receiver of per-iteration results, implemented by the presentation layer.
///
/// Callbacks run on the worker thread, once per loop iteration. The core
/// attaches no rendering semantics to the data.
pub trait Observer: Send {
    /// Called with the latest score and a consistent history snapshot
    /// (append order, oldest first).
    fn on_update(&mut self, score: f32, history: &[f32]);

    /// Called with the fault that terminated a run. Default: ignore.
    fn on_error(&mut self, _error: &CaptureError) {}
}

/// Fixed configuration for a session.
///
/// The defaults reproduce the reference setup; the magnitude threshold and
/// poll interval in particular are untuned conventions, not calibrated
/// physical constants, which is why they are fields rather than `const`s.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Requested capture sample rate in Hz. The capture source reports the
    /// rate the device actually selected, and analysis follows that report.
    pub sample_rate: u32,
    /// Duration of one captured audio block.
    pub block_duration: Duration,
    /// Maximum number of retained history entries.
    pub history_capacity: usize,
    /// Sleep between loop iterations; also the cancellation latency floor.
    pub poll_interval: Duration,
    /// Minimum spectral peak magnitude treated as a sounding note.
    pub magnitude_threshold: f32,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            sample_rate: 44_100,
            block_duration: Duration::from_millis(300),
            history_capacity: 150,
            poll_interval: Duration::from_millis(50),
            magnitude_threshold: 0.01,
        }
    }
}

/// State shared between the session handle and the worker thread.
struct Shared {
    target: Mutex<String>,
    history: Mutex<ScoreHistory>,
    observers: Mutex<Vec<Box<dyn Observer>>>,
    last_error: Mutex<Option<CaptureError>>,
}

impl Shared {
    /// Records a capture fault and fans it out to observers.
    fn report_error(&self, err: CaptureError) {
        for observer in self.observers.lock().unwrap().iter_mut() {
            observer.on_error(&err);
        }
        *self.last_error.lock().unwrap() = Some(err);
    }
}

/// Handle to one spawned sampling loop.
struct RunHandle {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// A chord practice session: the sampling-loop controller plus the state
/// that outlives individual runs.
///
/// ```no_run
/// use coach_core::{Session, SessionConfig};
///
/// let mut session = Session::new(SessionConfig::default());
/// session.start("Em");
/// // ... presentation layer polls latest_score()/history_snapshot() ...
/// session.stop();
/// ```
pub struct Session {
    config: SessionConfig,
    shared: Arc<Shared>,
    run: Option<RunHandle>,
}

impl Session {
    /// Creates a stopped session with an empty history.
    pub fn new(config: SessionConfig) -> Session {
        let history = ScoreHistory::new(config.history_capacity);
        Session {
            config,
            shared: Arc::new(Shared {
                target: Mutex::new(chord::DEFAULT_CHORD.to_string()),
                history: Mutex::new(history),
                observers: Mutex::new(Vec::new()),
                last_error: Mutex::new(None),
            }),
            run: None,
        }
    }

    /// Starts sampling against `chord_name` using the default microphone.
    ///
    /// Returns `true` if a new loop was spawned. If a run is already active
    /// this only retargets it (taking effect on its next iteration) and
    /// returns `false`; a second loop is never spawned. Device failures
    /// surface asynchronously through [`Observer::on_error`] and
    /// [`Session::take_error`], not from this call.
    pub fn start(&mut self, chord_name: &str) -> bool {
        let sample_rate = self.config.sample_rate;
        let block_duration = self.config.block_duration;
        self.start_with(chord_name, move || {
            CpalSource::open(sample_rate, block_duration)
        })
    }

    /// Starts sampling with a caller-supplied capture source.
    ///
    /// The constructor runs on the worker thread, which is what lets
    /// non-`Send` sources (like CPAL streams) be used. The pitch detector is
    /// built from the rate the source reports, not the configured request.
    /// Same idempotency contract as [`Session::start`].
    ///
    /// # Arguments
    /// * `chord_name` - Target chord; unknown names score against C major
    /// * `make_source` - Source constructor, invoked on the worker thread
    ///
    /// # Returns
    /// * `true` - A new sampling loop was spawned
    /// * `false` - A loop was already active; only the target was updated
    pub fn start_with<S, F>(&mut self, chord_name: &str, make_source: F) -> bool
    where
        S: AudioSource + 'static,
        F: FnOnce() -> Result<S, CaptureError> + Send + 'static,
    {
        self.set_target(chord_name);
        if self.is_running() {
            return false;
        }
        // Reap a run that already ended (stopped or faulted).
        if let Some(run) = self.run.take() {
            let _ = run.handle.join();
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let token = Arc::clone(&cancel);
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let handle = thread::spawn(move || run_loop(shared, config, token, make_source));
        self.run = Some(RunHandle { cancel, handle });
        true
    }

    /// Requests cancellation and waits for the worker to finish.
    ///
    /// Cancellation is cooperative: the wait is bounded by one block
    /// acquisition plus one poll interval. Stopping a stopped session is a
    /// no-op. The history is kept.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel.store(true, Ordering::Relaxed);
            let _ = run.handle.join();
        }
    }

    /// Whether a sampling loop is currently active.
    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|run| !run.handle.is_finished())
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        if self.is_running() {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }

    /// Replaces the target chord name. A running loop resolves the name
    /// afresh each iteration, so the change applies to the next block.
    /// Unknown names score against C major.
    pub fn set_target(&self, chord_name: &str) {
        *self.shared.target.lock().unwrap() = chord_name.to_string();
    }

    /// The currently selected target chord name.
    pub fn target(&self) -> String {
        self.shared.target.lock().unwrap().clone()
    }

    /// The most recent score, or 0.0 before any block has been scored.
    pub fn latest_score(&self) -> f32 {
        self.shared.history.lock().unwrap().latest().unwrap_or(0.0)
    }

    /// A consistent copy of the score history, oldest first.
    pub fn history_snapshot(&self) -> Vec<f32> {
        self.shared.history.lock().unwrap().snapshot()
    }

    /// Registers an observer. Takes effect from the next loop iteration.
    pub fn add_observer(&self, observer: Box<dyn Observer>) {
        self.shared.observers.lock().unwrap().push(observer);
    }

    /// Takes the fault that ended the last run, if any.
    pub fn take_error(&self) -> Option<CaptureError> {
        self.shared.last_error.lock().unwrap().take()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of the worker thread: capture, detect, score, publish, sleep.
fn run_loop<S, F>(
    shared: Arc<Shared>,
    config: SessionConfig,
    cancel: Arc<AtomicBool>,
    make_source: F,
) where
    S: AudioSource + 'static,
    F: FnOnce() -> Result<S, CaptureError>,
{
    let mut source = match make_source() {
        Ok(source) => source,
        Err(err) => {
            error!("failed to open audio source: {err}");
            shared.report_error(err);
            return;
        }
    };
    // Analysis must track the rate the device actually runs at, which may
    // differ from the configured request.
    let detector = PitchDetector::new(source.sample_rate(), config.magnitude_threshold);

    info!(chord = %shared.target.lock().unwrap(), "sampling loop started");

    while !cancel.load(Ordering::Relaxed) {
        let block = match source.capture_block() {
            Ok(block) => block,
            Err(err) => {
                error!("audio acquisition failed, stopping loop: {err}");
                shared.report_error(err);
                break;
            }
        };

        // Resolved per iteration so retargeting applies on the next block.
        let target_name = shared.target.lock().unwrap().clone();
        let target = chord::chord_notes(&target_name);

        let detected = detector.detect(&block);
        let score = match_score(detected, target);
        debug!(chord = %target_name, %detected, score, "scored block");

        let snapshot = {
            let mut history = shared.history.lock().unwrap();
            history.push(score);
            history.snapshot()
        };
        for observer in shared.observers.lock().unwrap().iter_mut() {
            observer.on_update(score, &snapshot);
        }

        thread::sleep(config.poll_interval);
    }

    info!("sampling loop stopped");
}
