// coach-core/src/lib.rs

//! The core logic for the chord practice coach.
//! This crate owns the real-time pipeline: microphone capture, spectral
//! pitch extraction, chord-match scoring and the bounded score history,
//! all driven by a start/stop-controlled sampling loop. It is completely
//! headless and contains no rendering code; a presentation layer consumes
//! it through [`Session`] and the [`Observer`] trait.

pub mod capture;
pub mod chord;
pub mod detect;
pub mod history;
pub mod note;
pub mod score;
pub mod session;
pub mod spectrum;

pub use capture::{AudioSource, CaptureError, CpalSource};
pub use detect::PitchDetector;
pub use history::ScoreHistory;
pub use note::{PitchClass, PitchClassSet};
pub use score::match_score;
pub use session::{Observer, RunState, Session, SessionConfig};
