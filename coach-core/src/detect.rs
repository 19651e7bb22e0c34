//! # Pitch Detection Module
//!
//! Turns one captured audio block into the set of pitch classes sounding in
//! it. Each analysis frame contributes at most its single strongest spectral
//! peak; frames whose peak magnitude falls below the noise threshold
//! contribute nothing. The block's result is the union over all frames.
//!
//! One dominant peak per frame is a deliberately cheap stand-in for real
//! polyphonic transcription. It is adequate for a strummed chord: the strings
//! sound at slightly different instants, so across a 0.3 s block different
//! frames are dominated by different notes.

use crate::note::{PitchClass, PitchClassSet};
use crate::spectrum::SpectralAnalyzer;

/// Frame-wise dominant-peak pitch-class detector.
pub struct PitchDetector {
    analyzer: SpectralAnalyzer,
    magnitude_threshold: f32,
}

impl PitchDetector {
    /// Creates a detector for the given sample rate.
    ///
    /// # Arguments
    /// * `sample_rate` - Rate of the blocks this detector will analyse, in
    ///   Hz; must match the capture source's reported rate
    /// * `magnitude_threshold` - Dominant peaks below this magnitude are
    ///   treated as silence
    pub fn new(sample_rate: u32, magnitude_threshold: f32) -> PitchDetector {
        PitchDetector {
            analyzer: SpectralAnalyzer::new(sample_rate),
            magnitude_threshold,
        }
    }

    /// Extracts the pitch classes present in `block`.
    ///
    /// Only presence matters: how many frames a class dominated is not
    /// recorded. A silent or too-quiet block yields the empty set.
    pub fn detect(&self, block: &[f32]) -> PitchClassSet {
        let mut detected = PitchClassSet::EMPTY;
        for peak in self.analyzer.dominant_peaks(block) {
            if peak.magnitude < self.magnitude_threshold {
                continue;
            }
            if let Some(class) = PitchClass::from_frequency(peak.frequency) {
                detected.insert(class);
            }
        }
        detected
    }
}
