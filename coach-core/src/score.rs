//! # Chord Scoring Module
//!
//! Scores a detected pitch-class set against a target chord as the fraction
//! of the chord's notes that were heard. The measure is recall-only by
//! design: playing every chord note plus extra noise still scores 1.0, and
//! stray detections above the chord never pull the score down. Silence
//! scores 0.0 rather than being rewarded for matching nothing.

use crate::note::PitchClassSet;

/// Fraction of `target`'s pitch classes present in `detected`, in [0, 1].
///
/// An empty `detected` set scores 0.0. An empty `target` also scores 0.0;
/// the chord table never produces one, but the guard keeps the division
/// total.
pub fn match_score(detected: PitchClassSet, target: PitchClassSet) -> f32 {
    if detected.is_empty() || target.is_empty() {
        return 0.0;
    }
    detected.intersection(target).len() as f32 / target.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::PitchClass::*;

    const C_MAJOR: PitchClassSet = PitchClassSet::of(&[C, E, G]);

    #[test]
    fn empty_detection_scores_zero() {
        assert_eq!(match_score(PitchClassSet::EMPTY, C_MAJOR), 0.0);
    }

    #[test]
    fn exact_match_scores_one() {
        assert_eq!(match_score(C_MAJOR, C_MAJOR), 1.0);
        let g_major = PitchClassSet::of(&[G, B, D]);
        assert_eq!(match_score(g_major, g_major), 1.0);
    }

    #[test]
    fn partial_match_scores_the_recalled_fraction() {
        let detected = PitchClassSet::of(&[C, G]);
        let score = match_score(detected, C_MAJOR);
        assert!((score - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn extra_notes_are_ignored() {
        let detected = PitchClassSet::of(&[C, E, G, D]);
        assert_eq!(match_score(detected, C_MAJOR), 1.0);
    }

    #[test]
    fn score_never_decreases_as_detections_grow() {
        let mut detected = PitchClassSet::EMPTY;
        let mut previous = match_score(detected, C_MAJOR);
        for class in [D, C, Fs, E, A, G, B] {
            detected.insert(class);
            let score = match_score(detected, C_MAJOR);
            assert!(score >= previous, "score dropped after adding {class}");
            previous = score;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn empty_target_scores_zero() {
        let detected = PitchClassSet::of(&[C]);
        assert_eq!(match_score(detected, PitchClassSet::EMPTY), 0.0);
    }
}
