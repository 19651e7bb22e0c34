//! # Chord Table Module
//!
//! The static mapping from chord names to pitch-class sets. The table is
//! fixed configuration: built once at first use, validated, and never
//! mutated at runtime. Lookups for unknown names fall back to C major so a
//! mistyped chord keeps the sampling loop scoring instead of failing.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::debug;

use crate::note::{PitchClass, PitchClassSet};

/// Name of the chord used when a lookup fails.
pub const DEFAULT_CHORD: &str = "C";

/// C major, the fallback target for unknown chord names.
const FALLBACK: PitchClassSet =
    PitchClassSet::of(&[PitchClass::C, PitchClass::E, PitchClass::G]);

/// Static chord table covering the common open guitar chords.
///
/// A `BTreeMap` keeps `names()` in a stable alphabetical order for display.
static CHORD_TABLE: Lazy<BTreeMap<&'static str, PitchClassSet>> = Lazy::new(|| {
    use PitchClass::*;

    let table = BTreeMap::from([
        ("A", PitchClassSet::of(&[A, Cs, E])),
        ("Am", PitchClassSet::of(&[A, C, E])),
        ("C", PitchClassSet::of(&[C, E, G])),
        ("D", PitchClassSet::of(&[D, Fs, A])),
        ("Dm", PitchClassSet::of(&[D, F, A])),
        ("E", PitchClassSet::of(&[E, Gs, B])),
        ("Em", PitchClassSet::of(&[E, G, B])),
        ("F", PitchClassSet::of(&[F, A, C])),
        ("G", PitchClassSet::of(&[G, B, D])),
    ]);

    // Load-time validation: a chord with no notes would make every score 0.
    assert!(
        table.values().all(|set| !set.is_empty()),
        "chord table contains an empty pitch-class set"
    );
    assert!(table.contains_key(DEFAULT_CHORD));

    table
});

/// Looks a chord name up in the table.
pub fn lookup(name: &str) -> Option<PitchClassSet> {
    CHORD_TABLE.get(name).copied()
}

/// Resolves a chord name to its pitch-class set, falling back to C major
/// for names the table does not know.
pub fn chord_notes(name: &str) -> PitchClassSet {
    match lookup(name) {
        Some(set) => set,
        None => {
            debug!(chord = name, "unknown chord name, scoring against C major");
            FALLBACK
        }
    }
}

/// All chord names the table knows, in alphabetical order.
pub fn names() -> impl Iterator<Item = &'static str> {
    CHORD_TABLE.keys().copied()
}
