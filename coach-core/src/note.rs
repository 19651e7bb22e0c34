//! # Pitch Class Module
//!
//! Maps detected frequencies onto the 12 equal-tempered pitch classes and
//! provides a compact set type for collecting them. Octave information is
//! deliberately discarded: for chord matching only the note name matters.

use std::fmt;

/// Number of pitch classes in an octave.
pub const SEMITONES: usize = 12;

/// The twelve chromatic pitch classes, octave-independent.
///
/// Index 0 is C, following the MIDI note-number-mod-12 convention
/// (A4 = 440 Hz = MIDI note 69, and 69 mod 12 = 9 = A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    /// C
    C,
    /// C sharp / D flat
    Cs,
    /// D
    D,
    /// D sharp / E flat
    Ds,
    /// E
    E,
    /// F
    F,
    /// F sharp / G flat
    Fs,
    /// G
    G,
    /// G sharp / A flat
    Gs,
    /// A
    A,
    /// A sharp / B flat
    As,
    /// B
    B,
}

/// All pitch classes in chromatic order, used for index mapping and iteration.
const ALL: [PitchClass; SEMITONES] = [
    PitchClass::C,
    PitchClass::Cs,
    PitchClass::D,
    PitchClass::Ds,
    PitchClass::E,
    PitchClass::F,
    PitchClass::Fs,
    PitchClass::G,
    PitchClass::Gs,
    PitchClass::A,
    PitchClass::As,
    PitchClass::B,
];

impl PitchClass {
    /// Chromatic index of this class, 0 (C) through 11 (B).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Pitch class for a chromatic index. Indices wrap modulo 12.
    pub const fn from_index(index: usize) -> PitchClass {
        ALL[index % SEMITONES]
    }

    /// Maps a frequency in Hz to the nearest equal-tempered pitch class,
    /// referenced to A4 = 440 Hz.
    ///
    /// Returns `None` for silence or invalid estimates: zero, negative,
    /// NaN and infinite frequencies all normalize to "no pitch detected"
    /// rather than panicking.
    ///
    /// # Examples
    /// ```
    /// use coach_core::PitchClass;
    ///
    /// assert_eq!(PitchClass::from_frequency(440.0), Some(PitchClass::A));
    /// assert_eq!(PitchClass::from_frequency(0.0), None);
    /// ```
    pub fn from_frequency(freq: f32) -> Option<PitchClass> {
        if !freq.is_finite() || freq <= 0.0 {
            return None;
        }
        // Semitone offset from A4, shifted to the MIDI note number scale.
        let note_number = (12.0 * (freq / 440.0).log2()).round() as i64 + 69;
        Some(PitchClass::from_index(note_number.rem_euclid(12) as usize))
    }

    /// Conventional sharp spelling of the note name.
    pub const fn name(self) -> &'static str {
        const NAMES: [&str; SEMITONES] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        NAMES[self as usize]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of pitch classes, stored as a 12-bit mask.
///
/// This is the working currency of the pipeline: the detector produces one
/// per audio block and the scorer intersects it with a chord's set. The
/// fixed-width representation mirrors the 12-bin chroma arrays common in
/// chord-detection code and makes intersection a single `&`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    /// The empty set.
    pub const EMPTY: PitchClassSet = PitchClassSet(0);

    /// Builds a set from a slice of classes. Usable in `const` context,
    /// which keeps the static chord table free of runtime assembly.
    pub const fn of(classes: &[PitchClass]) -> PitchClassSet {
        let mut bits = 0u16;
        let mut i = 0;
        while i < classes.len() {
            bits |= 1 << classes[i].index();
            i += 1;
        }
        PitchClassSet(bits)
    }

    /// Adds a class to the set. Inserting a member again is a no-op.
    pub fn insert(&mut self, class: PitchClass) {
        self.0 |= 1 << class.index();
    }

    /// Whether the class is a member.
    pub const fn contains(self, class: PitchClass) -> bool {
        self.0 & (1 << class.index()) != 0
    }

    /// Number of distinct classes in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Classes present in both sets.
    pub const fn intersection(self, other: PitchClassSet) -> PitchClassSet {
        PitchClassSet(self.0 & other.0)
    }

    /// Classes present in either set.
    pub const fn union(self, other: PitchClassSet) -> PitchClassSet {
        PitchClassSet(self.0 | other.0)
    }

    /// Iterates members in chromatic order (C first).
    pub fn iter(self) -> impl Iterator<Item = PitchClass> {
        ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = PitchClass>>(iter: I) -> Self {
        let mut set = PitchClassSet::EMPTY;
        for class in iter {
            set.insert(class);
        }
        set
    }
}

impl fmt::Display for PitchClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for class in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{class}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_maps_to_a() {
        assert_eq!(PitchClass::from_frequency(440.0), Some(PitchClass::A));
    }

    #[test]
    fn middle_c_maps_to_c() {
        assert_eq!(PitchClass::from_frequency(261.63), Some(PitchClass::C));
    }

    #[test]
    fn non_positive_frequencies_map_to_none() {
        assert_eq!(PitchClass::from_frequency(0.0), None);
        assert_eq!(PitchClass::from_frequency(-5.0), None);
    }

    #[test]
    fn non_finite_frequencies_map_to_none() {
        assert_eq!(PitchClass::from_frequency(f32::NAN), None);
        assert_eq!(PitchClass::from_frequency(f32::INFINITY), None);
        assert_eq!(PitchClass::from_frequency(f32::NEG_INFINITY), None);
    }

    #[test]
    fn octave_shifts_map_to_the_same_class() {
        for &freq in &[55.0f32, 82.41, 110.0, 261.63, 440.0, 523.25, 784.0] {
            let base = PitchClass::from_frequency(freq);
            assert!(base.is_some());
            for k in -2i32..=3 {
                let shifted = freq * 2f32.powi(k);
                assert_eq!(
                    PitchClass::from_frequency(shifted),
                    base,
                    "octave shift of {freq} Hz by 2^{k}"
                );
            }
        }
    }

    #[test]
    fn set_insert_and_membership() {
        let mut set = PitchClassSet::EMPTY;
        assert!(set.is_empty());
        set.insert(PitchClass::E);
        set.insert(PitchClass::C);
        set.insert(PitchClass::E); // duplicate
        assert_eq!(set.len(), 2);
        assert!(set.contains(PitchClass::C));
        assert!(set.contains(PitchClass::E));
        assert!(!set.contains(PitchClass::G));
    }

    #[test]
    fn set_iterates_in_chromatic_order() {
        let set = PitchClassSet::of(&[PitchClass::G, PitchClass::C, PitchClass::E]);
        let collected: Vec<_> = set.iter().collect();
        assert_eq!(collected, vec![PitchClass::C, PitchClass::E, PitchClass::G]);
    }

    #[test]
    fn set_display_lists_names() {
        let set = PitchClassSet::of(&[PitchClass::Fs, PitchClass::D, PitchClass::A]);
        assert_eq!(set.to_string(), "D F# A");
    }

    #[test]
    fn intersection_and_union() {
        let c_major = PitchClassSet::of(&[PitchClass::C, PitchClass::E, PitchClass::G]);
        let e_minor = PitchClassSet::of(&[PitchClass::E, PitchClass::G, PitchClass::B]);
        assert_eq!(c_major.intersection(e_minor).len(), 2);
        assert_eq!(c_major.union(e_minor).len(), 4);
    }
}
