//! Pentatonic scales, musical-key transposition and key frequency layout.

/*
Keyboard Layout
===============

The instrument has 18 keys. Every scale has five notes, expressed as
frequency ratios relative to the tonic (1.0 == 1/1). The keys are filled
with those five ratios repeated over four octaves, the last group cut
short:

    keys  0..5    ratios x 1
    keys  5..10   ratios x 2
    keys 10..15   ratios x 4
    keys 15..18   first three ratios x 8

Rotation
--------

Rotation picks which scale degree lands on the lowest key. Notes that
wrap around move an octave:

    rotation +1   [1, 9/8, 4/3, 3/2, 16/9] -> [9/8, 4/3, 3/2, 16/9, 2]
    rotation -1   [1, 9/8, 4/3, 3/2, 16/9] -> [8/9, 1, 9/8, 4/3, 3/2]

Transposition
-------------

Each musical key carries one factor per intonation system. Transposition
is always absolute: the factor of the target key multiplies the base
frequency, never the previous result. D is the center key with a factor of
exactly 1.0, so coming back to D after any walk through the keys yields the
base frequency again.
*/

pub mod catalog;
pub mod spelling;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use spelling::{note_names, DiatonicLetter, NoteName};

/// Number of physical keys on the keyboard.
pub const KEY_COUNT: usize = 18;

/// Notes per scale.
pub const NOTES_PER_SCALE: usize = 5;

/// Allowed rotation range (inclusive).
pub const MIN_ROTATION: i8 = -2;
pub const MAX_ROTATION: i8 = 2;

/// Group sizes and octave multipliers used to spread five notes over 18 keys.
const KEY_GROUPS: [(usize, f64); 4] = [(5, 1.0), (5, 2.0), (5, 4.0), (3, 8.0)];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intonation {
    /// Rational frequency ratios.
    Just,
    /// Twelve-tone equal temperament.
    Equal,
}

impl Intonation {
    pub fn label(self) -> &'static str {
        match self {
            Intonation::Just => "JUST",
            Intonation::Equal => "EQUAL",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Celestial {
    Moon,
    Center,
    Sun,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrestrial {
    Occident,
    Meridian,
    Orient,
}

/// The 13 transposition keys, ordered from lowest to highest in the
/// circle-of-fifths walk the instrument exposes (non-looping).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicalKey {
    Ab,
    Eb,
    Bb,
    F,
    C,
    G,
    D,
    A,
    E,
    B,
    Fs,
    Cs,
    Gs,
}

impl MusicalKey {
    pub const ALL: [MusicalKey; 13] = [
        MusicalKey::Ab,
        MusicalKey::Eb,
        MusicalKey::Bb,
        MusicalKey::F,
        MusicalKey::C,
        MusicalKey::G,
        MusicalKey::D,
        MusicalKey::A,
        MusicalKey::E,
        MusicalKey::B,
        MusicalKey::Fs,
        MusicalKey::Cs,
        MusicalKey::Gs,
    ];

    /// The center key. Its pitch factor is exactly 1.0 in both systems.
    pub const CENTER: MusicalKey = MusicalKey::D;

    /// Base frequency of the center key (D3) in Hz.
    pub const BASE_FREQUENCY: f64 = 146.83;

    /// Display label, e.g. "A♭" or "F♯".
    pub fn label(self) -> &'static str {
        match self {
            MusicalKey::Ab => "A♭",
            MusicalKey::Eb => "E♭",
            MusicalKey::Bb => "B♭",
            MusicalKey::F => "F",
            MusicalKey::C => "C",
            MusicalKey::G => "G",
            MusicalKey::D => "D",
            MusicalKey::A => "A",
            MusicalKey::E => "E",
            MusicalKey::B => "B",
            MusicalKey::Fs => "F♯",
            MusicalKey::Cs => "C♯",
            MusicalKey::Gs => "G♯",
        }
    }

    /// Chromatic pitch class of the key's root, C = 0.
    pub fn semitone_offset(self) -> i32 {
        match self {
            MusicalKey::C => 0,
            MusicalKey::Cs => 1,
            MusicalKey::D => 2,
            MusicalKey::Eb => 3,
            MusicalKey::E => 4,
            MusicalKey::F => 5,
            MusicalKey::Fs => 6,
            MusicalKey::G => 7,
            MusicalKey::Gs | MusicalKey::Ab => 8,
            MusicalKey::A => 9,
            MusicalKey::Bb => 10,
            MusicalKey::B => 11,
        }
    }

    /// Diatonic letter used to spell the key's root.
    pub fn base_letter(self) -> DiatonicLetter {
        match self {
            MusicalKey::C | MusicalKey::Cs => DiatonicLetter::C,
            MusicalKey::D => DiatonicLetter::D,
            MusicalKey::E | MusicalKey::Eb => DiatonicLetter::E,
            MusicalKey::F | MusicalKey::Fs => DiatonicLetter::F,
            MusicalKey::G | MusicalKey::Gs => DiatonicLetter::G,
            MusicalKey::A | MusicalKey::Ab => DiatonicLetter::A,
            MusicalKey::B | MusicalKey::Bb => DiatonicLetter::B,
        }
    }

    /// Transposition in semitones relative to the center key, kept within
    /// half an octave of D.
    pub fn transposition_semitones(self) -> i32 {
        match self {
            MusicalKey::Ab => -6,
            MusicalKey::Eb => 1,
            MusicalKey::Bb => -4,
            MusicalKey::F => 3,
            MusicalKey::C => -2,
            MusicalKey::G => 5,
            MusicalKey::D => 0,
            MusicalKey::A => -5,
            MusicalKey::E => 2,
            MusicalKey::B => -3,
            MusicalKey::Fs => 4,
            MusicalKey::Cs => -1,
            MusicalKey::Gs => 6,
        }
    }

    pub fn pitch_factor_equal(self) -> f64 {
        match self {
            MusicalKey::D => 1.0,
            other => 2.0_f64.powf(other.transposition_semitones() as f64 / 12.0),
        }
    }

    /// Pythagorean factors: stacked 3/2 fifths folded back around D.
    pub fn pitch_factor_just(self) -> f64 {
        match self {
            MusicalKey::Ab => 512.0 / 729.0,
            MusicalKey::Eb => 256.0 / 243.0,
            MusicalKey::Bb => 64.0 / 81.0,
            MusicalKey::F => 32.0 / 27.0,
            MusicalKey::C => 8.0 / 9.0,
            MusicalKey::G => 4.0 / 3.0,
            MusicalKey::D => 1.0,
            MusicalKey::A => 3.0 / 4.0,
            MusicalKey::E => 9.0 / 8.0,
            MusicalKey::B => 27.0 / 32.0,
            MusicalKey::Fs => 81.0 / 64.0,
            MusicalKey::Cs => 243.0 / 256.0,
            MusicalKey::Gs => 729.0 / 512.0,
        }
    }

    pub fn pitch_factor(self, intonation: Intonation) -> f64 {
        match intonation {
            Intonation::Just => self.pitch_factor_just(),
            Intonation::Equal => self.pitch_factor_equal(),
        }
    }

    /// Neighbouring key in the walk, or `None` past either end.
    pub fn step(self, offset: isize) -> Option<MusicalKey> {
        let index = Self::ALL.iter().position(|&k| k == self)? as isize + offset;
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

impl Default for MusicalKey {
    fn default() -> Self {
        MusicalKey::CENTER
    }
}

/// A five-note scale as tonic-relative frequency ratios.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    pub name: String,
    pub intonation: Intonation,
    pub celestial: Celestial,
    pub terrestrial: Terrestrial,
    /// Ascending ratios, `notes[0] == 1.0`.
    pub notes: Vec<f64>,
    /// Which degree lands on the lowest key, in `MIN_ROTATION..=MAX_ROTATION`.
    pub rotation: i8,
    /// Semitones above the tonic, display only.
    pub semitone_pattern: [i32; NOTES_PER_SCALE],
    /// Diatonic letter steps above the tonic, display only.
    pub letter_pattern: [i32; NOTES_PER_SCALE],
}

impl Scale {
    /// Same scale with a different rotation, clamped to the allowed range.
    pub fn with_rotation(mut self, rotation: i8) -> Self {
        self.rotation = rotation.clamp(MIN_ROTATION, MAX_ROTATION);
        self
    }

    /// Ratios after rotation, see [`rotate_ratios`].
    pub fn rotated_notes(&self) -> Vec<f64> {
        rotate_ratios(&self.notes, self.rotation)
    }
}

/// Reorder scale ratios so the note at `rotation` becomes the first one.
///
/// Notes that wrap past the top are doubled, notes that wrap below the
/// bottom are halved.
pub fn rotate_ratios(notes: &[f64], rotation: i8) -> Vec<f64> {
    let count = notes.len();
    if rotation == 0 || count == 0 {
        return notes.to_vec();
    }

    let shift = rotation.unsigned_abs() as usize % count;

    if rotation > 0 {
        (0..count)
            .map(|i| {
                let source = (i + shift) % count;
                if source < shift {
                    notes[source] * 2.0
                } else {
                    notes[source]
                }
            })
            .collect()
    } else {
        (0..count)
            .map(|i| {
                let source = (i + count - shift) % count;
                if source >= count - shift {
                    notes[source] / 2.0
                } else {
                    notes[source]
                }
            })
            .collect()
    }
}

/// Expand a scale into the absolute frequencies of all 18 keys.
///
/// # Panics
///
/// Panics if the scale does not contain exactly five ratios. Scales come
/// from the static catalog, so a wrong count is a data error.
pub fn make_key_frequencies(
    scale: &Scale,
    base_frequency: f64,
    key: MusicalKey,
) -> [f64; KEY_COUNT] {
    assert!(
        scale.notes.len() == NOTES_PER_SCALE,
        "scale '{}' must be pentatonic, got {} notes",
        scale.name,
        scale.notes.len()
    );

    let transposed_base = base_frequency * key.pitch_factor(scale.intonation);
    let rotated = scale.rotated_notes();

    let mut frequencies = [0.0; KEY_COUNT];
    let mut slot = 0;
    for (group_size, multiplier) in KEY_GROUPS {
        for ratio in &rotated[..group_size] {
            frequencies[slot] = ratio * transposed_base * multiplier;
            slot += 1;
        }
    }
    debug_assert_eq!(slot, KEY_COUNT);

    frequencies
}
