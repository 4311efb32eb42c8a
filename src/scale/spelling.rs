//! Note names for the scale degrees of a scale in a given key.
//!
//! Each degree is spelled with the letter the scale's letter pattern asks
//! for, then an accidental is picked so that letter hits the wanted pitch
//! class. This is why Center Orient in G♯ spells its third degree B♯
//! instead of C.

use std::fmt;

use super::{MusicalKey, Scale, NOTES_PER_SCALE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiatonicLetter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl DiatonicLetter {
    const ORDER: [DiatonicLetter; 7] = [
        DiatonicLetter::C,
        DiatonicLetter::D,
        DiatonicLetter::E,
        DiatonicLetter::F,
        DiatonicLetter::G,
        DiatonicLetter::A,
        DiatonicLetter::B,
    ];

    fn index(self) -> i32 {
        self as i32
    }

    /// Move up (or down) by diatonic steps, wrapping at seven.
    pub fn advanced(self, steps: i32) -> DiatonicLetter {
        Self::ORDER[(self.index() + steps).rem_euclid(7) as usize]
    }

    /// Pitch class of the unaltered letter, C = 0.
    pub fn natural_semitone(self) -> i32 {
        match self {
            DiatonicLetter::C => 0,
            DiatonicLetter::D => 2,
            DiatonicLetter::E => 4,
            DiatonicLetter::F => 5,
            DiatonicLetter::G => 7,
            DiatonicLetter::A => 9,
            DiatonicLetter::B => 11,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            DiatonicLetter::C => 'C',
            DiatonicLetter::D => 'D',
            DiatonicLetter::E => 'E',
            DiatonicLetter::F => 'F',
            DiatonicLetter::G => 'G',
            DiatonicLetter::A => 'A',
            DiatonicLetter::B => 'B',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "♭♭",
            Accidental::Flat => "♭",
            Accidental::Natural => "",
            Accidental::Sharp => "♯",
            Accidental::DoubleSharp => "♯♯",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    pub letter: DiatonicLetter,
    pub accidental: Accidental,
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter.as_char(), self.accidental.symbol())
    }
}

/// Spell pitch class `semitone` using `letter`.
///
/// Differences beyond a double accidental do not occur in the catalog; they
/// fall back to the nearest double accidental.
pub fn spell(semitone: i32, letter: DiatonicLetter) -> NoteName {
    let difference = (semitone - letter.natural_semitone()).rem_euclid(12);
    let accidental = match difference {
        0 => Accidental::Natural,
        1 => Accidental::Sharp,
        11 => Accidental::Flat,
        10 => Accidental::DoubleFlat,
        d if d < 6 => Accidental::DoubleSharp,
        _ => Accidental::DoubleFlat,
    };

    NoteName { letter, accidental }
}

/// Names of the five scale degrees (unrotated) in `key`.
pub fn note_names(scale: &Scale, key: MusicalKey) -> [NoteName; NOTES_PER_SCALE] {
    let root_letter = key.base_letter();
    let root_semitone = key.semitone_offset();

    std::array::from_fn(|i| {
        let letter = root_letter.advanced(scale.letter_pattern[i]);
        let semitone = (root_semitone + scale.semitone_pattern[i]).rem_euclid(12);
        spell(semitone, letter)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{catalog, Celestial, Intonation, Terrestrial};

    fn display(names: &[NoteName]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn center_meridian_in_d() {
        let scale = catalog::find(Intonation::Just, Celestial::Center, Terrestrial::Meridian);
        assert_eq!(
            display(&note_names(&scale, MusicalKey::D)),
            ["D", "E", "G", "A", "C"]
        );
    }

    #[test]
    fn center_meridian_in_a_flat() {
        let scale = catalog::find(Intonation::Just, Celestial::Center, Terrestrial::Meridian);
        assert_eq!(
            display(&note_names(&scale, MusicalKey::Ab)),
            ["A♭", "B♭", "D♭", "E♭", "G♭"]
        );
    }

    #[test]
    fn center_orient_in_d_and_g_sharp() {
        let scale = catalog::find(Intonation::Just, Celestial::Center, Terrestrial::Orient);
        assert_eq!(
            display(&note_names(&scale, MusicalKey::D)),
            ["D", "F♯", "G", "A", "B♭"]
        );
        assert_eq!(
            display(&note_names(&scale, MusicalKey::Gs)),
            ["G♯", "B♯", "C♯", "D♯", "E"]
        );
    }

    #[test]
    fn intonation_does_not_change_spelling() {
        let ji = catalog::find(Intonation::Just, Celestial::Sun, Terrestrial::Orient);
        let et = catalog::find(Intonation::Equal, Celestial::Sun, Terrestrial::Orient);
        assert_eq!(
            note_names(&ji, MusicalKey::Bb),
            note_names(&et, MusicalKey::Bb)
        );
    }

    #[test]
    fn letters_wrap_around() {
        assert_eq!(DiatonicLetter::C.advanced(0), DiatonicLetter::C);
        assert_eq!(DiatonicLetter::C.advanced(2), DiatonicLetter::E);
        assert_eq!(DiatonicLetter::C.advanced(7), DiatonicLetter::C);
        assert_eq!(DiatonicLetter::C.advanced(8), DiatonicLetter::D);
        assert_eq!(DiatonicLetter::C.advanced(-1), DiatonicLetter::B);
    }

    #[test]
    fn spelling_picks_sharps_and_flats() {
        assert_eq!(spell(1, DiatonicLetter::C).to_string(), "C♯");
        assert_eq!(spell(6, DiatonicLetter::F).to_string(), "F♯");
        assert_eq!(spell(10, DiatonicLetter::B).to_string(), "B♭");
        assert_eq!(spell(8, DiatonicLetter::A).to_string(), "A♭");
        assert_eq!(spell(2, DiatonicLetter::C).to_string(), "C♯♯");
    }
}
