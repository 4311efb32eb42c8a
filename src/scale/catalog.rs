//! The 18 built-in scales: nine shapes, each in just and equal intonation.
//!
//! Just scales use rational ratios. Equal scales are derived from the same
//! semitone pattern as `2^(semitones / 12)`.

use super::{Celestial, Intonation, Scale, Terrestrial, NOTES_PER_SCALE};

struct ScaleShape {
    celestial: Celestial,
    terrestrial: Terrestrial,
    just_ratios: [(u32, u32); NOTES_PER_SCALE],
    semitones: [i32; NOTES_PER_SCALE],
    letters: [i32; NOTES_PER_SCALE],
}

const SHAPES: [ScaleShape; 9] = [
    ScaleShape {
        celestial: Celestial::Moon,
        terrestrial: Terrestrial::Orient,
        just_ratios: [(1, 1), (16, 15), (4, 3), (3, 2), (8, 5)],
        semitones: [0, 1, 5, 7, 8],
        letters: [0, 1, 3, 4, 5],
    },
    ScaleShape {
        celestial: Celestial::Moon,
        terrestrial: Terrestrial::Meridian,
        just_ratios: [(1, 1), (6, 5), (4, 3), (3, 2), (8, 5)],
        semitones: [0, 3, 5, 7, 8],
        letters: [0, 2, 3, 4, 5],
    },
    ScaleShape {
        celestial: Celestial::Moon,
        terrestrial: Terrestrial::Occident,
        just_ratios: [(1, 1), (6, 5), (4, 3), (3, 2), (9, 5)],
        semitones: [0, 3, 5, 7, 10],
        letters: [0, 2, 3, 4, 6],
    },
    ScaleShape {
        celestial: Celestial::Center,
        terrestrial: Terrestrial::Orient,
        just_ratios: [(1, 1), (5, 4), (4, 3), (3, 2), (8, 5)],
        semitones: [0, 4, 5, 7, 8],
        letters: [0, 2, 3, 4, 5],
    },
    ScaleShape {
        celestial: Celestial::Center,
        terrestrial: Terrestrial::Meridian,
        just_ratios: [(1, 1), (9, 8), (4, 3), (3, 2), (16, 9)],
        semitones: [0, 2, 5, 7, 10],
        letters: [0, 1, 3, 4, 6],
    },
    ScaleShape {
        celestial: Celestial::Center,
        terrestrial: Terrestrial::Occident,
        just_ratios: [(1, 1), (6, 5), (4, 3), (3, 2), (5, 3)],
        semitones: [0, 3, 5, 7, 9],
        letters: [0, 2, 3, 4, 5],
    },
    ScaleShape {
        celestial: Celestial::Sun,
        terrestrial: Terrestrial::Orient,
        just_ratios: [(1, 1), (5, 4), (4, 3), (3, 2), (15, 8)],
        semitones: [0, 4, 5, 7, 11],
        letters: [0, 2, 3, 4, 6],
    },
    ScaleShape {
        celestial: Celestial::Sun,
        terrestrial: Terrestrial::Meridian,
        just_ratios: [(1, 1), (5, 4), (4, 3), (3, 2), (5, 3)],
        semitones: [0, 4, 5, 7, 9],
        letters: [0, 2, 3, 4, 5],
    },
    ScaleShape {
        celestial: Celestial::Sun,
        terrestrial: Terrestrial::Occident,
        just_ratios: [(1, 1), (10, 9), (4, 3), (3, 2), (5, 3)],
        semitones: [0, 2, 5, 7, 9],
        letters: [0, 1, 3, 4, 5],
    },
];

fn celestial_name(c: Celestial) -> &'static str {
    match c {
        Celestial::Moon => "Moon",
        Celestial::Center => "Center",
        Celestial::Sun => "Sun",
    }
}

fn terrestrial_name(t: Terrestrial) -> &'static str {
    match t {
        Terrestrial::Occident => "Occident",
        Terrestrial::Meridian => "Meridian",
        Terrestrial::Orient => "Orient",
    }
}

fn build(shape: &ScaleShape, intonation: Intonation) -> Scale {
    let (notes, suffix) = match intonation {
        Intonation::Just => (
            shape
                .just_ratios
                .iter()
                .map(|&(num, den)| num as f64 / den as f64)
                .collect(),
            "JI",
        ),
        Intonation::Equal => (
            shape
                .semitones
                .iter()
                .map(|&step| 2.0_f64.powf(step as f64 / 12.0))
                .collect(),
            "ET",
        ),
    };

    Scale {
        name: format!(
            "{} {} ({})",
            celestial_name(shape.celestial),
            terrestrial_name(shape.terrestrial),
            suffix
        ),
        intonation,
        celestial: shape.celestial,
        terrestrial: shape.terrestrial,
        notes,
        rotation: 0,
        semitone_pattern: shape.semitones,
        letter_pattern: shape.letters,
    }
}

/// Every scale, just intonation first.
pub fn all() -> Vec<Scale> {
    [Intonation::Just, Intonation::Equal]
        .into_iter()
        .flat_map(|intonation| SHAPES.iter().map(move |shape| build(shape, intonation)))
        .collect()
}

/// Look up a scale by its three axes. The catalog covers every combination.
pub fn find(intonation: Intonation, celestial: Celestial, terrestrial: Terrestrial) -> Scale {
    let shape = SHAPES
        .iter()
        .find(|s| s.celestial == celestial && s.terrestrial == terrestrial)
        .unwrap_or(&SHAPES[4]);
    build(shape, intonation)
}
