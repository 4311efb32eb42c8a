//! Low Frequency Oscillator (LFO) waveforms and rate modes.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies. Here it never
produces sound: it is evaluated once per control tick and its value is fed
to the modulation router.

Vocabulary
----------

  control-rate    The modulation update loop (~200 Hz). LFOs advance their
                  phase once per tick: phase += frequency * delta_time.

  phase           Position inside one cycle, normalized to [0, 1).

  bipolar         Output swings -1.0 to +1.0. Every waveform below is
                  bipolar; amounts decide how far the destination moves.


Waveforms
---------

    SINE            sin(2π·phase)                   smooth, continuous
    TRIANGLE        -1 → +1 over the first half,    continuous
                    +1 → -1 over the second half
    SQUARE          +1 below phase 0.5, else -1     jumps at 0.5 and wrap
    SAWTOOTH        -1 → +1 across the cycle        jumps at wrap
    REVERSE SAW     +1 → -1 across the cycle        jumps at wrap


Reset Modes
-----------

FREE:    phase keeps running across notes. Each note catches the LFO at
         a different point.

TRIGGER: phase resets to 0 on every note-on. Every note gets the same
         modulation shape.

SYNC:    phase resets like TRIGGER and the rate follows the tempo.


Tempo Sync
----------

Sync values are "cycles per bar" (4 beats):

    rate_hz = (bpm / 60) * (cycles_per_bar / 4)

    at 120 BPM:   1/4  = 4 cycles per bar = 2 Hz
                  1    = 1 cycle per bar  = 0.5 Hz
                  4    = 1/4 cycle per bar = 0.125 Hz
*/

use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoWaveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
    ReverseSawtooth,
}

impl LfoWaveform {
    /// Bipolar waveform value at `phase`. Any phase is accepted and folded
    /// into [0, 1).
    #[inline]
    pub fn value(self, phase: f64) -> f64 {
        let phase = wrap_phase(phase);

        match self {
            LfoWaveform::Sine => (phase * TAU).sin(),
            LfoWaveform::Triangle => {
                if phase < 0.5 {
                    phase * 4.0 - 1.0
                } else {
                    3.0 - phase * 4.0
                }
            }
            LfoWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            LfoWaveform::Sawtooth => phase * 2.0 - 1.0,
            LfoWaveform::ReverseSawtooth => 1.0 - phase * 2.0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LfoWaveform::Sine => "Sine",
            LfoWaveform::Triangle => "Triangle",
            LfoWaveform::Square => "Square",
            LfoWaveform::Sawtooth => "Sawtooth",
            LfoWaveform::ReverseSawtooth => "Reverse Saw",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoResetMode {
    #[default]
    Free,
    Trigger,
    Sync,
}

impl LfoResetMode {
    /// Whether a note-on restarts the phase.
    pub fn resets_on_trigger(self) -> bool {
        matches!(self, LfoResetMode::Trigger | LfoResetMode::Sync)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoFrequencyMode {
    /// `frequency` is in Hz.
    #[default]
    Hertz,
    /// `frequency` is cycles per bar and follows the tempo.
    TempoSync,
}

/// Musical divisions for tempo-synced rates, as cycles per bar.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoSyncValue {
    ThirtySecond,
    Sixteenth,
    Eighth,
    Quarter,
    Half,
    #[default]
    Whole,
    TwoBars,
    FourBars,
}

impl LfoSyncValue {
    pub fn cycles_per_bar(self) -> f64 {
        match self {
            LfoSyncValue::ThirtySecond => 32.0,
            LfoSyncValue::Sixteenth => 16.0,
            LfoSyncValue::Eighth => 8.0,
            LfoSyncValue::Quarter => 4.0,
            LfoSyncValue::Half => 2.0,
            LfoSyncValue::Whole => 1.0,
            LfoSyncValue::TwoBars => 0.5,
            LfoSyncValue::FourBars => 0.25,
        }
    }

    pub fn frequency_hz(self, tempo_bpm: f64) -> f64 {
        tempo_synced_frequency(self.cycles_per_bar(), tempo_bpm)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LfoSyncValue::ThirtySecond => "1/32",
            LfoSyncValue::Sixteenth => "1/16",
            LfoSyncValue::Eighth => "1/8",
            LfoSyncValue::Quarter => "1/4",
            LfoSyncValue::Half => "1/2",
            LfoSyncValue::Whole => "1",
            LfoSyncValue::TwoBars => "2",
            LfoSyncValue::FourBars => "4",
        }
    }
}

/// Convert cycles per bar (4 beats) into Hz at `tempo_bpm`.
#[inline]
pub fn tempo_synced_frequency(cycles_per_bar: f64, tempo_bpm: f64) -> f64 {
    (tempo_bpm / 60.0) * (cycles_per_bar / 4.0)
}

/// Fold any phase into [0, 1).
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase - phase.floor();
    // floor can leave exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Advance `phase` by one control tick.
#[inline]
pub fn advance_phase(phase: f64, frequency_hz: f64, delta_time: f64) -> f64 {
    wrap_phase(phase + frequency_hz * delta_time)
}
