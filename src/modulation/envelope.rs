//! Modulation envelopes evaluated from elapsed time.

/*
ADSR From a Clock
=================

Modulation envelopes do not integrate a level sample by sample. A voice
keeps a clock per envelope (seconds since the gate last changed) and the
level is computed from that clock on every control tick. Nothing is cached,
so the value can't drift away from the shape.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

Gate open (clock t since note-on):

    t < A           t / A
    t < A + D       1 - (t - A) / D * (1 - S)
    otherwise       S

Gate closed (clock t since note-off, L = level captured at note-off):

    t < R           L * (1 - t / R)
    otherwise       0

Release starts from the CAPTURED level, not from S. Releasing during the
attack falls from wherever the attack had reached.

A stage of zero length is instantaneous: the level jumps straight to that
stage's target.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stage durations (seconds) and sustain level of a linear ADSR.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Adsr {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(0.0),
        }
    }

    /// Level at `time` seconds into the current gate phase.
    pub fn value(&self, time: f64, gate_open: bool, captured_level: f64) -> f64 {
        envelope_value(
            time,
            gate_open,
            self.attack,
            self.decay,
            self.sustain,
            self.release,
            captured_level,
        )
    }
}

/// Piecewise-linear ADSR level.
///
/// `captured_level` is only read while the gate is closed.
pub fn envelope_value(
    time: f64,
    gate_open: bool,
    attack: f64,
    decay: f64,
    sustain: f64,
    release: f64,
    captured_level: f64,
) -> f64 {
    if gate_open {
        if time < attack {
            if attack > 0.0 {
                time / attack
            } else {
                1.0
            }
        } else if time < attack + decay {
            let progress = if decay > 0.0 {
                (time - attack) / decay
            } else {
                1.0
            };
            1.0 - progress * (1.0 - sustain)
        } else {
            sustain
        }
    } else if time < release {
        let progress = if release > 0.0 { time / release } else { 1.0 };
        captured_level * (1.0 - progress)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_when_gate_opens() {
        let env = Adsr::new(0.1, 0.2, 0.5, 0.3);
        assert_eq!(env.value(0.0, true, 0.0), 0.0);
    }

    #[test]
    fn attack_peaks_then_decays_to_sustain() {
        let env = Adsr::new(0.1, 0.2, 0.5, 0.3);
        assert!((env.value(0.05, true, 0.0) - 0.5).abs() < 1e-12);
        assert!((env.value(0.1, true, 0.0) - 1.0).abs() < 1e-12);
        assert!((env.value(0.2, true, 0.0) - 0.75).abs() < 1e-12);
        assert!((env.value(0.3, true, 0.0) - 0.5).abs() < 1e-12);
        assert_eq!(env.value(10.0, true, 0.0), 0.5);
    }

    #[test]
    fn equals_sustain_at_end_of_decay() {
        for (a, d, s) in [(0.01, 0.2, 0.3), (0.5, 0.5, 0.9), (0.0, 0.1, 0.0)] {
            let env = Adsr::new(a, d, s, 0.1);
            assert!(
                (env.value(a + d, true, 0.0) - s).abs() < 1e-12,
                "attack {} decay {} should land on sustain {}",
                a,
                d,
                s
            );
        }
    }

    #[test]
    fn release_falls_from_captured_level() {
        let env = Adsr::new(0.1, 0.2, 0.5, 0.4);
        assert!((env.value(0.0, false, 0.8) - 0.8).abs() < 1e-12);
        assert!((env.value(0.2, false, 0.8) - 0.4).abs() < 1e-12);
        for captured in [0.0, 0.3, 1.0] {
            assert_eq!(env.value(0.4, false, captured), 0.0);
        }
        assert_eq!(env.value(3.0, false, 1.0), 0.0);
    }

    #[test]
    fn zero_length_stages_are_instant() {
        let env = Adsr::new(0.0, 0.0, 0.6, 0.0);
        assert_eq!(env.value(0.0, true, 0.0), 0.6);
        assert_eq!(env.value(0.0, false, 0.6), 0.0);

        let attack_only = Adsr::new(0.0, 0.1, 0.2, 0.1);
        assert_eq!(attack_only.value(0.0, true, 0.0), 1.0);
    }
}
