//! Base (unmodulated) voice parameters.
//!
//! These are the values the user dials in. Modulation is applied on top of
//! them every control tick; they are never overwritten by modulation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::modulation::{GlobalLfoParameters, VoiceModulationParameters};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParameters {
    /// 0..1
    pub amplitude: f64,
    /// FM modulation index, 0..10
    pub modulation_index: f64,
    /// FM ratio, 0.1..20
    pub modulator_multiplier: f64,
}

impl Default for OscillatorParameters {
    fn default() -> Self {
        Self {
            amplitude: 0.5,
            modulation_index: 1.0,
            modulator_multiplier: 1.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParameters {
    pub cutoff_hz: f64,
    pub resonance: f64,
    pub saturation: f64,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            cutoff_hz: 1200.0,
            resonance: 0.0,
            saturation: 0.0,
        }
    }
}

/// Amplitude envelope, handed to the voice output as-is.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParameters {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

/// Everything needed to recreate a sound.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoicePatch {
    pub oscillator: OscillatorParameters,
    pub filter: FilterParameters,
    pub envelope: EnvelopeParameters,
    pub modulation: VoiceModulationParameters,
    pub global_lfo: GlobalLfoParameters,
    /// Base delay time of the shared effect, seconds.
    pub delay_time: f64,
}

impl Default for VoicePatch {
    fn default() -> Self {
        Self {
            oscillator: OscillatorParameters::default(),
            filter: FilterParameters::default(),
            envelope: EnvelopeParameters::default(),
            modulation: VoiceModulationParameters::default(),
            global_lfo: GlobalLfoParameters::default(),
            delay_time: 0.5,
        }
    }
}
