//! The audio primitives a voice drives.
//!
//! The crate does not synthesize sound. A host supplies one [`VoiceOutput`]
//! per voice (an FM oscillator into a low-pass filter into an amplitude
//! envelope) and an [`EffectsOutput`] for the shared delay.

use crate::patch::EnvelopeParameters;

pub trait VoiceOutput: Send {
    fn set_frequency(&mut self, hz: f64);
    fn set_amplitude(&mut self, amplitude: f64);
    fn set_modulation_index(&mut self, index: f64);
    fn set_modulator_multiplier(&mut self, ratio: f64);
    fn set_cutoff(&mut self, hz: f64);
    fn set_resonance(&mut self, resonance: f64);

    /// Not every filter saturates.
    fn set_saturation(&mut self, _saturation: f64) {}

    fn open_gate(&mut self);
    fn close_gate(&mut self);

    fn apply_envelope(&mut self, envelope: &EnvelopeParameters);

    /// Seconds from gate close until the amplitude envelope is silent.
    fn release_duration(&self) -> f64;

    /// Cut the sound immediately.
    fn reset(&mut self);
}

pub trait EffectsOutput: Send {
    fn set_delay_time(&mut self, seconds: f64);
}

/// Output that discards everything. Useful when only allocation matters.
#[derive(Debug, Clone, Copy)]
pub struct NullOutput {
    release: f64,
}

impl NullOutput {
    pub fn new() -> Self {
        Self {
            release: EnvelopeParameters::default().release,
        }
    }
}

impl Default for NullOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceOutput for NullOutput {
    fn set_frequency(&mut self, _hz: f64) {}
    fn set_amplitude(&mut self, _amplitude: f64) {}
    fn set_modulation_index(&mut self, _index: f64) {}
    fn set_modulator_multiplier(&mut self, _ratio: f64) {}
    fn set_cutoff(&mut self, _hz: f64) {}
    fn set_resonance(&mut self, _resonance: f64) {}
    fn open_gate(&mut self) {}
    fn close_gate(&mut self) {}

    fn apply_envelope(&mut self, envelope: &EnvelopeParameters) {
        self.release = envelope.release.max(0.0);
    }

    fn release_duration(&self) -> f64 {
        self.release
    }

    fn reset(&mut self) {}
}

impl EffectsOutput for NullOutput {
    fn set_delay_time(&mut self, _seconds: f64) {}
}
