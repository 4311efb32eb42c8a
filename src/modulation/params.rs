//! Modulation parameter templates.
//!
//! Every source has fixed destinations with one signed amount per
//! destination. The templates are owned by the pool and copied into voices;
//! they are read-only inputs to the router.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    envelope::Adsr,
    lfo::{tempo_synced_frequency, LfoFrequencyMode, LfoResetMode, LfoSyncValue, LfoWaveform},
};

/// Per-voice LFO. Each voice runs its own phase.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceLfoParameters {
    pub waveform: LfoWaveform,
    pub reset_mode: LfoResetMode,
    pub frequency_mode: LfoFrequencyMode,
    /// Hz, or cycles per bar in tempo-sync mode.
    pub frequency: f64,
    /// ± semitones.
    pub amount_to_oscillator_pitch: f64,
    /// ± octaves.
    pub amount_to_filter_frequency: f64,
    /// ± modulation index.
    pub amount_to_modulator_level: f64,
    /// Seconds to fade the LFO in after note-on.
    pub delay_time: f64,
    pub is_enabled: bool,
}

impl Default for VoiceLfoParameters {
    fn default() -> Self {
        Self {
            waveform: LfoWaveform::Sine,
            reset_mode: LfoResetMode::Free,
            frequency_mode: LfoFrequencyMode::Hertz,
            frequency: 5.0,
            amount_to_oscillator_pitch: 0.0,
            amount_to_filter_frequency: 0.0,
            amount_to_modulator_level: 0.0,
            delay_time: 0.0,
            is_enabled: true,
        }
    }
}

impl VoiceLfoParameters {
    pub fn has_active_destinations(&self) -> bool {
        self.amount_to_oscillator_pitch != 0.0
            || self.amount_to_filter_frequency != 0.0
            || self.amount_to_modulator_level != 0.0
    }

    /// Unmodulated rate in Hz at the given tempo.
    pub fn base_frequency(&self, tempo_bpm: f64) -> f64 {
        match self.frequency_mode {
            LfoFrequencyMode::Hertz => self.frequency,
            LfoFrequencyMode::TempoSync => tempo_synced_frequency(self.frequency, tempo_bpm),
        }
    }

    /// Raw bipolar value, zero while disabled.
    pub fn raw_value(&self, phase: f64) -> f64 {
        if self.is_enabled {
            self.waveform.value(phase)
        } else {
            0.0
        }
    }
}

/// Modulator envelope: shapes the FM modulation index only.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulatorEnvelopeParameters {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    pub amount_to_modulation_index: f64,
    pub is_enabled: bool,
}

impl Default for ModulatorEnvelopeParameters {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.2,
            sustain: 0.3,
            release: 0.1,
            amount_to_modulation_index: 0.0,
            is_enabled: true,
        }
    }
}

impl ModulatorEnvelopeParameters {
    pub fn adsr(&self) -> Adsr {
        Adsr::new(self.attack, self.decay, self.sustain, self.release)
    }

    pub fn has_active_destinations(&self) -> bool {
        self.amount_to_modulation_index != 0.0
    }
}

/// Auxiliary envelope: pitch, filter and vibrato depth.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxiliaryEnvelopeParameters {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    /// ± semitones.
    pub amount_to_oscillator_pitch: f64,
    /// ± octaves.
    pub amount_to_filter_frequency: f64,
    /// Scales the voice LFO pitch depth.
    pub amount_to_vibrato: f64,
    pub is_enabled: bool,
}

impl Default for AuxiliaryEnvelopeParameters {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.2,
            sustain: 0.5,
            release: 0.3,
            amount_to_oscillator_pitch: 0.0,
            amount_to_filter_frequency: 0.0,
            amount_to_vibrato: 0.0,
            is_enabled: true,
        }
    }
}

impl AuxiliaryEnvelopeParameters {
    pub fn adsr(&self) -> Adsr {
        Adsr::new(self.attack, self.decay, self.sustain, self.release)
    }

    pub fn has_active_destinations(&self) -> bool {
        self.amount_to_oscillator_pitch != 0.0
            || self.amount_to_filter_frequency != 0.0
            || self.amount_to_vibrato != 0.0
    }
}

/// Modulation from the distance between the note and A4.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyTrackingParameters {
    pub amount_to_filter_frequency: f64,
    pub amount_to_voice_lfo_frequency: f64,
    pub is_enabled: bool,
}

impl Default for KeyTrackingParameters {
    fn default() -> Self {
        Self {
            amount_to_filter_frequency: 0.0,
            amount_to_voice_lfo_frequency: 0.0,
            is_enabled: true,
        }
    }
}

impl KeyTrackingParameters {
    /// Reference pitch for key tracking.
    pub const REFERENCE_FREQUENCY: f64 = 440.0;

    pub fn has_active_destinations(&self) -> bool {
        self.amount_to_filter_frequency != 0.0 || self.amount_to_voice_lfo_frequency != 0.0
    }

    /// Octaves above (positive) or below (negative) A4.
    pub fn tracking_value(frequency: f64) -> f64 {
        (frequency / Self::REFERENCE_FREQUENCY).log2()
    }
}

/// Modulation from where the key was first touched (velocity-like).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchInitialParameters {
    /// Zero turns touch sensitivity off for amplitude.
    pub amount_to_oscillator_amplitude: f64,
    pub amount_to_mod_envelope: f64,
    pub amount_to_aux_env_pitch: f64,
    pub amount_to_aux_env_cutoff: f64,
    pub is_enabled: bool,
}

impl Default for TouchInitialParameters {
    fn default() -> Self {
        Self {
            amount_to_oscillator_amplitude: 0.0,
            amount_to_mod_envelope: 0.0,
            amount_to_aux_env_pitch: 0.0,
            amount_to_aux_env_cutoff: 0.0,
            is_enabled: true,
        }
    }
}

impl TouchInitialParameters {
    pub fn has_active_destinations(&self) -> bool {
        self.amount_to_oscillator_amplitude != 0.0
            || self.amount_to_mod_envelope != 0.0
            || self.amount_to_aux_env_pitch != 0.0
            || self.amount_to_aux_env_cutoff != 0.0
    }
}

/// Modulation from finger movement while the key is held.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchAftertouchParameters {
    /// ± octaves.
    pub amount_to_filter_frequency: f64,
    /// ± modulation index.
    pub amount_to_modulator_level: f64,
    /// Scales (and can create) voice LFO pitch depth.
    pub amount_to_vibrato: f64,
    pub is_enabled: bool,
}

impl Default for TouchAftertouchParameters {
    fn default() -> Self {
        Self {
            amount_to_filter_frequency: 0.0,
            amount_to_modulator_level: 0.0,
            amount_to_vibrato: 0.0,
            is_enabled: true,
        }
    }
}

impl TouchAftertouchParameters {
    pub fn has_active_destinations(&self) -> bool {
        self.amount_to_filter_frequency != 0.0
            || self.amount_to_modulator_level != 0.0
            || self.amount_to_vibrato != 0.0
    }

    /// Bipolar movement relative to the key center.
    ///
    /// Positive when the finger moved toward the center of the key since
    /// note-on, negative when it moved toward an edge. Both touch positions
    /// are normalized to [0, 1].
    pub fn delta(initial_touch_x: f64, current_touch_x: f64) -> f64 {
        let initial = (initial_touch_x.clamp(0.0, 1.0) - 0.5).abs();
        let current = (current_touch_x.clamp(0.0, 1.0) - 0.5).abs();
        ((initial - current) * 2.0).clamp(-1.0, 1.0)
    }
}

/// Complete per-voice modulation template.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoiceModulationParameters {
    pub modulator_envelope: ModulatorEnvelopeParameters,
    pub auxiliary_envelope: AuxiliaryEnvelopeParameters,
    pub voice_lfo: VoiceLfoParameters,
    pub key_tracking: KeyTrackingParameters,
    pub touch_initial: TouchInitialParameters,
    pub touch_aftertouch: TouchAftertouchParameters,
}

/// LFO shared by every voice. Lives in the pool.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalLfoParameters {
    pub waveform: LfoWaveform,
    /// `Free` or `Sync`; `Trigger` behaves like `Free` for the global LFO.
    pub reset_mode: LfoResetMode,
    pub frequency_mode: LfoFrequencyMode,
    /// Hz, used unless the LFO is tempo synced.
    pub frequency: f64,
    pub sync_value: LfoSyncValue,
    /// ± amplitude (tremolo).
    pub amount_to_oscillator_amplitude: f64,
    /// ± FM ratio.
    pub amount_to_modulator_multiplier: f64,
    /// ± octaves.
    pub amount_to_filter_frequency: f64,
    /// ± seconds.
    pub amount_to_delay_time: f64,
    pub is_enabled: bool,
}

impl Default for GlobalLfoParameters {
    fn default() -> Self {
        Self {
            waveform: LfoWaveform::Sine,
            reset_mode: LfoResetMode::Free,
            frequency_mode: LfoFrequencyMode::Hertz,
            frequency: 1.0,
            sync_value: LfoSyncValue::Whole,
            amount_to_oscillator_amplitude: 0.0,
            amount_to_modulator_multiplier: 0.0,
            amount_to_filter_frequency: 0.0,
            amount_to_delay_time: 0.0,
            is_enabled: true,
        }
    }
}

impl GlobalLfoParameters {
    pub fn has_active_destinations(&self) -> bool {
        self.amount_to_oscillator_amplitude != 0.0
            || self.amount_to_modulator_multiplier != 0.0
            || self.amount_to_filter_frequency != 0.0
            || self.amount_to_delay_time != 0.0
    }

    /// Rate in Hz; sync mode (or tempo-sync frequency mode) follows the tempo.
    pub fn actual_frequency(&self, tempo_bpm: f64) -> f64 {
        if self.reset_mode == LfoResetMode::Sync
            || self.frequency_mode == LfoFrequencyMode::TempoSync
        {
            self.sync_value.frequency_hz(tempo_bpm)
        } else {
            self.frequency
        }
    }

    pub fn raw_value(&self, phase: f64) -> f64 {
        if self.is_enabled {
            self.waveform.value(phase)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_every_destination_untouched() {
        let params = VoiceModulationParameters::default();
        assert!(!params.voice_lfo.has_active_destinations());
        assert!(!params.modulator_envelope.has_active_destinations());
        assert!(!params.auxiliary_envelope.has_active_destinations());
        assert!(!params.key_tracking.has_active_destinations());
        assert!(!params.touch_initial.has_active_destinations());
        assert!(!params.touch_aftertouch.has_active_destinations());
        assert!(!GlobalLfoParameters::default().has_active_destinations());
    }

    #[test]
    fn key_tracking_is_octaves_from_a4() {
        assert_eq!(KeyTrackingParameters::tracking_value(440.0), 0.0);
        assert!((KeyTrackingParameters::tracking_value(880.0) - 1.0).abs() < 1e-12);
        assert!((KeyTrackingParameters::tracking_value(110.0) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn aftertouch_delta_is_positive_toward_center() {
        assert!((TouchAftertouchParameters::delta(0.0, 0.5) - 1.0).abs() < 1e-12);
        assert!((TouchAftertouchParameters::delta(0.5, 1.0) + 1.0).abs() < 1e-12);
        assert_eq!(TouchAftertouchParameters::delta(0.3, 0.3), 0.0);
        assert_eq!(TouchAftertouchParameters::delta(0.25, 0.75), 0.0);
    }

    #[test]
    fn global_lfo_rate_follows_tempo_in_sync_mode() {
        let mut lfo = GlobalLfoParameters {
            frequency: 3.0,
            sync_value: LfoSyncValue::Quarter,
            ..Default::default()
        };
        assert_eq!(lfo.actual_frequency(120.0), 3.0);

        lfo.reset_mode = LfoResetMode::Sync;
        assert!((lfo.actual_frequency(120.0) - 2.0).abs() < 1e-12);
        assert!((lfo.actual_frequency(60.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn voice_lfo_tempo_sync_uses_cycles_per_bar() {
        let lfo = VoiceLfoParameters {
            frequency_mode: LfoFrequencyMode::TempoSync,
            frequency: 8.0,
            ..Default::default()
        };
        assert!((lfo.base_frequency(90.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn disabled_lfo_outputs_zero() {
        let lfo = VoiceLfoParameters {
            waveform: LfoWaveform::Square,
            is_enabled: false,
            ..Default::default()
        };
        assert_eq!(lfo.raw_value(0.1), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn template_deserializes_from_json() {
        let original = VoiceModulationParameters {
            voice_lfo: VoiceLfoParameters {
                amount_to_oscillator_pitch: 0.5,
                waveform: LfoWaveform::Triangle,
                ..Default::default()
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&original).expect("serialize");
        assert!(json.contains("\"amount_to_oscillator_pitch\":0.5"));
        let parsed: VoiceModulationParameters = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.voice_lfo.waveform, LfoWaveform::Triangle);
    }
}
