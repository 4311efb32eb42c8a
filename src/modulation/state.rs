//! Runtime modulation state, advanced once per control tick.

use super::{
    lfo::advance_phase,
    params::{GlobalLfoParameters, TouchAftertouchParameters},
};

/// Default filter smoothing factor (0 = none, approaching 1 = heavy).
pub const DEFAULT_FILTER_SMOOTHING: f64 = 0.85;

/// Per-voice modulation state.
///
/// Envelopes are stored as a gate flag plus a clock, never as a level, so
/// the envelope value is recomputed from the shape on every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulationState {
    pub modulator_envelope_time: f64,
    pub auxiliary_envelope_time: f64,
    pub is_gate_open: bool,

    /// Envelope levels captured when the gate closed; release ramps from here.
    pub modulator_captured_level: f64,
    pub auxiliary_captured_level: f64,

    /// Voice LFO phase in [0, 1).
    pub voice_lfo_phase: f64,
    pub voice_lfo_delay_timer: f64,
    /// Scales every voice LFO output, 0..1.
    pub voice_lfo_ramp_factor: f64,

    pub initial_touch_x: f64,
    pub current_touch_x: f64,

    pub current_frequency: f64,
    pub base_frequency: f64,
    pub base_amplitude: f64,
    pub base_filter_cutoff: f64,
    pub base_modulation_index: f64,
    pub base_modulator_multiplier: f64,

    /// `None` until the first cutoff after a trigger.
    pub last_smoothed_filter_cutoff: Option<f64>,
    pub filter_smoothing_factor: f64,
}

impl Default for ModulationState {
    fn default() -> Self {
        Self {
            modulator_envelope_time: 0.0,
            auxiliary_envelope_time: 0.0,
            is_gate_open: false,
            modulator_captured_level: 0.0,
            auxiliary_captured_level: 0.0,
            voice_lfo_phase: 0.0,
            voice_lfo_delay_timer: 0.0,
            voice_lfo_ramp_factor: 0.0,
            initial_touch_x: 0.0,
            current_touch_x: 0.0,
            current_frequency: 440.0,
            base_frequency: 440.0,
            base_amplitude: 0.5,
            base_filter_cutoff: 1200.0,
            base_modulation_index: 1.0,
            base_modulator_multiplier: 1.0,
            last_smoothed_filter_cutoff: None,
            filter_smoothing_factor: DEFAULT_FILTER_SMOOTHING,
        }
    }
}

impl ModulationState {
    /// Start a new note. Free-running LFOs keep their phase.
    pub fn reset(&mut self, frequency: f64, touch_x: f64, reset_lfo_phase: bool) {
        self.modulator_envelope_time = 0.0;
        self.auxiliary_envelope_time = 0.0;
        self.is_gate_open = true;
        self.modulator_captured_level = 0.0;
        self.auxiliary_captured_level = 0.0;

        if reset_lfo_phase {
            self.voice_lfo_phase = 0.0;
        }
        self.voice_lfo_delay_timer = 0.0;
        self.voice_lfo_ramp_factor = 0.0;

        let touch_x = touch_x.clamp(0.0, 1.0);
        self.initial_touch_x = touch_x;
        self.current_touch_x = touch_x;
        self.current_frequency = frequency;
        self.base_frequency = frequency;

        self.last_smoothed_filter_cutoff = None;
    }

    /// Close the gate, capturing the current envelope levels for release.
    pub fn close_gate(&mut self, modulator_value: f64, auxiliary_value: f64) {
        self.is_gate_open = false;
        self.modulator_captured_level = modulator_value;
        self.auxiliary_captured_level = auxiliary_value;
        self.modulator_envelope_time = 0.0;
        self.auxiliary_envelope_time = 0.0;
    }

    pub fn advance_envelopes(&mut self, delta_time: f64) {
        self.modulator_envelope_time += delta_time;
        self.auxiliary_envelope_time += delta_time;
    }

    pub fn advance_voice_lfo(&mut self, frequency_hz: f64, delta_time: f64) {
        self.voice_lfo_phase = advance_phase(self.voice_lfo_phase, frequency_hz, delta_time);
    }

    /// Ramp the voice LFO in linearly over `delay_time`; zero means instantly.
    pub fn update_voice_lfo_delay_ramp(&mut self, delta_time: f64, delay_time: f64) {
        self.voice_lfo_delay_timer += delta_time;

        self.voice_lfo_ramp_factor = if delay_time > 0.0 && self.voice_lfo_delay_timer < delay_time
        {
            self.voice_lfo_delay_timer / delay_time
        } else {
            1.0
        };
    }

    pub fn update_touch(&mut self, touch_x: f64) {
        self.current_touch_x = touch_x.clamp(0.0, 1.0);
    }

    pub fn aftertouch_delta(&self) -> f64 {
        TouchAftertouchParameters::delta(self.initial_touch_x, self.current_touch_x)
    }

    /// One-pole smoothing of the filter cutoff. The first value after a
    /// trigger passes straight through.
    pub fn smooth_filter_cutoff(&mut self, target: f64) -> f64 {
        let smoothed = match self.last_smoothed_filter_cutoff {
            Some(last) => {
                let factor = self.filter_smoothing_factor;
                last * factor + target * (1.0 - factor)
            }
            None => target,
        };
        self.last_smoothed_filter_cutoff = Some(smoothed);
        smoothed
    }
}

/// State of the LFO shared by every voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalModulationState {
    pub global_lfo_phase: f64,
    pub current_tempo: f64,
}

impl Default for GlobalModulationState {
    fn default() -> Self {
        Self {
            global_lfo_phase: 0.0,
            current_tempo: 120.0,
        }
    }
}

impl GlobalModulationState {
    pub fn advance(&mut self, params: &GlobalLfoParameters, delta_time: f64) {
        let frequency = params.actual_frequency(self.current_tempo);
        self.global_lfo_phase = advance_phase(self.global_lfo_phase, frequency, delta_time);
    }

    pub fn value(&self, params: &GlobalLfoParameters) -> f64 {
        params.raw_value(self.global_lfo_phase)
    }
}
