use crate::{
    modulation::{
        router::{self, Source},
        GlobalLfoParameters, KeyTrackingParameters, ModulationState, VoiceModulationParameters,
    },
    patch::{EnvelopeParameters, FilterParameters, OscillatorParameters},
    synth::backend::VoiceOutput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Available for allocation
    Sounding,  // Gate open, owned by a key
    Releasing, // Gate closed, envelope decaying
}

/// Shared inputs for one control tick.
#[derive(Debug, Clone, Copy)]
pub struct TickCtx {
    pub delta_time: f64,
    pub tempo_bpm: f64,
    pub global_lfo: GlobalLfoParameters,
    /// Current global LFO output, already zero when disabled.
    pub global_lfo_value: f64,
}

/// Values pushed to the output on the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoiceParameters {
    pub frequency: f64,
    pub amplitude: f64,
    pub modulation_index: f64,
    pub modulator_multiplier: f64,
    pub cutoff: f64,
}

/// One sounding unit: an audio output plus its modulation state.
pub struct Voice<O: VoiceOutput> {
    index: usize,
    state: VoiceState,
    owner: Option<usize>,
    generation: u64,
    trigger_time: f64,
    modulation: ModulationState,
    template: VoiceModulationParameters,
    last_applied: VoiceParameters,
    output: O,
}

impl<O: VoiceOutput> Voice<O> {
    pub fn new(index: usize, output: O) -> Self {
        Self {
            index,
            state: VoiceState::Idle,
            owner: None,
            generation: 0,
            trigger_time: 0.0,
            modulation: ModulationState::default(),
            template: VoiceModulationParameters::default(),
            last_applied: VoiceParameters::default(),
            output,
        }
    }

    /// Start a note. Bumps the generation so any pending idle transition
    /// scheduled for an earlier note no longer applies.
    pub fn trigger(&mut self, frequency: f64, touch_x: f64, now: f64, owner: usize) {
        let reset_phase = self.template.voice_lfo.reset_mode.resets_on_trigger();
        self.modulation.reset(frequency, touch_x, reset_phase);

        self.generation = self.generation.wrapping_add(1);
        self.trigger_time = now;
        self.owner = Some(owner);
        self.state = VoiceState::Sounding;

        self.output.reset();
        self.output.set_frequency(frequency);
        self.output.open_gate();
        self.last_applied.frequency = frequency;
    }

    /// Close the gate and return how long the release takes.
    pub fn release(&mut self) -> f64 {
        let (modulator, auxiliary) = self.envelope_levels();
        self.modulation.close_gate(modulator, auxiliary);
        self.output.close_gate();

        self.owner = None;
        self.state = VoiceState::Releasing;
        self.output.release_duration().max(0.0)
    }

    /// Complete a release scheduled for `generation`. Returns false when the
    /// voice was retriggered or stopped in the meantime.
    pub fn finish_release(&mut self, generation: u64) -> bool {
        if self.state != VoiceState::Releasing || self.generation != generation {
            return false;
        }
        self.state = VoiceState::Idle;
        true
    }

    /// Silence immediately, skipping the release.
    pub fn stop(&mut self) {
        self.modulation.is_gate_open = false;
        self.output.close_gate();
        self.output.reset();

        self.generation = self.generation.wrapping_add(1);
        self.owner = None;
        self.state = VoiceState::Idle;
    }

    pub fn update_touch(&mut self, touch_x: f64) {
        self.modulation.update_touch(touch_x);
    }

    /// Advance modulation by one control tick and push the results.
    pub fn tick(&mut self, ctx: &TickCtx) {
        if self.state == VoiceState::Idle {
            return;
        }

        let dt = ctx.delta_time;
        let params = self.template;
        let vlfo = params.voice_lfo;

        self.modulation.advance_envelopes(dt);

        let tracking = params.key_tracking;
        let key_track = if tracking.is_enabled && tracking.has_active_destinations() {
            KeyTrackingParameters::tracking_value(self.modulation.current_frequency)
        } else {
            0.0
        };

        let lfo_frequency = router::voice_lfo_frequency(
            vlfo.base_frequency(ctx.tempo_bpm),
            Source::new(key_track, params.key_tracking.amount_to_voice_lfo_frequency),
        );
        self.modulation.advance_voice_lfo(lfo_frequency, dt);
        self.modulation.update_voice_lfo_delay_ramp(dt, vlfo.delay_time);

        // Sources without destinations contribute nothing; skip evaluating them.
        let (mod_env, aux_env) = self.envelope_levels();
        let mod_env = if params.modulator_envelope.has_active_destinations() {
            mod_env
        } else {
            0.0
        };
        let aux_env = if params.auxiliary_envelope.has_active_destinations() {
            aux_env
        } else {
            0.0
        };
        let lfo = if vlfo.has_active_destinations() {
            vlfo.raw_value(self.modulation.voice_lfo_phase)
        } else {
            0.0
        };
        let ramp = self.modulation.voice_lfo_ramp_factor;

        let aftertouch = &params.touch_aftertouch;
        let aftertouch = if aftertouch.is_enabled && aftertouch.has_active_destinations() {
            self.modulation.aftertouch_delta()
        } else {
            0.0
        };

        let touch = &params.touch_initial;
        let touch_value = self.modulation.initial_touch_x;
        let touch_enabled = touch.is_enabled && touch.has_active_destinations();
        let touch_source = |amount: f64| {
            if touch_enabled {
                Source::new(touch_value, amount)
            } else {
                Source::NONE
            }
        };

        let mod_env_amount = router::touch_scaled_amount(
            params.modulator_envelope.amount_to_modulation_index,
            touch_source(touch.amount_to_mod_envelope),
        );
        let aux_pitch_amount = router::touch_scaled_amount(
            params.auxiliary_envelope.amount_to_oscillator_pitch,
            touch_source(touch.amount_to_aux_env_pitch),
        );
        let aux_cutoff_amount = router::touch_scaled_amount(
            params.auxiliary_envelope.amount_to_filter_frequency,
            touch_source(touch.amount_to_aux_env_cutoff),
        );

        // Zero amount means touch does not affect level at all.
        let amplitude_touch = if touch_enabled && touch.amount_to_oscillator_amplitude != 0.0 {
            Source::new(touch_value, touch.amount_to_oscillator_amplitude)
        } else {
            Source::new(1.0, 1.0)
        };

        let vibrato = router::voice_lfo_pitch_amount(
            vlfo.amount_to_oscillator_pitch,
            Source::new(aux_env, params.auxiliary_envelope.amount_to_vibrato),
            Source::new(aftertouch, params.touch_aftertouch.amount_to_vibrato),
        );

        let global = &ctx.global_lfo;
        let glfo = ctx.global_lfo_value;
        let state = &self.modulation;

        let frequency = router::oscillator_pitch(
            state.base_frequency,
            Source::new(aux_env, aux_pitch_amount),
            Source::new(lfo, vibrato),
            ramp,
        );
        let amplitude = router::oscillator_amplitude(
            state.base_amplitude,
            amplitude_touch,
            Source::new(glfo, global.amount_to_oscillator_amplitude),
        );
        let modulation_index = router::modulation_index(
            state.base_modulation_index,
            Source::new(mod_env, mod_env_amount),
            Source::new(lfo, vlfo.amount_to_modulator_level),
            ramp,
            Source::new(aftertouch, params.touch_aftertouch.amount_to_modulator_level),
        );
        let modulator_multiplier = router::modulator_multiplier(
            state.base_modulator_multiplier,
            Source::new(glfo, global.amount_to_modulator_multiplier),
        );
        let target_cutoff = router::filter_frequency(
            state.base_filter_cutoff,
            Source::new(key_track, params.key_tracking.amount_to_filter_frequency),
            Source::new(aux_env, aux_cutoff_amount),
            Source::new(aftertouch, params.touch_aftertouch.amount_to_filter_frequency),
            Source::new(lfo, vlfo.amount_to_filter_frequency),
            ramp,
            Source::new(glfo, global.amount_to_filter_frequency),
        );
        let cutoff = self.modulation.smooth_filter_cutoff(target_cutoff);

        self.output.set_frequency(frequency);
        self.output.set_amplitude(amplitude);
        self.output.set_modulation_index(modulation_index);
        self.output.set_modulator_multiplier(modulator_multiplier);
        self.output.set_cutoff(cutoff);

        self.last_applied = VoiceParameters {
            frequency,
            amplitude,
            modulation_index,
            modulator_multiplier,
            cutoff,
        };
    }

    /// Current modulator and auxiliary envelope levels.
    fn envelope_levels(&self) -> (f64, f64) {
        let state = &self.modulation;
        let modulator = &self.template.modulator_envelope;
        let auxiliary = &self.template.auxiliary_envelope;

        let mod_level = if modulator.is_enabled {
            modulator.adsr().value(
                state.modulator_envelope_time,
                state.is_gate_open,
                state.modulator_captured_level,
            )
        } else {
            0.0
        };
        let aux_level = if auxiliary.is_enabled {
            auxiliary.adsr().value(
                state.auxiliary_envelope_time,
                state.is_gate_open,
                state.auxiliary_captured_level,
            )
        } else {
            0.0
        };

        (mod_level, aux_level)
    }

    pub fn set_template(&mut self, template: VoiceModulationParameters) {
        self.template = template;
    }

    pub fn apply_oscillator(&mut self, params: &OscillatorParameters) {
        self.modulation.base_amplitude = params.amplitude;
        self.modulation.base_modulation_index = params.modulation_index;
        self.modulation.base_modulator_multiplier = params.modulator_multiplier;

        if self.state == VoiceState::Idle {
            self.output.set_amplitude(params.amplitude);
            self.output.set_modulation_index(params.modulation_index);
            self.output.set_modulator_multiplier(params.modulator_multiplier);
        }
    }

    pub fn apply_filter(&mut self, params: &FilterParameters) {
        self.modulation.base_filter_cutoff = params.cutoff_hz;
        self.output.set_resonance(params.resonance);
        self.output.set_saturation(params.saturation);

        if self.state == VoiceState::Idle {
            self.output.set_cutoff(params.cutoff_hz);
        }
    }

    pub fn apply_envelope(&mut self, params: &EnvelopeParameters) {
        self.output.apply_envelope(params);
    }

    pub fn set_filter_smoothing(&mut self, factor: f64) {
        self.modulation.filter_smoothing_factor = factor;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == VoiceState::Idle
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Sounding | VoiceState::Releasing)
    }

    /// Key currently holding this voice. `None` once released.
    pub fn owner(&self) -> Option<usize> {
        self.owner
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pool clock time of the last trigger, seconds.
    pub fn trigger_time(&self) -> f64 {
        self.trigger_time
    }

    /// Note frequency before modulation.
    pub fn frequency(&self) -> f64 {
        self.modulation.base_frequency
    }

    pub fn modulation(&self) -> &ModulationState {
        &self.modulation
    }

    pub fn template(&self) -> &VoiceModulationParameters {
        &self.template
    }

    pub fn last_applied(&self) -> VoiceParameters {
        self.last_applied
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}
