use std::{collections::HashMap, fmt};

use log::{debug, info, trace, warn};

use crate::{
    engine::scheduler::IdleScheduler,
    modulation::{
        router::{self, Source},
        GlobalLfoParameters, GlobalModulationState, LfoResetMode, VoiceModulationParameters,
        DEFAULT_FILTER_SMOOTHING,
    },
    patch::{EnvelopeParameters, FilterParameters, OscillatorParameters, VoicePatch},
    synth::{
        backend::{EffectsOutput, VoiceOutput},
        factory::VoiceFactory,
        voice::{TickCtx, Voice, VoiceState},
    },
};

/// Upper bound for the filter smoothing factor; 1.0 would freeze the cutoff.
pub const MAX_FILTER_SMOOTHING: f64 = 0.99;

/// Tempo range accepted by [`VoicePool::set_tempo`].
pub const TEMPO_RANGE: (f64, f64) = (20.0, 400.0);

/// Snapshot of the pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStatus {
    pub voice_count: usize,
    pub active_voices: usize,
    pub available_voices: usize,
    pub keys_held: usize,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} voices: {} active, {} available, {} keys held",
            self.voice_count, self.active_voices, self.available_voices, self.keys_held
        )
    }
}

/// Fixed-size set of voices with key ownership and round-robin stealing.
///
/// The pool is single-writer: every mutation (allocation, release, tick)
/// happens on whichever thread owns it. Cross-thread access goes through
/// the engine's message queue.
pub struct VoicePool<O: VoiceOutput> {
    voices: Vec<Voice<O>>,
    key_to_voice: HashMap<usize, usize>,
    cursor: usize,
    clock: f64,
    idle: IdleScheduler,

    global_lfo: GlobalLfoParameters,
    global: GlobalModulationState,

    modulation: VoiceModulationParameters,
    oscillator: OscillatorParameters,
    filter: FilterParameters,
    envelope: EnvelopeParameters,
    delay_time: f64,
    filter_smoothing: f64,
    effects: Option<Box<dyn EffectsOutput>>,
}

impl<O: VoiceOutput> VoicePool<O> {
    /// Build `voice_count` voices (at least one) from `factory`.
    pub fn new<F>(factory: &F, voice_count: usize) -> Self
    where
        F: VoiceFactory<Output = O> + ?Sized,
    {
        let voice_count = voice_count.max(1);
        let voices = (0..voice_count)
            .map(|index| Voice::new(index, factory.create_voice(index)))
            .collect();

        let mut pool = Self {
            voices,
            key_to_voice: HashMap::with_capacity(voice_count),
            cursor: 0,
            clock: 0.0,
            idle: IdleScheduler::with_capacity(voice_count),
            global_lfo: GlobalLfoParameters::default(),
            global: GlobalModulationState::default(),
            modulation: VoiceModulationParameters::default(),
            oscillator: OscillatorParameters::default(),
            filter: FilterParameters::default(),
            envelope: EnvelopeParameters::default(),
            delay_time: VoicePatch::default().delay_time,
            filter_smoothing: DEFAULT_FILTER_SMOOTHING,
            effects: None,
        };
        pool.apply_patch(&VoicePatch::default());

        info!("voice pool ready with {} voices", voice_count);
        pool
    }

    /// Start `frequency` for `key` and return the voice index used.
    ///
    /// A key that already owns a voice retriggers it. Otherwise the first
    /// idle voice from the cursor is taken, or the voice at the cursor is
    /// stolen when none is idle. The cursor moves past the chosen voice.
    pub fn allocate_voice(&mut self, frequency: f64, key: usize, touch_x: f64) -> usize {
        if let Some(&index) = self.key_to_voice.get(&key) {
            debug!("key {}: retrigger voice {} at {:.2} Hz", key, index, frequency);
            self.start_voice(index, key, frequency, touch_x);
            return index;
        }

        let count = self.voices.len();
        let idle = (0..count)
            .map(|offset| (self.cursor + offset) % count)
            .find(|&index| self.voices[index].is_idle());

        let index = match idle {
            Some(index) => index,
            None => {
                let index = self.cursor;
                if let Some(previous) = self.voices[index].owner() {
                    self.key_to_voice.remove(&previous);
                    warn!("key {}: stealing voice {} from key {}", key, index, previous);
                } else {
                    warn!("key {}: stealing releasing voice {}", key, index);
                }
                index
            }
        };

        self.start_voice(index, key, frequency, touch_x);
        self.key_to_voice.insert(key, index);
        self.cursor = (index + 1) % count;

        debug!("key {}: voice {} at {:.2} Hz", key, index, frequency);
        index
    }

    fn start_voice(&mut self, index: usize, key: usize, frequency: f64, touch_x: f64) {
        self.idle.cancel(index);
        self.voices[index].trigger(frequency, touch_x, self.clock, key);
    }

    /// Aftertouch for the voice owned by `key`, if any.
    pub fn update_touch(&mut self, key: usize, touch_x: f64) {
        match self.key_to_voice.get(&key) {
            Some(&index) => self.voices[index].update_touch(touch_x),
            None => trace!("key {}: touch moved without a voice", key),
        }
    }

    /// Close the gate of the voice owned by `key`. The key is free again
    /// immediately; the voice becomes idle once its release has elapsed.
    pub fn release_voice(&mut self, key: usize) {
        let Some(index) = self.key_to_voice.remove(&key) else {
            trace!("key {}: release without a voice", key);
            return;
        };

        let voice = &mut self.voices[index];
        let release = voice.release();
        self.idle.schedule(index, voice.generation(), self.clock + release);

        debug!("key {}: released voice {} ({:.3} s)", key, index, release);
    }

    /// Silence everything at once, cancelling pending releases.
    pub fn stop_all(&mut self) {
        if !self.idle.is_empty() {
            debug!("cancelling {} pending releases", self.idle.len());
        }
        self.idle.cancel_all();
        self.key_to_voice.clear();
        for voice in &mut self.voices {
            voice.stop();
        }
        debug!("all voices stopped");
    }

    /// One control-rate step of `delta_time` seconds.
    pub fn tick(&mut self, delta_time: f64) {
        let delta_time = delta_time.max(0.0);
        self.clock += delta_time;

        while let Some(entry) = self.idle.pop_due(self.clock) {
            if self.voices[entry.voice].finish_release(entry.generation) {
                debug!("voice {} idle", entry.voice);
            } else {
                trace!("voice {}: stale idle transition ignored", entry.voice);
            }
        }

        self.global.advance(&self.global_lfo, delta_time);
        let global_lfo_value = if self.global_lfo.has_active_destinations() {
            self.global.value(&self.global_lfo)
        } else {
            0.0
        };

        let ctx = TickCtx {
            delta_time,
            tempo_bpm: self.global.current_tempo,
            global_lfo: self.global_lfo,
            global_lfo_value,
        };
        for voice in &mut self.voices {
            voice.tick(&ctx);
        }

        if let Some(effects) = self.effects.as_mut() {
            effects.set_delay_time(router::delay_time(
                self.delay_time,
                Source::new(global_lfo_value, self.global_lfo.amount_to_delay_time),
            ));
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Voices sounding or releasing.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|voice| voice.is_active()).count()
    }

    pub fn available_voice_count(&self) -> usize {
        self.voice_count() - self.active_voice_count()
    }

    pub fn keys_held(&self) -> usize {
        self.key_to_voice.len()
    }

    pub fn status(&self) -> PoolStatus {
        let active_voices = self.active_voice_count();
        PoolStatus {
            voice_count: self.voice_count(),
            active_voices,
            available_voices: self.voice_count() - active_voices,
            keys_held: self.keys_held(),
        }
    }

    pub fn voice(&self, index: usize) -> Option<&Voice<O>> {
        self.voices.get(index)
    }

    pub fn voices(&self) -> &[Voice<O>] {
        &self.voices
    }

    /// Voice index owned by `key`.
    pub fn voice_for_key(&self, key: usize) -> Option<usize> {
        self.key_to_voice.get(&key).copied()
    }

    pub fn voice_state(&self, index: usize) -> Option<VoiceState> {
        self.voices.get(index).map(Voice::state)
    }

    /// Seconds of control time since the pool was built.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_pending_idle(&self, index: usize) -> bool {
        self.idle.is_scheduled(index)
    }

    pub fn tempo(&self) -> f64 {
        self.global.current_tempo
    }

    /// Set the tempo used by tempo-synced LFOs. A synced global LFO restarts
    /// its cycle so it lines up with the new tempo.
    pub fn set_tempo(&mut self, bpm: f64) {
        let bpm = bpm.clamp(TEMPO_RANGE.0, TEMPO_RANGE.1);
        self.global.current_tempo = bpm;
        if self.global_lfo.reset_mode == LfoResetMode::Sync {
            self.global.global_lfo_phase = 0.0;
        }
        debug!("tempo {:.1} BPM", bpm);
    }

    pub fn global_lfo(&self) -> &GlobalLfoParameters {
        &self.global_lfo
    }

    pub fn global_lfo_phase(&self) -> f64 {
        self.global.global_lfo_phase
    }

    pub fn set_global_lfo(&mut self, params: GlobalLfoParameters) {
        self.global_lfo = params;
    }

    pub fn modulation(&self) -> &VoiceModulationParameters {
        &self.modulation
    }

    /// Copy a new modulation template into every voice.
    pub fn set_modulation(&mut self, params: VoiceModulationParameters) {
        self.modulation = params;
        for voice in &mut self.voices {
            voice.set_template(params);
        }
    }

    pub fn update_oscillators(&mut self, params: OscillatorParameters) {
        self.oscillator = params;
        for voice in &mut self.voices {
            voice.apply_oscillator(&params);
        }
    }

    pub fn update_filters(&mut self, params: FilterParameters) {
        self.filter = params;
        for voice in &mut self.voices {
            voice.apply_filter(&params);
        }
    }

    pub fn update_envelopes(&mut self, params: EnvelopeParameters) {
        self.envelope = params;
        for voice in &mut self.voices {
            voice.apply_envelope(&params);
        }
    }

    pub fn filter_smoothing(&self) -> f64 {
        self.filter_smoothing
    }

    pub fn set_filter_smoothing(&mut self, factor: f64) {
        let factor = factor.clamp(0.0, MAX_FILTER_SMOOTHING);
        self.filter_smoothing = factor;
        for voice in &mut self.voices {
            voice.set_filter_smoothing(factor);
        }
    }

    /// Base delay time of the shared effect; the global LFO modulates it.
    pub fn set_delay_time(&mut self, seconds: f64) {
        self.delay_time = seconds.clamp(router::DELAY_TIME_RANGE.0, router::DELAY_TIME_RANGE.1);
    }

    pub fn set_effects(&mut self, effects: Box<dyn EffectsOutput>) {
        self.effects = Some(effects);
    }

    pub fn apply_patch(&mut self, patch: &VoicePatch) {
        self.update_oscillators(patch.oscillator);
        self.update_filters(patch.filter);
        self.update_envelopes(patch.envelope);
        self.set_modulation(patch.modulation);
        self.set_global_lfo(patch.global_lfo);
        self.set_delay_time(patch.delay_time);
    }

    /// Current base parameters as a patch.
    pub fn patch(&self) -> VoicePatch {
        VoicePatch {
            oscillator: self.oscillator,
            filter: self.filter,
            envelope: self.envelope,
            modulation: self.modulation,
            global_lfo: self.global_lfo,
            delay_time: self.delay_time,
        }
    }
}
