//! Pool-level benchmarks modelling real playing.
//!
//! Every voice runs the full modulation matrix with all sources routed, so
//! the numbers are a worst case for a given polyphony.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pentatone::{
    modulation::{
        GlobalLfoParameters, LfoWaveform, VoiceLfoParameters, VoiceModulationParameters,
    },
    scale::{catalog, make_key_frequencies, Celestial, Intonation, MusicalKey, Terrestrial},
    synth::{NullOutput, VoicePool},
    KEY_COUNT,
};

use crate::{DT, VOICE_COUNTS};

fn busy_template() -> VoiceModulationParameters {
    let mut template = VoiceModulationParameters {
        voice_lfo: VoiceLfoParameters {
            waveform: LfoWaveform::Triangle,
            amount_to_oscillator_pitch: 0.3,
            amount_to_filter_frequency: 0.5,
            amount_to_modulator_level: 0.4,
            delay_time: 0.5,
            ..Default::default()
        },
        ..Default::default()
    };
    template.modulator_envelope.amount_to_modulation_index = 2.0;
    template.auxiliary_envelope.amount_to_filter_frequency = 1.5;
    template.auxiliary_envelope.amount_to_vibrato = 1.0;
    template.key_tracking.amount_to_filter_frequency = 0.5;
    template.key_tracking.amount_to_voice_lfo_frequency = 0.5;
    template.touch_initial.amount_to_oscillator_amplitude = 1.0;
    template.touch_aftertouch.amount_to_filter_frequency = 1.0;
    template.touch_aftertouch.amount_to_vibrato = 0.5;
    template
}

fn busy_pool(voices: usize) -> VoicePool<NullOutput> {
    let mut pool = VoicePool::new(&|_: usize| NullOutput::new(), voices);
    pool.set_modulation(busy_template());
    pool.set_global_lfo(GlobalLfoParameters {
        amount_to_oscillator_amplitude: 0.1,
        amount_to_filter_frequency: 0.5,
        ..Default::default()
    });
    pool
}

fn keyboard() -> [f64; KEY_COUNT] {
    let scale = catalog::find(Intonation::Just, Celestial::Center, Terrestrial::Meridian);
    make_key_frequencies(&scale, MusicalKey::BASE_FREQUENCY, MusicalKey::D)
}

pub fn bench_pool_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pool_tick");
    let frequencies = keyboard();

    for &voices in VOICE_COUNTS {
        let mut pool = busy_pool(voices);
        for (key, &frequency) in frequencies.iter().enumerate().take(voices) {
            pool.allocate_voice(frequency, key, 0.3);
        }

        group.bench_with_input(BenchmarkId::new("all_sounding", voices), &voices, |b, _| {
            b.iter(|| pool.tick(black_box(DT)))
        });
    }

    group.finish();
}

pub fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/allocation");
    let frequencies = keyboard();

    for &voices in VOICE_COUNTS {
        let mut pool = busy_pool(voices);
        let mut key = 0;

        // Cycling through all 18 keys keeps the pool full, so most
        // allocations steal.
        group.bench_with_input(BenchmarkId::new("steal_churn", voices), &voices, |b, _| {
            b.iter(|| {
                pool.allocate_voice(black_box(frequencies[key]), key, 0.5);
                pool.tick(DT);
                key = (key + 1) % KEY_COUNT;
            })
        });
    }

    group.finish();
}
