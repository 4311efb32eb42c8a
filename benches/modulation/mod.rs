//! Benchmarks for the modulation building blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pentatone::modulation::{
    envelope_value,
    router::{self, Source},
    LfoWaveform,
};

pub fn bench_router(c: &mut Criterion) {
    let mut group = c.benchmark_group("modulation/router");

    group.bench_function("filter_frequency", |b| {
        b.iter(|| {
            router::filter_frequency(
                black_box(1200.0),
                black_box(Source::new(-0.7, 0.5)),
                black_box(Source::new(0.4, 2.0)),
                black_box(Source::new(0.3, 1.0)),
                black_box(Source::new(-0.2, 0.5)),
                black_box(0.8),
                black_box(Source::new(0.9, 0.25)),
            )
        })
    });

    group.bench_function("oscillator_pitch", |b| {
        b.iter(|| {
            router::oscillator_pitch(
                black_box(293.66),
                black_box(Source::new(0.5, 2.0)),
                black_box(Source::new(0.3, 0.5)),
                black_box(1.0),
            )
        })
    });

    group.bench_function("vibrato_depth", |b| {
        b.iter(|| {
            router::voice_lfo_pitch_amount(
                black_box(0.0),
                black_box(Source::new(0.6, 1.0)),
                black_box(Source::new(0.4, 2.0)),
            )
        })
    });

    group.finish();
}

pub fn bench_sources(c: &mut Criterion) {
    let mut group = c.benchmark_group("modulation/sources");

    for (name, time, gate_open) in [("decay", 0.15, true), ("release", 0.05, false)] {
        group.bench_with_input(BenchmarkId::new("envelope", name), &time, |b, &time| {
            b.iter(|| {
                envelope_value(
                    black_box(time),
                    gate_open,
                    0.01,
                    0.2,
                    0.3,
                    0.1,
                    black_box(0.6),
                )
            })
        });
    }

    for waveform in [LfoWaveform::Sine, LfoWaveform::Triangle, LfoWaveform::Square] {
        group.bench_with_input(
            BenchmarkId::new("lfo", waveform.display_name()),
            &waveform,
            |b, &waveform| b.iter(|| waveform.value(black_box(0.37))),
        );
    }

    group.finish();
}
