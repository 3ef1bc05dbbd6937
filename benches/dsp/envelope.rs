//! Benchmarks for the attack/release gain envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonescope::dsp::envelope::GainEnvelope;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack ramp
        let env = GainEnvelope::triggered(0.0, 0.5, 0.1, 0.1);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(0.01), SAMPLE_RATE);
            })
        });

        // Holding at peak
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(1.0), SAMPLE_RATE);
            })
        });

        // Release ramp
        let mut env = GainEnvelope::triggered(0.0, 0.5, 0.1, 0.1);
        env.release(1.0);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(1.01), SAMPLE_RATE);
            })
        });
    }

    group.finish();
}
