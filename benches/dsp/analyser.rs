//! Benchmarks for the FFT analysis point.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonescope::{config::AnalysisConfig, dsp::analyser::Analyser};

pub fn bench_analyser(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/analyser");

    for fft_size in [256usize, 1024, 2048] {
        let config = AnalysisConfig {
            fft_size,
            ..AnalysisConfig::default()
        };
        let mut analyser = Analyser::new(&config);
        let block: Vec<f32> = (0..fft_size)
            .map(|i| (i as f32 * 0.05).sin() * 0.3)
            .collect();
        let mut out = vec![0u8; config.bin_count()];

        group.bench_with_input(BenchmarkId::new("write", fft_size), &fft_size, |b, _| {
            b.iter(|| {
                analyser.write(black_box(&block));
            })
        });

        analyser.write(&block);
        group.bench_with_input(
            BenchmarkId::new("byte_frequency_data", fft_size),
            &fft_size,
            |b, _| {
                b.iter(|| {
                    analyser.byte_frequency_data(black_box(&mut out));
                })
            },
        );
    }

    group.finish();
}
