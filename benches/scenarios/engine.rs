//! Engine advance with held chords, one display frame per iteration.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonescope::{
    config::{AnalysisConfig, SynthConfig},
    io::OfflineSink,
    SynthEngine,
};

const FRAME: f64 = 1.0 / 60.0;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for voices in [1usize, 3, 9] {
        let mut engine = SynthEngine::new(
            SynthConfig::default(),
            AnalysisConfig::default(),
            // Keep the capture bounded; the benchmark runs for a long time
            || -> color_eyre::eyre::Result<Box<dyn tonescope::io::AudioSink>> {
                Ok(Box::new(OfflineSink::with_capacity(48_000.0, 4_096)))
            },
        );
        for note in tonescope::notes::NOTES.iter().take(voices) {
            engine.note_on(note.key);
        }
        let mut spectrum = vec![0u8; engine.bin_count()];

        group.bench_with_input(BenchmarkId::new("advance", voices), &voices, |b, _| {
            b.iter(|| {
                engine.advance(black_box(FRAME));
                engine.analysis(black_box(&mut spectrum));
            })
        });
    }

    group.finish();
}
