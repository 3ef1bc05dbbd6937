//! One rendered frame per visual mode.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonescope::{
    config::VisualConfig,
    visual::{Canvas, RenderPipeline, Viewport},
    VisualMode,
};

pub fn bench_styles(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/styles");
    let (width, height) = (800, 600);

    // A loud, sloped spectrum: every bar visible, plenty of particle links
    let snapshot: Vec<u8> = (0..128).map(|i| 255 - i as u8).collect();

    for mode in VisualMode::ALL {
        let config = VisualConfig {
            mode,
            ..VisualConfig::default()
        };
        let mut pipeline = RenderPipeline::new(config, Viewport::new(width, height));
        let mut canvas = Canvas::new(width, height);

        group.bench_with_input(BenchmarkId::new("frame", mode), &mode, |b, _| {
            b.iter(|| {
                pipeline.render(black_box(&snapshot), &mut canvas);
            })
        });
    }

    group.finish();
}
