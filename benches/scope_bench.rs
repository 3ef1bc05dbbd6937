//! Benchmarks for the audio path and the draw styles.
//!
//! Run with: cargo bench
//!
//! The audio side has to keep up with the output device; the visual side has
//! to fit a whole frame inside one display refresh.
//!
//! Reference budgets:
//!   - 256 samples at 48kHz = 5.33ms
//!   - one frame at 60fps   = 16.67ms
//!
//! Benchmark groups:
//!   - dsp/*        Oscillator, envelope and analyser blocks
//!   - scenarios/*  Engine advance with held chords, one frame per visual mode

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Low-level DSP blocks
    dsp::bench_oscillator,
    dsp::bench_envelope,
    dsp::bench_analyser,
    // Whole-frame scenarios
    scenarios::bench_engine,
    scenarios::bench_styles,
);
criterion_main!(benches);
