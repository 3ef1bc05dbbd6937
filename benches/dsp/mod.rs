//! Benchmarks for low-level DSP blocks.

mod analyser;
mod envelope;
mod oscillator;

pub use analyser::bench_analyser;
pub use envelope::bench_envelope;
pub use oscillator::bench_oscillator;
