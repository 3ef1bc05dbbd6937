//! Low-level DSP primitives used by the synth engine.
//!
//! These components stay focused on the signal math; voice lifecycle and
//! scheduling live in `synth`.

/// FFT analysis point producing byte magnitudes per frequency bin.
pub mod analyser;
/// Linear attack/release gain envelope evaluated against the engine clock.
pub mod envelope;
/// Oscillator waveforms.
pub mod oscillator;

pub use envelope::EnvelopeStage;
