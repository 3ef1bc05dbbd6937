use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/*
Phase-Accumulator Oscillator
============================

The oscillator keeps a normalized phase in [0, 1). Every sample the phase
advances by `frequency / sample_rate` and wraps, and the waveform is a pure
function of the phase:

  Sine       sin(2π·phase)
  Square     +1 for the first half cycle, -1 for the second
  Sawtooth   ramps -1 → +1 over the cycle
  Triangle   -1 → +1 → -1 over the cycle

Keeping the phase normalized (rather than accumulating time) means the
oscillator never loses precision however long a note is held.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Parse a waveform name; unknown names fall back to sine.
    pub fn parse_lossy(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "square" => Waveform::Square,
            "sawtooth" | "saw" => Waveform::Sawtooth,
            "triangle" => Waveform::Triangle,
            _ => Waveform::Sine,
        }
    }

    #[inline]
    fn sample_at(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency,
            phase: 0.0,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Produce the current sample and advance one step.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let value = self.waveform.sample_at(self.phase);
        self.phase += self.frequency / sample_rate;
        self.phase -= self.phase.floor();
        value
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let mut osc = Oscillator::new(Waveform::Sine, 440.0);

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, sample_rate);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn every_waveform_stays_in_unit_range() {
        for waveform in [
            Waveform::Sine,
            Waveform::Square,
            Waveform::Sawtooth,
            Waveform::Triangle,
        ] {
            let mut osc = Oscillator::new(waveform, 1_234.5);
            let mut buffer = vec![0.0f32; 4_096];
            osc.render(&mut buffer, 44_100.0);
            assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)), "{waveform:?}");
        }
    }

    #[test]
    fn unknown_waveform_names_fall_back_to_sine() {
        assert_eq!(Waveform::parse_lossy("SAW"), Waveform::Sawtooth);
        assert_eq!(Waveform::parse_lossy("organ"), Waveform::Sine);
    }
}
