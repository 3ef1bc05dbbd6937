//! FFT analysis point.
//!
//! Every rendered sample passes through [`Analyser::write`]; on request the
//! most recent `fft_size` samples are windowed, transformed and reduced to one
//! unsigned byte per frequency bin.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::config::AnalysisConfig;

pub struct Analyser {
    /// Blackman window coefficients
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Circular history of the last `fft_size` samples
    history: Vec<f32>,
    head: usize,
    /// Smoothed linear magnitude per bin
    smoothed: Vec<f32>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

impl Analyser {
    pub fn new(config: &AnalysisConfig) -> Self {
        let fft_size = config.fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let window = (0..fft_size)
            .map(|i| {
                let x = i as f32 / fft_size as f32;
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })
            .collect();

        Self {
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            history: vec![0.0; fft_size],
            head: 0,
            smoothed: vec![0.0; fft_size / 2],
            smoothing: config.smoothing,
            min_db: config.min_db,
            max_db: config.max_db,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.history.len()
    }

    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Append rendered samples to the analysis history.
    pub fn write(&mut self, block: &[f32]) {
        let len = self.history.len();
        for &sample in block {
            self.history[self.head] = sample;
            self.head = (self.head + 1) % len;
        }
    }

    /// Fill `out` with byte magnitudes of the current window.
    ///
    /// Each call applies one smoothing step. Extra output slots are zeroed.
    pub fn byte_frequency_data(&mut self, out: &mut [u8]) {
        let len = self.history.len();
        for i in 0..len {
            // Oldest sample first
            let sample = self.history[(self.head + i) % len];
            self.scratch[i] = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let scale = 1.0 / len as f32;
        let range = self.max_db - self.min_db;
        for (bin, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.scratch[bin].norm() * scale;
            *smoothed = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;
        }

        for (slot, value) in out.iter_mut().enumerate() {
            *value = match self.smoothed.get(slot) {
                Some(&magnitude) if magnitude > 0.0 => {
                    let db = 20.0 * magnitude.log10();
                    (255.0 * (db - self.min_db) / range).clamp(0.0, 255.0) as u8
                }
                _ => 0,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn analyser() -> Analyser {
        Analyser::new(&AnalysisConfig {
            smoothing: 0.0,
            ..AnalysisConfig::default()
        })
    }

    #[test]
    fn silence_reads_as_zero() {
        let mut analyser = analyser();
        analyser.write(&[0.0; 512]);
        let mut out = vec![7u8; analyser.bin_count()];
        analyser.byte_frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn tone_peaks_at_its_bin() {
        let mut analyser = analyser();
        let sample_rate = 48_000.0;
        let fft_size = analyser.fft_size() as f32;
        // Centre of bin 10
        let frequency = 10.0 * sample_rate / fft_size;
        let block: Vec<f32> = (0..1024)
            .map(|n| 0.01 * (TAU * frequency * n as f32 / sample_rate).sin())
            .collect();
        analyser.write(&block);

        let mut out = vec![0u8; analyser.bin_count()];
        analyser.byte_frequency_data(&mut out);

        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|(_, &v)| v)
            .map(|(i, _)| i);
        assert_eq!(peak, Some(10));
        assert!(out[10] > 100);
        assert!(out[60] < out[10]);
    }

    #[test]
    fn smoothing_decays_gradually() {
        let mut analyser = Analyser::new(&AnalysisConfig::default());
        let block: Vec<f32> = (0..256).map(|n| (n as f32 * 0.7).sin()).collect();
        analyser.write(&block);
        let mut loud = vec![0u8; analyser.bin_count()];
        for _ in 0..20 {
            analyser.byte_frequency_data(&mut loud);
        }

        analyser.write(&[0.0; 256]);
        let mut decaying = vec![0u8; analyser.bin_count()];
        analyser.byte_frequency_data(&mut decaying);
        assert!(decaying.iter().any(|&b| b > 0), "smoothing should hold energy");
        assert!(decaying.iter().zip(&loud).all(|(d, l)| d <= l));
    }
}
