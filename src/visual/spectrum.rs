//! Per-frame spectrum snapshots.
//!
//! The sampler copies the engine's analysis bytes into a working buffer and
//! amplifies them so quiet signals still read on screen. Before any audio
//! graph exists it serves low, seeded noise instead, so the first frames
//! already have something to draw.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{config::AnalysisConfig, synth::SynthEngine};

/// `min(255, m * gain)`. Monotonic in `m` for any non-negative gain.
#[inline]
pub fn amplify(magnitude: u8, gain: f32) -> u8 {
    (magnitude as f32 * gain).clamp(0.0, 255.0) as u8
}

/// Where the latest snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Analysis,
    Synthetic,
}

pub struct SpectrumSampler {
    raw: Vec<u8>,
    snapshot: Vec<u8>,
    gain: f32,
    rng: StdRng,
    synthetic_ceiling: u8,
    source: SnapshotSource,
}

impl SpectrumSampler {
    pub fn new(config: &AnalysisConfig) -> Self {
        let bins = config.bin_count();
        Self {
            raw: vec![0; bins],
            snapshot: vec![0; bins],
            gain: config.gain,
            rng: StdRng::seed_from_u64(config.synthetic_seed),
            synthetic_ceiling: config.synthetic_ceiling,
            source: SnapshotSource::Synthetic,
        }
    }

    /// Take this frame's snapshot.
    pub fn sample(&mut self, engine: &mut SynthEngine) -> &[u8] {
        if engine.analysis(&mut self.raw) {
            self.source = SnapshotSource::Analysis;
        } else {
            let ceiling = self.synthetic_ceiling;
            for value in self.raw.iter_mut() {
                *value = self.rng.gen_range(0..=ceiling);
            }
            self.source = SnapshotSource::Synthetic;
        }
        self.amplify_raw();
        &self.snapshot
    }

    /// Take a snapshot from magnitudes supplied directly (headless hosts,
    /// tests). Extra input is ignored, missing input reads as zero.
    pub fn sample_from(&mut self, raw: &[u8]) -> &[u8] {
        for (i, value) in self.raw.iter_mut().enumerate() {
            *value = raw.get(i).copied().unwrap_or(0);
        }
        self.source = SnapshotSource::Analysis;
        self.amplify_raw();
        &self.snapshot
    }

    fn amplify_raw(&mut self) {
        for (out, &raw) in self.snapshot.iter_mut().zip(&self.raw) {
            *out = amplify(raw, self.gain);
        }
    }

    pub fn snapshot(&self) -> &[u8] {
        &self.snapshot
    }

    pub fn source(&self) -> SnapshotSource {
        self.source
    }

    pub fn bin_count(&self) -> usize {
        self.snapshot.len()
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SynthConfig, io::NoAudio};

    #[test]
    fn amplify_is_bounded_and_monotonic() {
        for gain in [0.0, 1.0, 1.5, 2.5] {
            let mut previous = 0;
            for m in 0..=255u8 {
                let value = amplify(m, gain);
                assert!(value >= previous, "gain {gain}: not monotonic at {m}");
                assert_eq!(value as f32, (m as f32 * gain).min(255.0).floor());
                previous = value;
            }
        }
    }

    #[test]
    fn loud_input_clamps_to_full_scale() {
        let mut sampler = SpectrumSampler::new(&AnalysisConfig::default());
        let snapshot = sampler.sample_from(&[200; 128]);
        assert!(snapshot.iter().all(|&v| v == 255));
    }

    #[test]
    fn synthetic_snapshot_before_audio_exists() {
        let config = AnalysisConfig::default();
        let mut engine = SynthEngine::new(SynthConfig::default(), config.clone(), NoAudio);
        let mut sampler = SpectrumSampler::new(&config);

        let ceiling = amplify(config.synthetic_ceiling, config.gain);
        let snapshot = sampler.sample(&mut engine).to_vec();
        assert_eq!(snapshot.len(), 128);
        assert!(snapshot.iter().all(|&v| v <= ceiling));
        assert!(snapshot.iter().any(|&v| v > 0));
        assert_eq!(sampler.source(), SnapshotSource::Synthetic);
    }

    #[test]
    fn same_seed_same_synthetic_frames() {
        let config = AnalysisConfig::default();
        let mut engine = SynthEngine::new(SynthConfig::default(), config.clone(), NoAudio);
        let mut a = SpectrumSampler::new(&config);
        let mut b = SpectrumSampler::new(&config);
        for _ in 0..3 {
            let first = a.sample(&mut engine).to_vec();
            assert_eq!(first, b.sample(&mut engine));
        }
    }

    #[test]
    fn snapshot_length_never_changes() {
        let mut sampler = SpectrumSampler::new(&AnalysisConfig::default());
        assert_eq!(sampler.sample_from(&[1; 16]).len(), 128);
        assert_eq!(sampler.sample_from(&[1; 4096]).len(), 128);
    }
}
