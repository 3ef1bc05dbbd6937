//! Typed configuration.
//!
//! Every section has defaults, so an empty file (or no file at all) is a valid
//! configuration. Out-of-range values are clamped by [`Config::sanitized`]
//! rather than rejected.

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{dsp::oscillator::Waveform, visual::VisualMode};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub synth: SynthConfig,
    pub analysis: AnalysisConfig,
    pub visual: VisualConfig,
    pub input: InputConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> EyreResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).wrap_err_with(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> EyreResult<Self> {
        let config: Config = toml::from_str(text).wrap_err("failed to parse TOML")?;
        Ok(config.sanitized())
    }

    /// Clamp every numeric field into the range the engine can work with.
    /// Non-finite floats fall back to their defaults first.
    pub fn sanitized(mut self) -> Self {
        let defaults = Config::default();

        let synth = &mut self.synth;
        finite_or(&mut synth.attack_ms, defaults.synth.attack_ms);
        finite_or(&mut synth.release_ms, defaults.synth.release_ms);
        finite_or(&mut synth.peak_gain, defaults.synth.peak_gain);
        finite_or(&mut synth.latency_ms, defaults.synth.latency_ms);
        synth.attack_ms = synth.attack_ms.max(0.0);
        synth.release_ms = synth.release_ms.max(0.0);
        synth.peak_gain = synth.peak_gain.clamp(0.0, 1.0);
        synth.latency_ms = synth.latency_ms.clamp(0.0, 1_000.0);

        let analysis = &mut self.analysis;
        finite_or(&mut analysis.smoothing, defaults.analysis.smoothing);
        finite_or(&mut analysis.min_db, defaults.analysis.min_db);
        finite_or(&mut analysis.max_db, defaults.analysis.max_db);
        finite_or(&mut analysis.gain, defaults.analysis.gain);
        analysis.fft_size = analysis.fft_size.clamp(32, 32_768).next_power_of_two();
        analysis.smoothing = analysis.smoothing.clamp(0.0, 0.99);
        if analysis.max_db <= analysis.min_db {
            analysis.min_db = defaults.analysis.min_db;
            analysis.max_db = defaults.analysis.max_db;
        }
        analysis.gain = analysis.gain.max(0.0);

        let visual = &mut self.visual;
        finite_or(&mut visual.max_bar_fraction, defaults.visual.max_bar_fraction);
        finite_or(&mut visual.wave_step, defaults.visual.wave_step);
        finite_or(&mut visual.wave_phase_step, defaults.visual.wave_phase_step);
        finite_or(&mut visual.hue_step, defaults.visual.hue_step);
        visual.max_bar_fraction = visual.max_bar_fraction.clamp(0.0, 1.0);
        visual.fps = visual.fps.clamp(1, 240);

        let particles = &mut visual.particles;
        let particle_defaults = &defaults.visual.particles;
        finite_or(&mut particles.speed, particle_defaults.speed);
        finite_or(&mut particles.radius_min, particle_defaults.radius_min);
        finite_or(&mut particles.radius_max, particle_defaults.radius_max);
        finite_or(&mut particles.hue_min, particle_defaults.hue_min);
        finite_or(&mut particles.hue_max, particle_defaults.hue_max);
        finite_or(&mut particles.reactivity, particle_defaults.reactivity);
        finite_or(&mut particles.size_factor, particle_defaults.size_factor);
        finite_or(&mut particles.intensity_scale, particle_defaults.intensity_scale);
        finite_or(&mut particles.link_distance, particle_defaults.link_distance);
        particles.count = particles.count.min(10_000);
        particles.speed = particles.speed.max(0.0);
        particles.radius_min = particles.radius_min.max(0.1);
        particles.radius_max = particles.radius_max.max(particles.radius_min);
        if particles.hue_max < particles.hue_min {
            std::mem::swap(&mut particles.hue_min, &mut particles.hue_max);
        }
        particles.reactivity = particles.reactivity.max(0.0);
        particles.size_factor = particles.size_factor.max(0.0);
        particles.intensity_scale = particles.intensity_scale.max(0.0);
        particles.link_distance = particles.link_distance.max(0.0);

        let input = &mut self.input;
        finite_or(&mut input.fallback_hold_ms, defaults.input.fallback_hold_ms);
        input.fallback_hold_ms = input.fallback_hold_ms.clamp(10.0, 10_000.0);
        self
    }
}

fn finite_or(value: &mut f32, default: f32) {
    if !value.is_finite() {
        *value = default;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub waveform: Waveform,
    /// Linear ramp 0 -> peak on note-on.
    pub attack_ms: f32,
    /// Linear ramp current -> 0 on note-off.
    pub release_ms: f32,
    pub peak_gain: f32,
    /// Silence queued ahead of the first block when output resumes.
    pub latency_ms: f32,
}

impl SynthConfig {
    pub fn attack_secs(&self) -> f32 {
        self.attack_ms / 1_000.0
    }

    pub fn release_secs(&self) -> f32 {
        self.release_ms / 1_000.0
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            attack_ms: 100.0,
            release_ms: 100.0,
            peak_gain: 0.5,
            latency_ms: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Window length; the snapshot has `fft_size / 2` bins.
    pub fft_size: usize,
    pub smoothing: f32,
    pub min_db: f32,
    pub max_db: f32,
    /// Visibility amplification applied by the sampler.
    pub gain: f32,
    pub synthetic_seed: u64,
    pub synthetic_ceiling: u8,
}

impl AnalysisConfig {
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
            gain: 1.5,
            synthetic_seed: 0x5eed,
            synthetic_ceiling: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub mode: VisualMode,
    pub fps: u32,
    pub max_bar_fraction: f32,
    pub wave_step: f32,
    pub wave_phase_step: f32,
    /// Degrees of hue rotation per frame.
    pub hue_step: f32,
    pub particles: ParticleConfig,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            mode: VisualMode::Bars,
            fps: 60,
            max_bar_fraction: 0.8,
            wave_step: 0.2,
            wave_phase_step: 0.05,
            hue_step: 0.5,
            particles: ParticleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Upper bound of each initial velocity component, in pixels per frame.
    pub speed: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    /// Hue band (degrees) particle colors are drawn from.
    pub hue_min: f32,
    pub hue_max: f32,
    pub reactivity: f32,
    pub size_factor: f32,
    pub intensity_scale: f32,
    pub link_distance: f32,
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 100,
            speed: 1.0,
            radius_min: 1.0,
            radius_max: 4.0,
            hue_min: 180.0,
            hue_max: 300.0,
            reactivity: 4.0,
            size_factor: 2.0,
            intensity_scale: 2.0,
            link_distance: 80.0,
            seed: 0xfeed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Automatic note-off delay after the last press or repeat, for hosts
    /// that never report key releases.
    pub fallback_hold_ms: f32,
}

impl InputConfig {
    pub fn fallback_hold_secs(&self) -> f64 {
        self.fallback_hold_ms as f64 / 1_000.0
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            fallback_hold_ms: 350.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.analysis.bin_count(), 128);
        assert_eq!(config.visual.mode, VisualMode::Bars);
        assert_eq!(config.visual.particles.count, 100);
        assert!((config.synth.attack_secs() - 0.1).abs() < 1e-6);
        assert!((config.input.fallback_hold_secs() - 0.35).abs() < 1e-9);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = Config::from_toml_str(
            r#"
            [synth]
            waveform = "triangle"
            release_ms = 250.0

            [visual]
            mode = "particles"
            "#,
        )
        .unwrap();
        assert_eq!(config.synth.waveform, Waveform::Triangle);
        assert!((config.synth.release_secs() - 0.25).abs() < 1e-6);
        assert!((config.synth.attack_ms - 100.0).abs() < 1e-6);
        assert_eq!(config.visual.mode, VisualMode::Particles);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let config = Config::from_toml_str(
            r#"
            [synth]
            peak_gain = 4.0
            attack_ms = -5.0

            [analysis]
            fft_size = 300
            min_db = -10.0
            max_db = -20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.synth.peak_gain, 1.0);
        assert_eq!(config.synth.attack_ms, 0.0);
        assert_eq!(config.analysis.fft_size, 512);
        assert!(config.analysis.min_db < config.analysis.max_db);
    }

    #[test]
    fn non_finite_floats_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            [synth]
            attack_ms = inf
            peak_gain = nan

            [visual.particles]
            speed = inf
            radius_max = inf
            hue_min = nan
            hue_max = nan
            link_distance = -inf
            "#,
        )
        .unwrap();
        let defaults = ParticleConfig::default();
        let particles = &config.visual.particles;
        assert_eq!(config.synth.attack_ms, 100.0);
        assert_eq!(config.synth.peak_gain, 0.5);
        assert_eq!(particles.speed, defaults.speed);
        assert_eq!(particles.radius_max, defaults.radius_max);
        assert_eq!(particles.hue_min, defaults.hue_min);
        assert_eq!(particles.hue_max, defaults.hue_max);
        assert_eq!(particles.link_distance, defaults.link_distance);
    }

    #[test]
    fn particle_ranges_are_ordered() {
        let config = Config::from_toml_str(
            r#"
            [visual.particles]
            radius_min = 6.0
            radius_max = 2.0
            hue_min = 300.0
            hue_max = 120.0
            "#,
        )
        .unwrap();
        let particles = &config.visual.particles;
        assert!(particles.radius_min <= particles.radius_max);
        assert_eq!((particles.hue_min, particles.hue_max), (120.0, 300.0));
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(Config::from_toml_str("[synth\nattack_ms = ").is_err());
    }
}
