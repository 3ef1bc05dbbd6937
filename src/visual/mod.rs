//! Spectrum-to-visual pipeline.
//!
//! Once per frame the [`SpectrumSampler`] pulls a byte spectrum from the
//! engine and the [`RenderPipeline`] draws it onto a [`Canvas`] using the
//! current [`VisualMode`].

pub mod canvas;
pub mod palette;
pub mod particles;
pub mod pipeline;
pub mod spectrum;
pub mod styles;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use canvas::Canvas;
pub use palette::Color;
pub use particles::ParticleField;
pub use pipeline::RenderPipeline;
pub use spectrum::SpectrumSampler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualMode {
    #[default]
    Bars,
    Circular,
    Wave,
    Particles,
}

impl VisualMode {
    pub const ALL: [VisualMode; 4] = [
        VisualMode::Bars,
        VisualMode::Circular,
        VisualMode::Wave,
        VisualMode::Particles,
    ];

    /// Parse a mode name; anything unrecognized selects bars.
    pub fn parse_lossy(name: &str) -> Self {
        name.parse().unwrap_or(VisualMode::Bars)
    }

    pub fn name(self) -> &'static str {
        match self {
            VisualMode::Bars => "bars",
            VisualMode::Circular => "circular",
            VisualMode::Wave => "wave",
            VisualMode::Particles => "particles",
        }
    }

    /// The mode after this one, wrapping around.
    pub fn next(self) -> Self {
        match self {
            VisualMode::Bars => VisualMode::Circular,
            VisualMode::Circular => VisualMode::Wave,
            VisualMode::Wave => VisualMode::Particles,
            VisualMode::Particles => VisualMode::Bars,
        }
    }
}

impl FromStr for VisualMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bars" => Ok(VisualMode::Bars),
            "circular" => Ok(VisualMode::Circular),
            "wave" => Ok(VisualMode::Wave),
            "particles" => Ok(VisualMode::Particles),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for VisualMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown visual mode '{}'", self.0)
    }
}

impl std::error::Error for UnknownMode {}

/// Drawing area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height) as f32
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}
