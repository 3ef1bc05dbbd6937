//! The four draw algorithms. Each one paints a full frame from a spectrum
//! snapshot; the pipeline decides which one runs and prepares the surface.

pub mod bars;
pub mod circular;
pub mod particles;
pub mod wave;

use crate::config::VisualConfig;

/// Per-frame inputs shared by every style.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams<'a> {
    pub config: &'a VisualConfig,
    /// Wave undulation phase, radians.
    pub phase: f32,
    /// Global hue rotation, degrees.
    pub hue_offset: f32,
}

/// Snapshot value normalized to [0, 1].
#[inline]
pub(crate) fn level(value: u8) -> f32 {
    value as f32 / 255.0
}
