use tracing::debug;

use crate::{
    config::VisualConfig,
    visual::{
        canvas::Canvas,
        palette::BACKGROUND,
        particles::ParticleField,
        styles::{self, FrameParams},
        Viewport, VisualMode,
    },
};

/// How much of the previous frame survives in particle mode.
const PARTICLE_FADE: f32 = 0.25;

/// Result of one render attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Drawn(VisualMode),
    /// No surface, or a surface with no area; try again next frame.
    Skipped,
    /// The frame loop has been torn down.
    Halted,
}

/// Chooses a draw style per frame and carries the state that outlives a
/// single frame: mode, viewport, animation phase, and the particle field.
pub struct RenderPipeline {
    config: VisualConfig,
    mode: VisualMode,
    viewport: Viewport,
    /// Wave phase in radians. Advances by a fixed step every drawn frame and
    /// is wrapped into `[0, TAU)`, which leaves `sin(i * step + phase)`
    /// unchanged while keeping f32 precision on long runs.
    phase: f32,
    /// Degrees, wrapped into `[0, 360)`.
    hue_offset: f32,
    /// Drawn frames so far; the unwrapped animation clock.
    field: Option<ParticleField>,
    frames: u64,
}

impl RenderPipeline {
    pub fn new(config: VisualConfig, viewport: Viewport) -> Self {
        let mut pipeline = Self {
            mode: VisualMode::Bars,
            config,
            viewport,
            phase: 0.0,
            hue_offset: 0.0,
            field: None,
            frames: 0,
        };
        pipeline.set_mode(pipeline.config.mode);
        pipeline
    }

    /// Select the style used from the next frame on. Leaving particles drops
    /// the field; entering particles builds a fresh one.
    pub fn set_mode(&mut self, mode: VisualMode) {
        if mode == VisualMode::Particles {
            if self.mode != VisualMode::Particles || self.field.is_none() {
                self.field = Some(ParticleField::new(
                    self.viewport,
                    self.config.particles.clone(),
                ));
            }
        } else {
            self.field = None;
        }
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "visual mode changed");
        }
        self.mode = mode;
    }

    /// Record new surface dimensions. A live particle field is regenerated
    /// for the new size.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        if let Some(field) = &mut self.field {
            field.regenerate(viewport);
        }
    }

    /// Draw one frame of `snapshot` onto `canvas`.
    pub fn render(&mut self, snapshot: &[u8], canvas: &mut Canvas) -> FrameStatus {
        if canvas.is_empty() {
            return FrameStatus::Skipped;
        }
        // The surface is authoritative for layout
        self.set_viewport(canvas.viewport());

        let frame = FrameParams {
            config: &self.config,
            phase: self.phase,
            hue_offset: self.hue_offset,
        };

        match self.mode {
            VisualMode::Bars => {
                canvas.clear(BACKGROUND);
                styles::bars::draw(canvas, snapshot, &frame);
            }
            VisualMode::Circular => {
                canvas.clear(BACKGROUND);
                styles::circular::draw(canvas, snapshot, &frame);
            }
            VisualMode::Wave => {
                canvas.clear(BACKGROUND);
                styles::wave::draw(canvas, snapshot, &frame);
            }
            VisualMode::Particles => {
                canvas.fade(BACKGROUND, PARTICLE_FADE);
                let intensity =
                    styles::particles::intensity(snapshot, self.config.particles.intensity_scale);
                let field = self.field.get_or_insert_with(|| {
                    ParticleField::new(self.viewport, self.config.particles.clone())
                });
                field.step(intensity);
                styles::particles::draw(canvas, field, intensity);
            }
        }

        self.phase = (self.phase + self.config.wave_phase_step) % std::f32::consts::TAU;
        self.hue_offset = (self.hue_offset + self.config.hue_step) % 360.0;
        self.frames += 1;
        FrameStatus::Drawn(self.mode)
    }

    pub fn mode(&self) -> VisualMode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current wave phase, wrapped into `[0, TAU)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn hue_offset(&self) -> f32 {
        self.hue_offset
    }

    pub fn particle_field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
