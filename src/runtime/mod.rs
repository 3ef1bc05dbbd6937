//! Cooperative frame driver.
//!
//! The [`Visualizer`] ties one synth engine, one spectrum sampler, one render
//! pipeline and one input router together behind a "drive one tick" call.
//! It never looks at a wall clock: the host decides when frames happen and
//! passes the elapsed time in, so the whole thing runs the same under a
//! terminal loop, a test, or a benchmark.
//!
//! # Example
//!
//! ```ignore
//! use tonescope::{runtime::Visualizer, Config, FrameStatus};
//!
//! let mut vis = Visualizer::new(Config::default());
//! vis.attach_surface(320, 200);
//! vis.note_on('a');
//! assert!(matches!(vis.tick(1.0 / 60.0), FrameStatus::Drawn(_)));
//! ```

use tracing::{debug, info};

use crate::{
    config::Config,
    input::{InputEvent, InputRouter},
    io::SinkFactory,
    synth::{SynthEngine, SynthMessage},
    visual::{Canvas, RenderPipeline, SpectrumSampler, Viewport, VisualMode},
};

pub use crate::visual::pipeline::FrameStatus;

pub struct Visualizer {
    engine: SynthEngine,
    sampler: SpectrumSampler,
    pipeline: RenderPipeline,
    router: InputRouter,
    surface: Option<Canvas>,
    halted: bool,
}

impl Visualizer {
    /// Visualizer playing through the default output device.
    #[cfg(feature = "rtrb")]
    pub fn new(config: Config) -> Self {
        let latency = config.synth.latency_ms;
        Self::with_sink(config, crate::io::default_output(latency))
    }

    /// Visualizer without an audio device; always shows synthetic spectra.
    #[cfg(not(feature = "rtrb"))]
    pub fn new(config: Config) -> Self {
        Self::with_sink(config, crate::io::NoAudio)
    }

    pub fn with_sink(config: Config, factory: impl SinkFactory + 'static) -> Self {
        let config = config.sanitized();
        let engine = SynthEngine::new(config.synth.clone(), config.analysis.clone(), factory);
        let sampler = SpectrumSampler::new(&config.analysis);
        let pipeline = RenderPipeline::new(config.visual.clone(), Viewport::default());
        Self {
            engine,
            sampler,
            pipeline,
            router: InputRouter::new(),
            surface: None,
            halted: false,
        }
    }

    /// Drive one frame: advance the audio timeline by `dt` seconds, take a
    /// spectrum snapshot and draw it.
    pub fn tick(&mut self, dt: f64) -> FrameStatus {
        if self.halted {
            return FrameStatus::Halted;
        }

        for message in self.router.expire(self.engine.now()) {
            self.engine.handle(message);
        }
        self.engine.advance(dt);

        let Some(surface) = self.surface.as_mut() else {
            return FrameStatus::Skipped;
        };
        if surface.is_empty() {
            return FrameStatus::Skipped;
        }
        let snapshot = self.sampler.sample(&mut self.engine);
        self.pipeline.render(snapshot, surface)
    }

    /// Route one raw input event. Any event counts as a user gesture and
    /// may bring up the audio output.
    pub fn input(&mut self, event: InputEvent) {
        if self.halted {
            return;
        }
        self.engine.interact();
        if let Some(message) = self.router.route(event, self.engine.now()) {
            self.engine.handle(message);
        }
    }

    pub fn note_on(&mut self, key: char) -> bool {
        !self.halted && self.engine.note_on(key)
    }

    pub fn note_off(&mut self, key: char) -> bool {
        !self.halted && self.engine.note_off(key)
    }

    pub fn all_notes_off(&mut self) {
        self.router.clear();
        self.engine.handle(SynthMessage::AllNotesOff);
    }

    /// Select a visual mode by name. Unknown names select bars.
    pub fn set_visual_mode(&mut self, name: &str) -> VisualMode {
        let mode = VisualMode::parse_lossy(name);
        self.pipeline.set_mode(mode);
        mode
    }

    pub fn set_mode(&mut self, mode: VisualMode) {
        self.pipeline.set_mode(mode);
    }

    /// Attach (or replace) the raster surface frames are drawn on.
    pub fn attach_surface(&mut self, width: u32, height: u32) {
        self.surface = Some(Canvas::new(width, height));
        self.pipeline.set_viewport(Viewport::new(width, height));
        debug!(width, height, "surface attached");
    }

    /// Viewport change. Ignored until a surface is attached.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(surface) = &mut self.surface {
            surface.resize(width, height);
            self.pipeline.set_viewport(Viewport::new(width, height));
        }
    }

    /// Hosts that cannot report key releases release notes after `hold`
    /// seconds without a press.
    pub fn set_hold_fallback(&mut self, hold: Option<f64>) {
        self.router.set_hold_fallback(hold);
    }

    /// Stop the frame loop and tear the engine down. Idempotent.
    pub fn shutdown(&mut self) {
        if self.halted {
            return;
        }
        self.halted = true;
        self.router.clear();
        self.engine.shutdown();
        info!(frames = self.pipeline.frames(), "visualizer halted");
    }

    pub fn engine(&self) -> &SynthEngine {
        &self.engine
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn sampler(&self) -> &SpectrumSampler {
        &self.sampler
    }

    pub fn surface(&self) -> Option<&Canvas> {
        self.surface.as_ref()
    }

    pub fn mode(&self) -> VisualMode {
        self.pipeline.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        io::{NoAudio, OfflineSink},
        synth::engine::AudioStatus,
        visual::spectrum::SnapshotSource,
    };

    const FRAME: f64 = 1.0 / 64.0;

    fn offline() -> Visualizer {
        Visualizer::with_sink(Config::default(), OfflineSink::factory(8_000.0))
    }

    #[test]
    fn no_surface_skips_frames() {
        let mut vis = offline();
        assert_eq!(vis.tick(FRAME), FrameStatus::Skipped);
        vis.attach_surface(0, 10);
        assert_eq!(vis.tick(FRAME), FrameStatus::Skipped);
        vis.resize(40, 30);
        assert_eq!(vis.tick(FRAME), FrameStatus::Drawn(VisualMode::Bars));
    }

    #[test]
    fn skipped_frames_still_advance_audio() {
        let mut vis = offline();
        vis.note_on('a');
        vis.note_off('a');
        for _ in 0..16 {
            vis.tick(FRAME);
        }
        assert!(!vis.engine().has_voice('a'));
    }

    #[test]
    fn input_events_reach_the_engine() {
        let mut vis = offline();
        vis.input(InputEvent::KeyDown { key: 'd', repeat: false });
        assert_eq!(vis.engine().status(), AudioStatus::Running);
        assert!(vis.engine().has_voice('d'));

        vis.input(InputEvent::KeyDown { key: 'd', repeat: true });
        assert_eq!(vis.engine().active_voices(), 1);

        vis.input(InputEvent::KeyUp { key: 'd' });
        assert!(vis.engine().voice('d').is_some_and(|v| !v.is_held()));
    }

    #[test]
    fn unrecognized_key_still_unlocks_audio() {
        let mut vis = offline();
        vis.input(InputEvent::KeyDown { key: 'x', repeat: false });
        assert_eq!(vis.engine().status(), AudioStatus::Running);
        assert_eq!(vis.engine().active_voices(), 0);
    }

    #[test]
    fn hold_fallback_releases_through_tick() {
        let mut vis = offline();
        vis.set_hold_fallback(Some(0.25));
        vis.input(InputEvent::KeyDown { key: 'f', repeat: false });
        for _ in 0..20 {
            vis.tick(FRAME);
        }
        assert!(vis.engine().voice('f').is_some_and(|v| !v.is_held()));
        for _ in 0..20 {
            vis.tick(FRAME);
        }
        assert!(!vis.engine().has_voice('f'));
    }

    #[test]
    fn invalid_mode_name_selects_bars() {
        let mut vis = offline();
        assert_eq!(vis.set_visual_mode("wave"), VisualMode::Wave);
        assert_eq!(vis.set_visual_mode("kaleidoscope"), VisualMode::Bars);
        assert_eq!(vis.mode(), VisualMode::Bars);
    }

    #[test]
    fn degraded_audio_draws_synthetic_frames() {
        let mut vis = Visualizer::with_sink(Config::default(), NoAudio);
        vis.attach_surface(64, 48);
        assert!(!vis.note_on('q'));
        assert!(vis.note_on('a'));
        assert_eq!(vis.engine().status(), AudioStatus::Unavailable);
        assert_eq!(vis.tick(FRAME), FrameStatus::Drawn(VisualMode::Bars));
        assert_eq!(vis.sampler().source(), SnapshotSource::Synthetic);
    }

    #[test]
    fn shutdown_halts_the_loop() {
        let mut vis = offline();
        vis.attach_surface(32, 32);
        vis.note_on('a');
        vis.note_off('a');
        vis.shutdown();
        vis.shutdown();
        assert_eq!(vis.tick(FRAME), FrameStatus::Halted);
        assert!(!vis.note_on('s'));
        assert_eq!(vis.engine().pending_events(), 0);
        assert_eq!(vis.engine().status(), AudioStatus::Closed);
    }

    #[test]
    fn resize_regenerates_particles() {
        let mut vis = offline();
        vis.set_mode(VisualMode::Particles);
        vis.attach_surface(800, 600);
        vis.tick(FRAME);
        vis.resize(200, 100);
        let field = vis.pipeline().particle_field().expect("field");
        assert_eq!(field.viewport(), Viewport::new(200, 100));
        assert_eq!(field.len(), 100);
    }

    #[test]
    fn non_finite_particle_settings_still_draw() {
        let config = Config::from_toml_str(
            r#"
            [visual.particles]
            speed = inf
            radius_max = inf
            hue_min = nan
            hue_max = nan
            "#,
        )
        .unwrap();
        let mut vis = Visualizer::with_sink(config, NoAudio);
        vis.attach_surface(80, 40);
        vis.set_mode(VisualMode::Particles);
        for _ in 0..3 {
            assert_eq!(vis.tick(FRAME), FrameStatus::Drawn(VisualMode::Particles));
        }
    }
}
