//! Audio output seam.
//!
//! The engine never talks to a device directly. It asks a [`SinkFactory`] for
//! an [`AudioSink`] on first interaction and writes rendered mono blocks into
//! it; whatever sits behind the sink (a cpal stream, a capture buffer) is the
//! host's business.

#[cfg(feature = "rtrb")]
pub mod cpal_sink;

use color_eyre::eyre::{eyre, Result as EyreResult};

#[cfg(feature = "rtrb")]
pub use cpal_sink::CpalSink;

/// Playback state of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Opened but not playing (autoplay-style restrictions, or built paused).
    Suspended,
    Running,
}

pub trait AudioSink {
    fn sample_rate(&self) -> f32;

    fn state(&self) -> SinkState;

    /// Start (or restart) playback.
    fn resume(&mut self) -> EyreResult<()>;

    /// Stop playback without closing the output.
    fn suspend(&mut self) -> EyreResult<()> {
        Ok(())
    }

    /// Queue one block of mono samples.
    fn write(&mut self, block: &[f32]);
}

/// Opens the output the engine renders into.
///
/// Any `FnMut() -> EyreResult<Box<dyn AudioSink>>` closure is a factory.
pub trait SinkFactory {
    fn open(&mut self) -> EyreResult<Box<dyn AudioSink>>;
}

impl<F> SinkFactory for F
where
    F: FnMut() -> EyreResult<Box<dyn AudioSink>>,
{
    fn open(&mut self) -> EyreResult<Box<dyn AudioSink>> {
        self()
    }
}

/// Factory for hosts without audio: every open fails, so the engine degrades
/// to silent bookkeeping and synthetic spectra.
pub struct NoAudio;

impl SinkFactory for NoAudio {
    fn open(&mut self) -> EyreResult<Box<dyn AudioSink>> {
        Err(eyre!("audio output disabled"))
    }
}

/// Factory for the system's default output device.
#[cfg(feature = "rtrb")]
pub fn default_output(latency_ms: f32) -> impl SinkFactory {
    move || -> EyreResult<Box<dyn AudioSink>> { Ok(Box::new(CpalSink::open_default(latency_ms)?)) }
}

/// Sink that keeps everything written to it. Starts suspended, like a
/// freshly created device stream.
#[derive(Debug, Clone)]
pub struct OfflineSink {
    sample_rate: f32,
    state: SinkState,
    captured: Vec<f32>,
    /// Only the most recent `capacity` samples are kept.
    capacity: usize,
}

impl OfflineSink {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_capacity(sample_rate, usize::MAX)
    }

    pub fn with_capacity(sample_rate: f32, capacity: usize) -> Self {
        Self {
            sample_rate,
            state: SinkState::Suspended,
            captured: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn captured(&self) -> &[f32] {
        &self.captured
    }

    /// Factory producing a fresh offline sink per open.
    pub fn factory(sample_rate: f32) -> impl SinkFactory {
        move || -> EyreResult<Box<dyn AudioSink>> { Ok(Box::new(OfflineSink::new(sample_rate))) }
    }
}

impl AudioSink for OfflineSink {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn state(&self) -> SinkState {
        self.state
    }

    fn resume(&mut self) -> EyreResult<()> {
        self.state = SinkState::Running;
        Ok(())
    }

    fn suspend(&mut self) -> EyreResult<()> {
        self.state = SinkState::Suspended;
        Ok(())
    }

    fn write(&mut self, block: &[f32]) {
        self.captured.extend_from_slice(block);
        if self.captured.len() > self.capacity {
            let excess = self.captured.len() - self.capacity;
            self.captured.drain(0..excess);
        }
    }
}
