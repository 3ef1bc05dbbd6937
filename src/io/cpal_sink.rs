//! Device output through cpal.
//!
//! The frame thread renders mono blocks and pushes them into an rtrb ring; the
//! cpal callback drains the ring and duplicates each sample to every channel.
//! An empty ring plays silence, a full ring drops the newest samples.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, PushError, RingBuffer};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tracing::{error, info, warn};

use crate::io::{AudioSink, SinkState};

/// Ring capacity in seconds of audio.
const RING_SECONDS: f32 = 0.5;

pub struct CpalSink {
    stream: cpal::Stream,
    tx: Producer<f32>,
    sample_rate: f32,
    state: SinkState,
    /// Silence queued on resume so the first blocks don't underrun.
    prefill: usize,
    underruns: Arc<AtomicUsize>,
    dropped: usize,
}

impl CpalSink {
    /// Open the default output device. The stream is built paused.
    pub fn open_default(latency_ms: f32) -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let capacity = (sample_rate * RING_SECONDS) as usize;
        let (tx, mut rx) = RingBuffer::<f32>::new(capacity.max(1));

        let underruns = Arc::new(AtomicUsize::new(0));
        let callback_underruns = underruns.clone();

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let mut starved = false;
                    for frame in data.chunks_mut(channels) {
                        let sample = match rx.pop() {
                            Ok(sample) => sample,
                            Err(_) => {
                                starved = true;
                                0.0
                            }
                        };
                        frame.fill(sample);
                    }
                    if starved {
                        callback_underruns.fetch_add(1, Ordering::Relaxed);
                    }
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;
        stream.pause().wrap_err("failed to pause new output stream")?;

        info!(sample_rate, channels, "opened audio output");

        Ok(Self {
            stream,
            tx,
            sample_rate,
            state: SinkState::Suspended,
            prefill: (sample_rate * latency_ms / 1_000.0) as usize,
            underruns,
            dropped: 0,
        })
    }

    /// Number of callbacks that ran out of samples so far.
    pub fn underruns(&self) -> usize {
        self.underruns.load(Ordering::Relaxed)
    }
}

impl AudioSink for CpalSink {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn state(&self) -> SinkState {
        self.state
    }

    fn resume(&mut self) -> EyreResult<()> {
        if self.state == SinkState::Running {
            return Ok(());
        }
        for _ in 0..self.prefill {
            if self.tx.push(0.0).is_err() {
                break;
            }
        }
        self.stream.play().wrap_err("failed to start output stream")?;
        self.state = SinkState::Running;
        info!("audio output running");
        Ok(())
    }

    fn suspend(&mut self) -> EyreResult<()> {
        self.stream.pause().wrap_err("failed to pause output stream")?;
        self.state = SinkState::Suspended;
        let underruns = self.underruns();
        if underruns > 0 {
            warn!(underruns, dropped = self.dropped, "audio output ran dry while running");
        }
        Ok(())
    }

    fn write(&mut self, block: &[f32]) {
        for (written, &sample) in block.iter().enumerate() {
            if let Err(PushError::Full(_)) = self.tx.push(sample) {
                // Drop the remainder of the block
                let lost = block.len() - written;
                self.dropped += lost;
                warn!(lost, total = self.dropped, "audio ring full, dropping samples");
                break;
            }
        }
    }
}
