use crate::{
    dsp::{
        envelope::{EnvelopeStage, GainEnvelope},
        oscillator::{Oscillator, Waveform},
    },
    synth::scheduler::TaskHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Attacking,  // Gain ramping 0 -> peak
    Sustaining, // Holding peak while the key is down
    Releasing,  // Key released, gain ramping to 0
    Stopped,    // Silent, waiting to be dropped
}

/// Identifies one voice instance across its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub(crate) u64);

/// Shape shared by every voice the engine creates.
#[derive(Debug, Clone, Copy)]
pub struct VoiceParams {
    pub waveform: Waveform,
    pub peak: f32,
    pub attack: f32,
    pub release: f32,
}

/// One sounding note: an oscillator plus its gain envelope.
#[derive(Debug)]
pub struct ToneVoice {
    id: VoiceId,
    key: char,
    start_time: f64,
    state: VoiceState,
    osc: Oscillator,
    envelope: GainEnvelope,
    release_task: Option<TaskHandle>,
}

impl ToneVoice {
    pub fn start(id: VoiceId, key: char, frequency: f32, now: f64, params: VoiceParams) -> Self {
        Self {
            id,
            key,
            start_time: now,
            state: VoiceState::Attacking,
            osc: Oscillator::new(params.waveform, frequency),
            envelope: GainEnvelope::triggered(now, params.peak, params.attack, params.release),
            release_task: None,
        }
    }

    /// Begin the release ramp. Returns false if the voice was already
    /// releasing or stopped.
    pub fn release(&mut self, now: f64) -> bool {
        if !self.is_held() {
            return false;
        }
        self.envelope.release(now);
        self.state = VoiceState::Releasing;
        true
    }

    /// Silence the voice immediately. Returns the pending release
    /// completion, if any, so the caller can cancel it.
    pub fn stop(&mut self) -> Option<TaskHandle> {
        self.state = VoiceState::Stopped;
        self.release_task.take()
    }

    /// Bring `state` in line with the envelope at time `now`.
    pub fn update(&mut self, now: f64) {
        if self.state == VoiceState::Stopped {
            return;
        }
        self.state = match self.envelope.stage_at(now) {
            EnvelopeStage::Attack => VoiceState::Attacking,
            EnvelopeStage::Sustain => VoiceState::Sustaining,
            EnvelopeStage::Release => VoiceState::Releasing,
            // Stays Releasing until the cleanup event stops it
            EnvelopeStage::Done => VoiceState::Releasing,
        };
    }

    /// Mix this voice into `out`, the first sample being at time `t0`.
    pub fn render_add(&mut self, out: &mut [f32], t0: f64, sample_rate: f32) {
        if self.state == VoiceState::Stopped {
            return;
        }
        let dt = 1.0 / sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            let gain = self.envelope.level_at(t0 + i as f64 * dt);
            *sample += self.osc.next_sample(sample_rate) * gain;
        }
    }

    pub fn gain_at(&self, t: f64) -> f32 {
        if self.state == VoiceState::Stopped {
            return 0.0;
        }
        self.envelope.level_at(t)
    }

    /// The release ramp has reached zero by time `now`.
    pub fn release_finished(&self, now: f64) -> bool {
        self.envelope
            .release_end()
            .map_or(false, |end| now >= end)
    }

    /// Key still down: attacking or sustaining.
    pub fn is_held(&self) -> bool {
        matches!(self.state, VoiceState::Attacking | VoiceState::Sustaining)
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn key(&self) -> char {
        self.key
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn release_end(&self) -> Option<f64> {
        self.envelope.release_end()
    }

    pub(crate) fn set_release_task(&mut self, task: TaskHandle) {
        self.release_task = Some(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> VoiceParams {
        VoiceParams {
            waveform: Waveform::Sine,
            peak: 0.5,
            attack: 0.125,
            release: 0.125,
        }
    }

    #[test]
    fn lifecycle_follows_envelope() {
        let mut voice = ToneVoice::start(VoiceId(1), 'a', 261.63, 0.0, params());
        assert_eq!(voice.state(), VoiceState::Attacking);

        voice.update(0.5);
        assert_eq!(voice.state(), VoiceState::Sustaining);
        assert!((voice.gain_at(0.5) - 0.5).abs() < 1e-6);

        assert!(voice.release(1.0));
        assert!(!voice.release(1.0), "release twice is a no-op");
        assert_eq!(voice.state(), VoiceState::Releasing);
        assert!(!voice.release_finished(1.1));
        assert!(voice.release_finished(1.125));

        voice.set_release_task(TaskHandle::from_raw(7));
        assert_eq!(voice.stop(), Some(TaskHandle::from_raw(7)));
        assert_eq!(voice.stop(), None);
        assert_eq!(voice.state(), VoiceState::Stopped);
        assert_eq!(voice.gain_at(1.0), 0.0);
    }

    #[test]
    fn render_add_mixes_on_top() {
        let mut voice = ToneVoice::start(VoiceId(1), 'h', 440.0, 0.0, params());
        let mut out = vec![1.0f32; 64];
        voice.render_add(&mut out, 1.0, 48_000.0);
        // First sample of a sine is 0, so the existing content is untouched
        assert_eq!(out[0], 1.0);
        assert!(out.iter().any(|&s| s != 1.0));
        assert!(out.iter().all(|&s| (0.5..=1.5).contains(&s)));
    }

    #[test]
    fn stopped_voice_is_silent() {
        let mut voice = ToneVoice::start(VoiceId(1), 'h', 440.0, 0.0, params());
        voice.stop();
        let mut out = vec![0.0f32; 64];
        voice.render_add(&mut out, 1.0, 48_000.0);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
