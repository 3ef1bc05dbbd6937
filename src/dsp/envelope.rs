use crate::MIN_TIME;

/*
Attack/Release Gain Envelope
============================

Each note is shaped by two straight-line ramps:

  Level
   peak ┐     ___________________
        │    ╱                   ╲
        │   ╱                     ╲
    0.0 └──╱───────────────────────╲──→ Time
         start  +attack      release  +release
          Attack    Sustain          Release

Unlike a per-sample state machine, this envelope is evaluated as a function
of time. The engine clock is the only source of truth: `level_at(t)` answers
"what is the gain at time t" for any t, which lets the same envelope drive
rendered audio and silent bookkeeping (when no audio device is present).


Release From Anywhere
---------------------

`release(t)` snapshots the level at `t` and ramps from there to zero. A key
released halfway through its attack therefore fades from half the peak
instead of jumping to the peak first, which would click.


Stages
------

  Attack   start <= t < start + attack
  Sustain  holding the peak, gate still high
  Release  release_start <= t < release_start + release
  Done     the release ramp has reached zero
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Sustain,
    Release,
    Done,
}

#[derive(Debug, Clone)]
pub struct GainEnvelope {
    peak: f32,
    attack_time: f32,
    release_time: f32,

    start: f64,
    // Set once the gate goes low
    release_start: Option<f64>,
    release_level: f32,
}

impl GainEnvelope {
    /// Start a new envelope at time `start`.
    pub fn triggered(start: f64, peak: f32, attack: f32, release: f32) -> Self {
        Self {
            peak: peak.clamp(0.0, 1.0),
            attack_time: attack.max(MIN_TIME),
            release_time: release.max(MIN_TIME),
            start,
            release_start: None,
            release_level: 0.0,
        }
    }

    /// Gate low: begin the release ramp from the level at `now`.
    ///
    /// Releasing twice is ignored; the first ramp keeps running.
    pub fn release(&mut self, now: f64) {
        if self.release_start.is_some() {
            return;
        }
        self.release_level = self.level_at(now);
        self.release_start = Some(now.max(self.start));
    }

    pub fn level_at(&self, t: f64) -> f32 {
        if let Some(release_start) = self.release_start {
            if t >= release_start {
                let progress = ((t - release_start) / self.release_time as f64) as f32;
                return (self.release_level * (1.0 - progress)).max(0.0);
            }
        }

        if t <= self.start {
            return 0.0;
        }
        let progress = ((t - self.start) / self.attack_time as f64) as f32;
        self.peak * progress.min(1.0)
    }

    pub fn stage_at(&self, t: f64) -> EnvelopeStage {
        match self.release_start {
            Some(release_start) if t >= release_start => {
                if t >= self.release_end().unwrap_or(release_start) {
                    EnvelopeStage::Done
                } else {
                    EnvelopeStage::Release
                }
            }
            _ if t < self.start + self.attack_time as f64 => EnvelopeStage::Attack,
            _ => EnvelopeStage::Sustain,
        }
    }

    /// Time at which the release ramp reaches zero, once released.
    pub fn release_end(&self) -> Option<f64> {
        self.release_start
            .map(|release_start| release_start + self.release_time as f64)
    }

    /// Write the gain for consecutive samples starting at `t0`.
    pub fn render(&self, buffer: &mut [f32], t0: f64, sample_rate: f32) {
        let dt = 1.0 / sample_rate as f64;
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = self.level_at(t0 + i as f64 * dt);
        }
    }
}
