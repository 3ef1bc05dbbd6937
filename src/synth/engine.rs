/*
Synth Engine
============

The engine owns everything between "a key went down" and "samples reached
the analysis point":

  note_on / note_off ──▶ VoiceRegistry ──▶ mix ──▶ AudioSink
                              │                ╲
                         Scheduler              ▶ Analyser ──▶ byte spectrum
                    (release completions)

Time
----

The engine clock only moves in `advance(dt)`. Rendering, envelope stages and
scheduled events all read that clock, so a test can play a whole note by
calling `advance` a few times, with no real time passing.


Audio Graph Lifecycle
---------------------

  Uninitialized ──first interaction──▶ Suspended ──resume──▶ Running
        │
        └──────────── sink failed to open ──▶ Unavailable

  any state ──shutdown()──▶ Closed

Unavailable is permanent: voices are still tracked and their envelopes still
run against the clock, but nothing renders and the analysis point stays
empty. Closed drops the sink and every pending event; every call after that
is a no-op.


Release Cleanup
---------------

note_off starts the release ramp and schedules a ReleaseComplete event at
`now + release`. The voice stays registered (and keeps sounding) until that
event fires. While it is registered, a second note_on for the same key is
ignored, and a note_off for it is ignored as well, so a voice is never
stopped or removed twice.
*/

use tracing::{debug, info, warn};

use crate::{
    config::{AnalysisConfig, SynthConfig},
    dsp::analyser::Analyser,
    io::{AudioSink, SinkFactory, SinkState},
    notes,
    synth::{
        message::{MessageReceiver, SynthMessage},
        registry::VoiceRegistry,
        scheduler::Scheduler,
        voice::{ToneVoice, VoiceId, VoiceParams},
    },
    MAX_BLOCK_SIZE,
};

/// Observable state of the audio graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStatus {
    Uninitialized,
    Suspended,
    Running,
    Unavailable,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EngineEvent {
    ReleaseComplete { key: char, voice: VoiceId },
}

/// The processing graph: one output plus the shared analysis point.
struct AudioGraph {
    sink: Box<dyn AudioSink>,
    analyser: Analyser,
    sample_rate: f32,
    /// Fractional samples owed from previous advances.
    sample_debt: f64,
    mix_buffer: Vec<f32>,
}

enum GraphSlot {
    Uninitialized,
    Ready(AudioGraph),
    Unavailable,
    Closed,
}

pub struct SynthEngine {
    synth: SynthConfig,
    analysis: AnalysisConfig,
    registry: VoiceRegistry,
    scheduler: Scheduler<EngineEvent>,
    factory: Box<dyn SinkFactory>,
    graph: GraphSlot,
    clock: f64,
    next_voice_id: u64,
}

impl SynthEngine {
    pub fn new(
        synth: SynthConfig,
        analysis: AnalysisConfig,
        factory: impl SinkFactory + 'static,
    ) -> Self {
        Self {
            synth,
            analysis,
            registry: VoiceRegistry::new(),
            scheduler: Scheduler::new(),
            factory: Box::new(factory),
            graph: GraphSlot::Uninitialized,
            clock: 0.0,
            next_voice_id: 0,
        }
    }

    /// Any user interaction: build the audio graph if needed and make sure
    /// the output is running.
    pub fn interact(&mut self) {
        if matches!(self.graph, GraphSlot::Uninitialized) {
            self.graph = match self.factory.open() {
                Ok(sink) => {
                    let sample_rate = sink.sample_rate();
                    info!(sample_rate, "audio graph created");
                    GraphSlot::Ready(AudioGraph {
                        sink,
                        analyser: Analyser::new(&self.analysis),
                        sample_rate,
                        sample_debt: 0.0,
                        mix_buffer: vec![0.0; MAX_BLOCK_SIZE],
                    })
                }
                Err(err) => {
                    warn!("audio unavailable, continuing without sound: {err:#}");
                    GraphSlot::Unavailable
                }
            };
        }

        if let GraphSlot::Ready(graph) = &mut self.graph {
            if graph.sink.state() == SinkState::Suspended {
                if let Err(err) = graph.sink.resume() {
                    warn!("failed to resume audio output: {err:#}");
                }
            }
        }
    }

    /// Start a note. Returns true if a new voice was created.
    pub fn note_on(&mut self, key: char) -> bool {
        if self.is_closed() {
            return false;
        }
        self.interact();

        let Some(note) = notes::lookup(key) else {
            return false;
        };
        if self.registry.has_voice(note.key) {
            return false;
        }

        let id = VoiceId(self.next_voice_id);
        self.next_voice_id += 1;
        let voice = ToneVoice::start(id, note.key, note.frequency, self.clock, self.voice_params());
        debug!(key = %note.key, note = note.name, frequency = note.frequency, "note on");
        self.registry.insert(voice).is_ok()
    }

    /// Release a note. Returns true if a release ramp was started.
    pub fn note_off(&mut self, key: char) -> bool {
        if self.is_closed() {
            return false;
        }
        let Some(key) = notes::normalize(key) else {
            return false;
        };
        let now = self.clock;
        let release = self.synth.release_secs().max(crate::MIN_TIME) as f64;
        let Some(voice) = self.registry.get_mut(key) else {
            return false;
        };
        if !voice.release(now) {
            return false;
        }

        let due = voice.release_end().unwrap_or(now + release);
        let task = self.scheduler.schedule_at(
            due,
            EngineEvent::ReleaseComplete {
                key,
                voice: voice.id(),
            },
        );
        voice.set_release_task(task);
        debug!(key = %key, due, held = now - voice.start_time(), "note off");
        true
    }

    /// Release every held voice.
    pub fn all_notes_off(&mut self) {
        let held: Vec<char> = self
            .registry
            .iter()
            .filter(|voice| voice.is_held())
            .map(|voice| voice.key())
            .collect();
        for key in held {
            self.note_off(key);
        }
    }

    pub fn handle(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { key } => {
                self.note_on(key);
            }
            SynthMessage::NoteOff { key } => {
                self.note_off(key);
            }
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Apply every queued message.
    pub fn drain(&mut self, rx: &mut impl MessageReceiver) {
        while let Some(message) = rx.pop() {
            self.handle(message);
        }
    }

    /// Move the clock forward by `dt` seconds: render audio for the interval,
    /// then fire every scheduled event that has come due.
    pub fn advance(&mut self, dt: f64) {
        if self.is_closed() || !(dt > 0.0) {
            return;
        }
        let target = self.clock + dt;

        if let GraphSlot::Ready(graph) = &mut self.graph {
            if graph.sink.state() == SinkState::Running {
                render_interval(graph, &mut self.registry, self.clock, dt);
            }
        }

        self.clock = target;
        for voice in self.registry.iter_mut() {
            voice.update(target);
        }
        self.fire_due_events();
    }

    fn fire_due_events(&mut self) {
        while let Some((task, event)) = self.scheduler.pop_due(self.clock) {
            match event {
                EngineEvent::ReleaseComplete { key, voice } => {
                    let finished = self
                        .registry
                        .get(key)
                        .map_or(false, |v| v.id() == voice && v.release_finished(self.clock));
                    if !finished {
                        debug!(key = %key, ?task, "stale release completion ignored");
                        continue;
                    }
                    if let Some(mut voice) = self.registry.remove_if(key, voice) {
                        // The completion just fired, nothing left to cancel
                        voice.stop();
                        debug!(key = %key, "voice removed");
                    }
                }
            }
        }
    }

    /// Copy the analysis point's current byte magnitudes into `out`.
    ///
    /// Returns false (leaving `out` untouched) when there is no audio graph.
    pub fn analysis(&mut self, out: &mut [u8]) -> bool {
        match &mut self.graph {
            GraphSlot::Ready(graph) => {
                graph.analyser.byte_frequency_data(out);
                true
            }
            _ => false,
        }
    }

    /// Tear down: cancel pending events, silence and drop every voice, close
    /// the output. Idempotent.
    pub fn shutdown(&mut self) {
        if self.is_closed() {
            return;
        }
        let mut cancelled = 0;
        for mut voice in self.registry.drain() {
            if let Some(task) = voice.stop() {
                if self.scheduler.cancel(task) {
                    cancelled += 1;
                }
            }
        }
        debug_assert!(self.scheduler.is_empty(), "release event outlived its voice");
        if let GraphSlot::Ready(graph) = &mut self.graph {
            if let Err(err) = graph.sink.suspend() {
                warn!("failed to stop audio output: {err:#}");
            }
        }
        self.graph = GraphSlot::Closed;
        info!(cancelled, "synth engine shut down");
    }

    pub fn status(&self) -> AudioStatus {
        match &self.graph {
            GraphSlot::Uninitialized => AudioStatus::Uninitialized,
            GraphSlot::Ready(graph) => match graph.sink.state() {
                SinkState::Suspended => AudioStatus::Suspended,
                SinkState::Running => AudioStatus::Running,
            },
            GraphSlot::Unavailable => AudioStatus::Unavailable,
            GraphSlot::Closed => AudioStatus::Closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.graph, GraphSlot::Closed)
    }

    pub fn has_voice(&self, key: char) -> bool {
        notes::normalize(key).map_or(false, |key| self.registry.has_voice(key))
    }

    pub fn voice(&self, key: char) -> Option<&ToneVoice> {
        notes::normalize(key).and_then(|key| self.registry.get(key))
    }

    pub fn active_voices(&self) -> usize {
        self.registry.len()
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    /// Combined envelope gain of every voice at the current clock.
    pub fn output_gain(&self) -> f32 {
        self.registry.iter().map(|v| v.gain_at(self.clock)).sum()
    }

    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn bin_count(&self) -> usize {
        self.analysis.bin_count()
    }

    fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            waveform: self.synth.waveform,
            peak: self.synth.peak_gain,
            attack: self.synth.attack_secs(),
            release: self.synth.release_secs(),
        }
    }
}

impl Drop for SynthEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Render `dt` seconds starting at `start` into the sink and analyser.
fn render_interval(graph: &mut AudioGraph, registry: &mut VoiceRegistry, start: f64, dt: f64) {
    let exact = dt * graph.sample_rate as f64 + graph.sample_debt;
    let total = exact.floor() as usize;
    graph.sample_debt = exact - total as f64;

    let sample_period = 1.0 / graph.sample_rate as f64;
    let mut rendered = 0;
    while rendered < total {
        let frames = (total - rendered).min(MAX_BLOCK_SIZE);
        let block = &mut graph.mix_buffer[..frames];
        block.fill(0.0);

        let t0 = start + rendered as f64 * sample_period;
        for voice in registry.iter_mut() {
            voice.render_add(block, t0, graph.sample_rate);
        }
        for sample in block.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }

        graph.sink.write(block);
        graph.analyser.write(block);
        rendered += frames;
    }
}
