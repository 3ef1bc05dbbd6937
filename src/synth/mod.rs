// Purpose: voice lifecycle, release scheduling, and the shared analysis point
// This layer sits above the dsp primitives and below the frame driver

pub mod engine;
pub mod message;
pub mod registry;
pub mod scheduler;
pub mod voice;

pub use engine::{AudioStatus, SynthEngine};
pub use message::SynthMessage;
pub use voice::{ToneVoice, VoiceState};
