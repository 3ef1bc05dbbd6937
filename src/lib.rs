pub mod config; // Typed settings loaded from TOML
pub mod dsp;
pub mod input; // Key/pointer events -> note messages
pub mod io;
pub mod notes;
pub mod runtime; // Cooperative frame driver
pub mod synth; // Voice lifecycle and the shared analysis point
pub mod visual; // Spectrum sampling and draw styles

pub use config::Config;
pub use runtime::{FrameStatus, Visualizer};
pub use synth::engine::{AudioStatus, SynthEngine};
pub use visual::VisualMode;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
