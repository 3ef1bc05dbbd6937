use clap::Parser;
use std::path::PathBuf;

use tonescope::{dsp::oscillator::Waveform, Config, VisualMode};

#[derive(Parser, Debug)]
#[command(name = "tonescope")]
#[command(about = "Play tones on the home row and watch their spectrum", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Initial visual mode: bars, circular, wave or particles
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Oscillator waveform: sine, square, sawtooth or triangle
    #[arg(short, long)]
    pub waveform: Option<String>,

    /// Run without opening an audio device
    #[arg(long)]
    pub no_audio: bool,

    /// Frame rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line values override the file.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = &self.mode {
            config.visual.mode = VisualMode::parse_lossy(mode);
        }
        if let Some(waveform) = &self.waveform {
            config.synth.waveform = Waveform::parse_lossy(waveform);
        }
        if let Some(fps) = self.fps {
            config.visual.fps = fps;
        }
        config.sanitized()
    }
}
