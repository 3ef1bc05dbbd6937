//! tonescope - play tones from the keyboard and watch them in the terminal
//!
//! Run with: cargo run -- --mode particles

mod app;
mod cli;
mod ui;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use std::fs::File;
use std::sync::Mutex;
use tracing::{info, Level};

use app::App;
use cli::Cli;
use tonescope::{io::NoAudio, Config, Visualizer};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = cli.apply(config);
    info!(mode = %config.visual.mode, fps = config.visual.fps, "starting");

    let vis = if cli.no_audio {
        Visualizer::with_sink(config.clone(), NoAudio)
    } else {
        Visualizer::new(config.clone())
    };

    let mut terminal = ratatui::init();
    let result = App::new(vis, &config).run(&mut terminal);
    ratatui::restore();
    result
}

/// The UI owns the terminal, so logs only go to a file when one is given.
fn init_logging(cli: &Cli) -> EyreResult<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
