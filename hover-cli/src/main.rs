use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hover_core::{QueueManager, RepeatMode, RngSource, browser};

mod config;
mod logger;
mod shell;

use config::Settings;
use shell::Shell;

#[derive(Debug, Parser)]
#[command(name = "hover", version, about = "Drive a media playback queue from the terminal")]
struct Args {
    /// Media files or directories to queue
    paths: Vec<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible shuffle order
    #[arg(long)]
    seed: Option<u64>,

    /// Start with shuffle enabled
    #[arg(long)]
    shuffle: bool,

    /// Initial repeat mode: off, one or all
    #[arg(long)]
    repeat: Option<RepeatMode>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    settings.validate().map_err(anyhow::Error::msg)?;
    logger::setup_logging(&settings.log)?;

    log::info!("Starting hover");

    let manager = build_manager(&args, &settings)?;
    let mut shell = Shell::new(manager, io::stdout().lock(), settings.library.scan_options());
    shell.run(io::stdin().lock())
}

fn build_manager(args: &Args, settings: &Settings) -> anyhow::Result<QueueManager> {
    let rng = match args.seed.or(settings.playback.seed) {
        Some(seed) => {
            log::debug!("Using shuffle seed {}", seed);
            RngSource::seeded(seed)
        }
        None => RngSource::from_entropy(),
    };
    let mut manager = QueueManager::with_random_source(Box::new(rng));
    manager.set_shuffle_wraps(settings.playback.shuffle_wraps);
    manager.set_repeat_mode(args.repeat.unwrap_or(settings.playback.repeat_mode));

    if !args.paths.is_empty() {
        let entries = browser::scan(&args.paths, &settings.library.scan_options())?;
        if entries.is_empty() {
            log::warn!("No playable media found in the given paths");
        } else {
            manager.set_queue(entries)?;
        }
    }

    if args.shuffle || settings.playback.shuffle {
        manager.set_shuffle_mode(true);
    }

    Ok(manager)
}
