mod app;
mod behavior;
mod clock;
mod color;
mod config;
mod generate;
mod model;
mod raster;
mod render;
mod surface;
mod term;
mod vector;
mod weeds;

use anyhow::{Context, Result};
use clap::Parser;
use config::Args;
use std::{fs::File, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;

/// The terminal is the render target, so logs only go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("could not create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("could not install log subscriber: {e}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    app::run(&args)
}
