use anyhow::{ensure, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "aquarium")]
#[command(about = "Procedural aquarium: fish, bubbles and swaying weeds in braille", long_about = None)]
pub(crate) struct Args {
    /// Number of fish
    #[arg(long)]
    pub(crate) fish: Option<usize>,

    /// Number of weeds
    #[arg(long)]
    pub(crate) weeds: Option<usize>,

    /// Milliseconds between behaviour decisions
    #[arg(long)]
    pub(crate) behavior_ms: Option<u64>,

    /// Frame cap; 0 renders as fast as the terminal keeps up
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// Scene pixels per braille dot
    #[arg(long)]
    pub(crate) scale: Option<f64>,

    /// RNG seed; random when omitted
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// JSON settings file; flags given on the command line win
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Write logs here (RUST_LOG filters, default info)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) fish_count: usize,
    pub(crate) weed_count: usize,
    pub(crate) behavior_period_ms: u64,
    pub(crate) fps_cap: u32,
    pub(crate) pixels_per_dot: f64,
    pub(crate) seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fish_count: 5,
            weed_count: 20,
            behavior_period_ms: 300,
            fps_cap: 0,
            pixels_per_dot: 4.0,
            seed: None,
        }
    }
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.pixels_per_dot.is_finite() && self.pixels_per_dot > 0.0,
            "scale must be a positive number, got {}",
            self.pixels_per_dot
        );
        ensure!(self.behavior_period_ms >= 1, "behaviour period must be at least 1 ms");
        Ok(())
    }
}

pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    let s = fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("invalid settings in {}", path.display()))
}

/// Defaults, then the settings file, then explicit flags.
pub(crate) fn resolve(args: &Args) -> Result<Settings> {
    let mut s = match &args.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    if let Some(v) = args.fish {
        s.fish_count = v;
    }
    if let Some(v) = args.weeds {
        s.weed_count = v;
    }
    if let Some(v) = args.behavior_ms {
        s.behavior_period_ms = v;
    }
    if let Some(v) = args.fps {
        s.fps_cap = v;
    }
    if let Some(v) = args.scale {
        s.pixels_per_dot = v;
    }
    if args.seed.is_some() {
        s.seed = args.seed;
    }
    s.validate()?;
    Ok(s)
}
