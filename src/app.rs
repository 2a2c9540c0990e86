use crate::behavior::{behavior_tick, TickReport};
use crate::clock::{Clock, FixedDelay, SystemClock};
use crate::config::{resolve, Args, Settings};
use crate::generate::{generate_fish, generate_weeds};
use crate::model::{Bounds, Rules, SimulationState, FISH_KINDS};
use crate::raster::RasterSurface;
use crate::render::render_frame;
use crate::surface::Surface;
use crate::term::{Terminal, SUB_X, SUB_Y};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Controller owning the simulation state and the two cadences that share it.
pub(crate) struct Aquarium {
    state: SimulationState,
    rng: StdRng,
    behavior: FixedDelay,
}

impl Aquarium {
    pub(crate) fn new(settings: &Settings, bounds: Bounds, now_ms: f64) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        info!(seed, "seeding rng");
        let mut rng = StdRng::seed_from_u64(seed);

        let mut state = SimulationState::new(bounds, Rules::default(), now_ms);
        state.fish = generate_fish(&mut rng, settings.fish_count, bounds, &FISH_KINDS);
        state.add_weeds(generate_weeds(&mut rng, settings.weed_count, bounds));

        Self {
            state,
            rng,
            behavior: FixedDelay::new(settings.behavior_period_ms as f64, now_ms),
        }
    }

    /// Runs the behaviour tick if it is due, then one render frame. Both run
    /// on the caller's thread, so they interleave but never overlap.
    pub(crate) fn step<S: Surface + ?Sized>(&mut self, surface: &mut S, now_ms: f64) -> Option<TickReport> {
        let report = self
            .behavior
            .poll(now_ms)
            .then(|| behavior_tick(&mut self.state, &mut self.rng));
        render_frame(&mut self.state, surface, &mut self.rng, now_ms);
        report
    }
}

/// Drains pending terminal events; true once a quit key was pressed.
fn quit_requested() -> Result<bool> {
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(KeyEvent {
                code, modifiers, kind, ..
            }) if kind == KeyEventKind::Press => match code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(true),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
                _ => {}
            },
            Event::Resize(w, h) => debug!(w, h, "resize ignored"),
            _ => {}
        }
    }
    Ok(false)
}

fn run_loop<C: Clock>(clock: &C, term: &mut Terminal, settings: &Settings) -> Result<()> {
    let device_w = term.cols as usize * SUB_X;
    let device_h = term.rows as usize * SUB_Y;
    let mut surface = RasterSurface::new(device_w, device_h, settings.pixels_per_dot);
    let bounds = Bounds::new(
        device_w as f64 * settings.pixels_per_dot,
        device_h as f64 * settings.pixels_per_dot,
    );
    info!(
        cols = term.cols,
        rows = term.rows,
        width = bounds.width,
        height = bounds.height,
        fish = settings.fish_count,
        weeds = settings.weed_count,
        "aquarium started"
    );

    let mut aquarium = Aquarium::new(settings, bounds, clock.now_ms());
    let frame_budget = (settings.fps_cap > 0).then(|| Duration::from_secs_f64(1.0 / settings.fps_cap as f64));

    loop {
        let frame_start = Instant::now();
        if quit_requested()? {
            break;
        }

        aquarium.step(&mut surface, clock.now_ms());
        term.present(surface.canvas())?;

        if let Some(budget) = frame_budget {
            let spent = frame_start.elapsed();
            if spent < budget {
                std::thread::sleep(budget - spent);
            }
        }
    }
    info!("aquarium stopped");
    Ok(())
}

pub(crate) fn run(args: &Args) -> Result<()> {
    let settings = resolve(args)?;
    let clock = SystemClock::new();
    let mut term = Terminal::begin()?;
    run_loop(&clock, &mut term, &settings)
}
