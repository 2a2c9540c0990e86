use crate::color::ColorRanges;
use crate::model::{Bounds, Bubble, Fish, FishKind, Weed};
use crate::vector::Vector2;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

pub(crate) const FISH_SIZE: (f64, f64) = (30.0, 200.0);
pub(crate) const FISH_SPEED: (f64, f64) = (0.05, 0.3);
pub(crate) const FISH_PUPIL_RATIO: (f64, f64) = (0.6, 0.8);
pub(crate) const FLOATER_PHASE: (f64, f64) = (0.0, 3.0);

pub(crate) const WEED_LENGTH: (f64, f64) = (100.0, 500.0);
pub(crate) const WEED_WIDTH: (f64, f64) = (4.0, 7.0);
pub(crate) const WEED_LAYER: (f64, f64) = (0.0, 3.0);
pub(crate) const WEED_BEND: (f64, f64) = (8.0, 20.0);
pub(crate) const WEED_SEGMENT: (f64, f64) = (30.0, 40.0);
/// Weeds are rooted in a band this deep just below the bottom edge.
pub(crate) const WEED_ROOT_DEPTH: f64 = 20.0;

pub(crate) const BUBBLE_MIN_RADIUS: f64 = 2.0;

pub(crate) fn fish_colors() -> ColorRanges {
    ColorRanges {
        red: 150..=255,
        green: 0..=150,
        blue: 0..=150,
    }
}

pub(crate) fn weed_colors() -> ColorRanges {
    ColorRanges {
        red: 0..=10,
        green: 50..=80,
        blue: 20..=60,
    }
}

/// Uniform in `[min, max)`; degenerate ranges collapse to `min`.
fn in_range<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

fn signed_unit<R: Rng + ?Sized>(rng: &mut R) -> Vector2 {
    Vector2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0))
}

pub(crate) fn generate_fish<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    bounds: Bounds,
    kinds: &'static [FishKind],
) -> Vec<Fish> {
    let colors = fish_colors();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(kind) = kinds.choose(rng) else {
            break;
        };
        let fish = Fish {
            position: Vector2::new(
                in_range(rng, (0.0, bounds.width)),
                in_range(rng, (0.0, bounds.height)),
            ),
            move_dir: signed_unit(rng),
            look_dir: signed_unit(rng),
            size: in_range(rng, FISH_SIZE),
            speed: in_range(rng, FISH_SPEED),
            pupil_ratio: in_range(rng, FISH_PUPIL_RATIO),
            kind,
            color: colors.sample(rng),
            floater_phase: in_range(rng, FLOATER_PHASE).round(),
        };
        debug!(size = fish.size, color = %fish.color, "fish spawned");
        out.push(fish);
    }
    out
}

/// Generates weeds rooted just below the bottom edge, sorted by layer.
pub(crate) fn generate_weeds<R: Rng + ?Sized>(rng: &mut R, count: usize, bounds: Bounds) -> Vec<Weed> {
    let colors = weed_colors();
    let mut out: Vec<Weed> = (0..count)
        .map(|_| Weed {
            length: in_range(rng, WEED_LENGTH),
            width: in_range(rng, WEED_WIDTH),
            layer: in_range(rng, WEED_LAYER).round() as i32,
            bend_distance: in_range(rng, WEED_BEND),
            segment_length: in_range(rng, WEED_SEGMENT),
            color: colors.sample(rng),
            position: Vector2::new(
                in_range(rng, (0.0, bounds.width)),
                in_range(rng, (bounds.height, bounds.height + WEED_ROOT_DEPTH)),
            ),
        })
        .collect();
    out.sort_by_key(|w| w.layer);
    out
}

/// A bubble released half a body length ahead of the fish, on the side it
/// is swimming towards.
pub(crate) fn generate_bubble<R: Rng + ?Sized>(rng: &mut R, fish: &Fish) -> Bubble {
    let offset = if fish.move_dir.x > 0.0 {
        fish.size / 2.0
    } else {
        -fish.size / 2.0
    };
    Bubble {
        position: Vector2::new(fish.position.x + offset, fish.position.y),
        radius: in_range(rng, (BUBBLE_MIN_RADIUS, fish.size / 10.0)),
    }
}
