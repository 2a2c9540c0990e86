use crate::generate::generate_bubble;
use crate::model::SimulationState;
use crate::vector::Vector2;
use rand::Rng;
use tracing::debug;

/// Outcome of one behaviour tick, for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TickReport {
    pub(crate) headings_changed: usize,
    pub(crate) gazes_changed: usize,
    pub(crate) bubbles_spawned: usize,
    pub(crate) bubbles_culled: usize,
}

/// New heading with each axis in [0, 1], flipped on every axis the fish was
/// already moving positively along. Near an edge this points back inward.
fn turn_around<R: Rng + ?Sized>(rng: &mut R, current: Vector2) -> Vector2 {
    let mut x: f64 = rng.gen();
    let mut y: f64 = rng.gen();
    if current.x > 0.0 {
        x = -x;
    }
    if current.y > 0.0 {
        y = -y;
    }
    Vector2::new(x, y)
}

fn random_gaze<R: Rng + ?Sized>(rng: &mut R) -> Vector2 {
    Vector2::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5)
}

/// The slow decision tick: per fish, maybe turn, maybe look elsewhere, maybe
/// blow a bubble. Bubbles that left the surface are dropped afterwards; this
/// is the only place bubbles are removed.
pub(crate) fn behavior_tick<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) -> TickReport {
    let mut report = TickReport::default();
    let bounds = state.bounds;
    let rules = &state.rules;

    for fish in &mut state.fish {
        let out_of_bounds = !bounds.contains(fish.position);
        let change_heading = rng.gen_bool(rules.heading_change_chance) || out_of_bounds;
        let change_gaze = rng.gen_bool(rules.gaze_change_chance);
        let make_bubble = rng.gen_bool(rules.bubble_chance);

        if change_heading {
            fish.move_dir = turn_around(rng, fish.move_dir);
            report.headings_changed += 1;
        }
        if change_gaze {
            fish.look_dir = random_gaze(rng);
            report.gazes_changed += 1;
        }
        if make_bubble {
            state.bubbles.push(generate_bubble(rng, fish));
            report.bubbles_spawned += 1;
        }
    }

    let before = state.bubbles.len();
    state.bubbles.retain(|b| bounds.contains(b.position));
    report.bubbles_culled = before - state.bubbles.len();

    debug!(
        headings = report.headings_changed,
        gazes = report.gazes_changed,
        spawned = report.bubbles_spawned,
        culled = report.bubbles_culled,
        live = state.bubbles.len(),
        "behavior tick"
    );
    report
}
