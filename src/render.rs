use crate::color::{RgbColor, Rgba};
use crate::model::{Bubble, Fish, FishKind, Rules, SimulationState};
use crate::surface::{Affine, LineJoin, Surface};
use crate::weeds::draw_weeds;
use rand::Rng;
use std::f64::consts::{PI, TAU};

const FISH_OUTLINE: Rgba = Rgba::from_hex(0xFFFFFF25);
const FISH_OUTLINE_WIDTH: f64 = 10.0;
const EYE_WHITE: Rgba = Rgba::from_hex(0xFFFFFF88);
const PUPIL: Rgba = Rgba::from_hex(0x001242FF);
const BUBBLE_OUTLINE: Rgba = Rgba::from_hex(0xFFFFFF44);
const BUBBLE_OUTLINE_WIDTH: f64 = 4.0;
const BUBBLE_SHIMMER: f64 = 0.5;
const ANCHOR: Rgba = Rgba::from_hex(0x00000044);

/// Frame-level inputs shared by the draw helpers.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame {
    pub(crate) now_ms: f64,
    pub(crate) delta_ms: f64,
}

/// One render tick: advances continuous motion by the wall-clock time since
/// the previous frame, then draws background, anchor, fish, bubbles and
/// weeds in that order.
pub(crate) fn render_frame<S, R>(state: &mut SimulationState, surface: &mut S, rng: &mut R, now_ms: f64) -> Frame
where
    S: Surface + ?Sized,
    R: Rng + ?Sized,
{
    // a clock that stepped back yields a still frame rather than reverse motion
    let frame = Frame {
        now_ms,
        delta_ms: (now_ms - state.last_frame_ms).max(0.0),
    };
    state.last_frame_ms = now_ms;

    let bounds = state.bounds;
    surface.reset_transform();
    surface.set_fill_color(background_color(now_ms).opaque());
    surface.fill_rect(0.0, 0.0, bounds.width, bounds.height);

    draw_anchor(surface, bounds.width / 2.0, bounds.height - 500.0, 380.0);
    draw_fishes(surface, &mut state.fish, frame);
    draw_bubbles(surface, rng, &mut state.bubbles, &state.rules, frame);
    draw_weeds(surface, rng, state.weeds(), bounds, now_ms);
    frame
}

/// Slow day/night drift: red off, green and blue on their own sinusoids.
pub(crate) fn background_color(now_ms: f64) -> RgbColor {
    let g = (now_ms / 3000.0 + 10.0).sin() * 30.0;
    let b = (now_ms / 2000.0).sin() * 30.0 + 20.0;
    RgbColor::from_f64(0.0, g, b)
}

pub(crate) fn draw_anchor<S: Surface + ?Sized>(surface: &mut S, x: f64, y: f64, length: f64) {
    const WIDTH: f64 = 33.0;
    const PLANK_LENGTH: f64 = 180.0;
    const PLANK_WIDTH: f64 = 25.0;
    const PLANK_OFFSET: f64 = 80.0;
    const RING_CENTER_Y: f64 = -45.0;

    surface.rotate(PI / 20.0);
    surface.translate(x, y);

    surface.set_fill_color(ANCHOR);
    surface.fill_rect(-PLANK_LENGTH / 2.0, PLANK_OFFSET, PLANK_LENGTH / 2.0, PLANK_WIDTH);
    surface.fill_rect(WIDTH, PLANK_OFFSET, PLANK_LENGTH / 2.0, PLANK_WIDTH);

    surface.begin_path();
    surface.rect(0.0, 0.0, WIDTH, length);
    surface.move_to(WIDTH / 2.0 + 50.0, RING_CENTER_Y);
    surface.arc(WIDTH / 2.0, RING_CENTER_Y, 50.0, 0.0, TAU, false);
    surface.move_to(WIDTH / 2.0 + 30.0, RING_CENTER_Y);
    surface.arc(WIDTH / 2.0, RING_CENTER_Y, 30.0, TAU, 0.0, true);
    surface.fill();

    surface.translate(WIDTH / 2.0, length);

    surface.begin_path();
    surface.move_to(0.0, 0.0);
    draw_shoulder(surface, -1.0);
    surface.move_to(0.0, 0.0);
    draw_shoulder(surface, 1.0);
    surface.fill();

    surface.reset_transform();
}

fn draw_shoulder<S: Surface + ?Sized>(surface: &mut S, dir: f64) {
    const W: f64 = 180.0;
    const H: f64 = 120.0;

    surface.quadratic_curve_to(W * 1.2 * dir, 0.0, W * dir, -H);
    surface.line_to(W * dir * 0.9, -H);
    surface.line_to(W * dir, -H - 50.0);
    surface.quadratic_curve_to(W * 1.5 * dir, 0.0, 0.0, 80.0);
}

pub(crate) fn draw_fishes<S: Surface + ?Sized>(surface: &mut S, fishes: &mut [Fish], frame: Frame) {
    for fish in fishes {
        fish.position = fish.position.move_along(fish.move_dir, fish.speed * frame.delta_ms);
        let flip = fish.move_dir.x < 0.0;
        draw_fish(surface, fish, flip, 0.0, frame.now_ms);
    }
}

/// Idle wiggle, independent of frame delta.
fn wobble(now_ms: f64, phase: f64) -> f64 {
    (now_ms / 1000.0 + phase).sin()
}

pub(crate) fn draw_fish<S: Surface + ?Sized>(surface: &mut S, fish: &Fish, flip: bool, rotation: f64, now_ms: f64) {
    let size = fish.size;
    let kind: &FishKind = fish.kind;
    let body_length = size * kind.body_length;

    surface.translate(fish.position.x, fish.position.y);
    surface.rotate(rotation);
    if flip {
        surface.transform(Affine::new(-1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
    }

    surface.set_fill_color(fish.color.opaque());
    surface.set_line_width(FISH_OUTLINE_WIDTH);
    surface.set_line_join(LineJoin::Round);
    surface.set_stroke_color(FISH_OUTLINE);

    surface.begin_path();
    top_floater(surface, body_length * 0.2, -size * 0.15, body_length, kind.top_floater_height * size);
    surface.fill();
    surface.stroke();

    surface.begin_path();
    body(surface, -body_length * 0.5, 0.0, size, body_length);
    surface.fill();
    surface.stroke();

    surface.begin_path();
    tail(surface, -body_length * 0.4, 0.0, size * kind.tail_width, size * kind.tail_length, now_ms);
    floater(
        surface,
        body_length * 0.05,
        size * 0.1,
        size * kind.main_floater_length,
        fish.floater_phase,
        now_ms,
    );
    surface.fill();
    surface.stroke();

    eye(surface, fish, body_length * 0.2, -size * 0.05, size * kind.eye_size);

    surface.reset_transform();
}

fn top_floater<S: Surface + ?Sized>(surface: &mut S, x: f64, y: f64, size: f64, height: f64) {
    surface.move_to(x, y);
    surface.line_to(x - size * 0.35, y - height);
    surface.line_to(x - size * 0.7, 0.0);
}

fn body<S: Surface + ?Sized>(surface: &mut S, x: f64, y: f64, height: f64, length: f64) {
    surface.move_to(x, y);
    surface.quadratic_curve_to(x + length / 2.0, y + height / 2.0, x + length, y);
    surface.quadratic_curve_to(x + length / 2.0, y - height / 2.0, x, y);
}

fn tail<S: Surface + ?Sized>(surface: &mut S, x: f64, y: f64, end_width: f64, length: f64, now_ms: f64) {
    let shift = wobble(now_ms, 0.0) * length * 0.1;
    surface.move_to(x, y);
    surface.quadratic_curve_to(x, y + end_width / 3.0, x - length, y + end_width / 2.0 + shift);
    surface.quadratic_curve_to(x - 0.5 * length, y, x - length, y - end_width / 2.0 + shift);
    surface.quadratic_curve_to(x, y - end_width / 3.0, x, y);
}

fn floater<S: Surface + ?Sized>(surface: &mut S, x: f64, y: f64, size: f64, phase: f64, now_ms: f64) {
    let shift = wobble(now_ms, phase) * 0.1 * size;
    surface.move_to(x, y);
    surface.quadratic_curve_to(x, y - size * 0.4, x - size, y + size * 0.5 + shift);
    surface.quadratic_curve_to(x, y + size * 0.6, x, y);
}

/// Sclera plus a pupil pushed towards the gaze direction, never past the rim
/// for gaze components within [-1, 1].
fn eye<S: Surface + ?Sized>(surface: &mut S, fish: &Fish, x: f64, y: f64, radius: f64) {
    surface.begin_path();
    surface.arc(x, y, radius, 0.0, TAU, false);
    surface.set_fill_color(EYE_WHITE);
    surface.stroke();
    surface.fill();

    let pupil_radius = radius * fish.pupil_ratio;
    let offset = fish.look_dir * (radius - pupil_radius);

    surface.begin_path();
    surface.arc(x + offset.x, y + offset.y, pupil_radius, 0.0, TAU, false);
    surface.set_fill_color(PUPIL);
    surface.fill();
}

/// Moves bubbles up (faster when bigger) with a side-to-side drift keyed to
/// their height, then outlines them all in one path. Each bubble gets a fresh
/// random stretch every frame for a shimmer.
pub(crate) fn draw_bubbles<S, R>(surface: &mut S, rng: &mut R, bubbles: &mut [Bubble], rules: &Rules, frame: Frame)
where
    S: Surface + ?Sized,
    R: Rng + ?Sized,
{
    if bubbles.is_empty() {
        return;
    }

    surface.begin_path();
    for bubble in bubbles.iter_mut() {
        advance_bubble(bubble, rules, frame.delta_ms);

        let sx = 1.0 + rng.gen::<f64>() * BUBBLE_SHIMMER;
        let sy = 1.0 + rng.gen::<f64>() * BUBBLE_SHIMMER;
        surface.transform(Affine::new(sx, 0.0, 0.0, sy, bubble.position.x, bubble.position.y));
        surface.move_to(bubble.radius, 0.0);
        surface.arc(0.0, 0.0, bubble.radius, 0.0, TAU, false);
        surface.reset_transform();
    }

    surface.set_stroke_color(BUBBLE_OUTLINE);
    surface.set_line_width(BUBBLE_OUTLINE_WIDTH);
    surface.stroke();
}

pub(crate) fn advance_bubble(bubble: &mut Bubble, rules: &Rules, delta_ms: f64) {
    let sway = (bubble.position.y * rules.bubble_sway_frequency).sin()
        * rules.bubble_sway_amplitude
        * (delta_ms / rules.bubble_sway_frame_ms);
    bubble.position.y -= bubble.radius * rules.bubble_rise_factor * delta_ms;
    bubble.position.x += sway;
}
