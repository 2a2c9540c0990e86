use crate::model::{Bounds, Weed};
use crate::surface::{Affine, LineCap, Surface};
use rand::Rng;
use std::f64::consts::PI;

/// Extra drop below the bottom edge for the weed roots.
const ROOT_SINK: f64 = 50.0;
const SWAY_DAMPING: f64 = 50.0;
const SHAKE: f64 = 10.0;

/// Shear for one layer's sway at `now_ms`.
pub(crate) fn layer_sway(layer: i32, now_ms: f64) -> f64 {
    (now_ms / 1000.0 + layer as f64).sin() / SWAY_DAMPING
}

/// Puts the surface in the layer's frame: half a turn (weeds hang from their
/// roots, so this makes them grow upward), then a sheared shift so the roots
/// sit just below the bottom edge.
pub(crate) fn apply_layer_transform<S: Surface + ?Sized>(surface: &mut S, layer: i32, bounds: Bounds, now_ms: f64) {
    surface.reset_transform();
    surface.rotate(PI);
    surface.transform(Affine::new(
        1.0,
        0.0,
        layer_sway(layer, now_ms),
        1.0,
        -bounds.width,
        -bounds.height * 2.0 - ROOT_SINK,
    ));
}

fn shake<R: Rng + ?Sized>(rng: &mut R, v: f64) -> f64 {
    v + (rng.gen::<f64>() / 4.0).sin() * SHAKE
}

/// One weed as alternating-bend quadratic segments, re-jittered every call.
pub(crate) fn draw_weed<S, R>(surface: &mut S, rng: &mut R, weed: &Weed)
where
    S: Surface + ?Sized,
    R: Rng + ?Sized,
{
    surface.set_stroke_color(weed.color.opaque());
    surface.set_line_width(weed.width);
    surface.set_line_cap(LineCap::Round);

    surface.begin_path();
    surface.move_to(weed.position.x, weed.position.y);

    let segments = weed.length / weed.segment_length;
    let mut bend_dir = 1.0;
    let mut segment = 0usize;
    while (segment as f64) < segments {
        let x = weed.position.x;
        let y = weed.position.y + segment as f64 * weed.segment_length;
        let bend_x = x + weed.bend_distance * bend_dir * 2.0;
        let bend_y = y + weed.segment_length * 1.2;

        let (x, y) = (shake(rng, x), shake(rng, y));
        let (bend_x, bend_y) = (shake(rng, bend_x), shake(rng, bend_y));
        surface.quadratic_curve_to(bend_x, bend_y, x, y);

        bend_dir = -bend_dir;
        segment += 1;
    }

    surface.stroke();
}

/// Draws weeds in collection order, switching the layer transform whenever
/// the layer changes. Expects the weeds sorted by layer so each layer's
/// transform is applied once. Leaves the transform reset.
pub(crate) fn draw_weeds<S, R>(surface: &mut S, rng: &mut R, weeds: &[Weed], bounds: Bounds, now_ms: f64)
where
    S: Surface + ?Sized,
    R: Rng + ?Sized,
{
    let mut current: Option<i32> = None;
    for weed in weeds {
        if current != Some(weed.layer) {
            apply_layer_transform(surface, weed.layer, bounds, now_ms);
            current = Some(weed.layer);
        }
        draw_weed(surface, rng, weed);
    }
    surface.reset_transform();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RgbColor;
    use crate::surface::recording::{Call, RecordingSurface};
    use crate::vector::Vector2;
    use rand::{rngs::StdRng, SeedableRng};

    fn weed(layer: i32, length: f64) -> Weed {
        Weed {
            position: Vector2::new(100.0, 600.0),
            length,
            width: 5.0,
            layer,
            bend_distance: 10.0,
            segment_length: 30.0,
            color: RgbColor::new(5, 60, 40),
        }
    }

    fn layer_switches(s: &RecordingSurface) -> usize {
        s.calls
            .iter()
            .filter(|c| matches!(c, Call::ResetTransform))
            .count()
    }

    #[test]
    fn transform_is_applied_once_per_contiguous_layer() {
        let weeds = vec![weed(0, 100.0), weed(0, 120.0), weed(1, 100.0), weed(3, 90.0), weed(3, 200.0)];
        let mut s = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(1);
        draw_weeds(&mut s, &mut rng, &weeds, Bounds::new(800.0, 600.0), 0.0);
        // one reset per layer plus the final one
        assert_eq!(layer_switches(&s), 4);
        assert_eq!(s.strokes().len(), 5);
        assert_eq!(s.ctm, Affine::IDENTITY);
    }

    #[test]
    fn first_layer_is_transformed_too() {
        let mut s = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(2);
        draw_weeds(&mut s, &mut rng, &[weed(0, 90.0)], Bounds::new(800.0, 600.0), 0.0);
        let root = s
            .calls
            .iter()
            .find_map(|c| match c {
                Call::MoveTo(p) => Some(*p),
                _ => None,
            })
            .unwrap();
        assert!((root.x - 700.0).abs() < 1e-6);
        assert!((root.y - 650.0).abs() < 1e-6);
    }

    #[test]
    fn layers_sway_independently() {
        let t = 12_345.0;
        assert!((layer_sway(0, t) - layer_sway(1, t)).abs() > 1e-6);
        assert!(layer_sway(2, t).abs() <= 1.0 / 50.0);
    }

    #[test]
    fn segments_bend_to_alternating_sides() {
        let mut s = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(6);
        let w = weed(0, 200.0);
        draw_weed(&mut s, &mut rng, &w);
        let controls: Vec<f64> = s
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::QuadTo(control, _) => Some(control.x),
                _ => None,
            })
            .collect();
        assert_eq!(controls.len(), 7);

        // jitter only ever adds up to SHAKE * sin(1/4)
        let bend = 2.0 * w.bend_distance;
        let jitter = SHAKE * 0.25f64.sin();
        for (i, x) in controls.iter().enumerate() {
            if i % 2 == 0 {
                assert!(*x >= w.position.x + bend, "segment {i} at {x}");
            } else {
                assert!(*x < w.position.x - bend + jitter, "segment {i} at {x}");
            }
        }
    }

    #[test]
    fn each_layer_gets_its_own_shear() {
        let weeds = vec![weed(0, 90.0), weed(1, 90.0)];
        let mut s = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(7);
        draw_weeds(&mut s, &mut rng, &weeds, Bounds::new(800.0, 600.0), 12_345.0);
        // each layer records a rotate and then the sheared shift
        let layer_frames: Vec<Affine> = s
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Transform(m) => Some(*m),
                _ => None,
            })
            .skip(1)
            .step_by(2)
            .collect();
        assert_eq!(layer_frames.len(), 2);
        assert!((layer_frames[0].c - layer_frames[1].c).abs() > 1e-6);
        assert!((layer_frames[0].c + layer_sway(0, 12_345.0)).abs() < 1e-9);
        assert!((layer_frames[1].c + layer_sway(1, 12_345.0)).abs() < 1e-9);
    }

    #[test]
    fn segment_count_rounds_up() {
        let mut s = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(3);
        draw_weed(&mut s, &mut rng, &weed(0, 100.0));
        let curves = s.calls.iter().filter(|c| matches!(c, Call::QuadTo(..))).count();
        assert_eq!(curves, 4);
    }

    #[test]
    fn jitter_is_small_positive_and_fresh_each_time() {
        let mut rng = StdRng::seed_from_u64(4);
        let samples: Vec<f64> = (0..200).map(|_| shake(&mut rng, 0.0)).collect();
        assert!(samples.iter().all(|v| *v >= 0.0 && *v < 2.5));
        assert!(samples.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn no_weeds_draws_nothing() {
        let mut s = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(5);
        draw_weeds(&mut s, &mut rng, &[], Bounds::new(10.0, 10.0), 0.0);
        assert!(s.strokes().is_empty());
    }
}
