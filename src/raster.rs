use crate::color::Rgba;
use crate::surface::{Affine, LineCap, LineJoin, Surface};
use crate::vector::Vector2;
use std::f64::consts::TAU;

pub(crate) struct PixelCanvas {
    w: usize,
    h: usize,
    px: Vec<Rgba>,
}

impl PixelCanvas {
    pub(crate) fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![Rgba::BLACK; w * h],
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.w
    }

    pub(crate) fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub(crate) fn get(&self, x: usize, y: usize) -> Rgba {
        self.px[y * self.w + x]
    }

    fn blend_over(&mut self, i: usize, src: Rgba) {
        if src.a == 255 {
            self.px[i] = src;
            return;
        }
        let dst = self.px[i];
        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Rgba::default();
            return;
        }
        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };
        self.px[i] = Rgba {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }
}

#[derive(Clone, Debug, Default)]
struct SubPath {
    /// Device-space points, already flattened.
    points: Vec<Vector2>,
    closed: bool,
}

/// Pixels touched by one fill or stroke, so each is blended exactly once.
struct Coverage {
    hit: Vec<bool>,
    touched: Vec<usize>,
}

impl Coverage {
    fn new(n: usize) -> Self {
        Self {
            hit: vec![false; n],
            touched: Vec::new(),
        }
    }

    #[inline]
    fn mark(&mut self, i: usize) {
        if !self.hit[i] {
            self.hit[i] = true;
            self.touched.push(i);
        }
    }
}

/// Software implementation of [`Surface`] over an RGBA pixel grid.
///
/// Scene coordinates are logical pixels; `units_per_pixel` of them map onto
/// one device pixel.
pub(crate) struct RasterSurface {
    canvas: PixelCanvas,
    coverage: Coverage,
    units_per_pixel: f64,
    ctm: Affine,
    path: Vec<SubPath>,
    fill_color: Rgba,
    stroke_color: Rgba,
    line_width: f64,
    line_join: LineJoin,
    line_cap: LineCap,
}

impl RasterSurface {
    pub(crate) fn new(device_w: usize, device_h: usize, units_per_pixel: f64) -> Self {
        Self {
            canvas: PixelCanvas::new(device_w, device_h),
            coverage: Coverage::new(device_w * device_h),
            units_per_pixel,
            ctm: Affine::IDENTITY,
            path: Vec::new(),
            fill_color: Rgba::BLACK,
            stroke_color: Rgba::BLACK,
            line_width: 1.0,
            line_join: LineJoin::default(),
            line_cap: LineCap::default(),
        }
    }

    pub(crate) fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    fn device(&self, x: f64, y: f64) -> Vector2 {
        self.ctm.apply(Vector2::new(x, y)) * (1.0 / self.units_per_pixel)
    }

    fn last_point(&self) -> Option<Vector2> {
        self.path.last().and_then(|s| s.points.last().copied())
    }

    fn push_point(&mut self, p: Vector2) {
        match self.path.last_mut() {
            Some(sub) if !sub.closed => sub.points.push(p),
            _ => self.path.push(SubPath {
                points: vec![p],
                closed: false,
            }),
        }
    }

    fn commit(&mut self, color: Rgba) {
        let mut touched = std::mem::take(&mut self.coverage.touched);
        for &i in &touched {
            self.canvas.blend_over(i, color);
            self.coverage.hit[i] = false;
        }
        touched.clear();
        self.coverage.touched = touched;
    }

    /// Non-zero winding fill sampled at pixel centres.
    fn cover_polygons(&mut self, subpaths: &[SubPath]) {
        let mut edges: Vec<(Vector2, Vector2)> = Vec::new();
        for sub in subpaths {
            let pts = &sub.points;
            if pts.len() < 2 {
                continue;
            }
            for i in 0..pts.len() {
                let a = pts[i];
                let b = pts[(i + 1) % pts.len()];
                if a.y != b.y {
                    edges.push((a, b));
                }
            }
        }
        if edges.is_empty() {
            return;
        }

        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for (a, b) in &edges {
            min_y = min_y.min(a.y.min(b.y));
            max_y = max_y.max(a.y.max(b.y));
        }
        let h = self.canvas.h as i64;
        let w = self.canvas.w as i64;
        let row0 = (min_y.floor() as i64).max(0);
        let row1 = (max_y.ceil() as i64).min(h - 1);

        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for row in row0..=row1 {
            let sy = row as f64 + 0.5;
            crossings.clear();
            for (a, b) in &edges {
                let dir = if a.y <= sy && b.y > sy {
                    1
                } else if b.y <= sy && a.y > sy {
                    -1
                } else {
                    continue;
                };
                let x = a.x + (sy - a.y) * (b.x - a.x) / (b.y - a.y);
                crossings.push((x, dir));
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                let x0 = ((pair[0].0 - 0.5).ceil() as i64).max(0);
                let x1 = ((pair[1].0 - 0.5).ceil() as i64).min(w);
                for x in x0..x1 {
                    self.coverage.mark(row as usize * self.canvas.w + x as usize);
                }
            }
        }
    }

    /// Thick segment as a capsule; ends without a cap are cut flat.
    fn cover_segment(&mut self, a: Vector2, b: Vector2, half: f64, cap_a: bool, cap_b: bool) {
        let ab = b - a;
        let len2 = ab.x * ab.x + ab.y * ab.y;
        if len2 <= 1e-12 && !(cap_a || cap_b) {
            return;
        }
        let w = self.canvas.w as i64;
        let h = self.canvas.h as i64;
        let x0 = ((a.x.min(b.x) - half).floor() as i64).max(0);
        let x1 = ((a.x.max(b.x) + half).ceil() as i64).min(w - 1);
        let y0 = ((a.y.min(b.y) - half).floor() as i64).max(0);
        let y1 = ((a.y.max(b.y) + half).ceil() as i64).min(h - 1);
        let half2 = half * half;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vector2::new(x as f64 + 0.5, y as f64 + 0.5);
                let ap = p - a;
                let t = if len2 > 1e-12 {
                    (ap.x * ab.x + ap.y * ab.y) / len2
                } else {
                    0.0
                };
                if (t < 0.0 && !cap_a) || (t > 1.0 && !cap_b) {
                    continue;
                }
                let q = a + ab * t.clamp(0.0, 1.0);
                let d = p - q;
                if d.x * d.x + d.y * d.y <= half2 {
                    self.coverage.mark(y as usize * self.canvas.w + x as usize);
                }
            }
        }
    }

    fn cover_stroke(&mut self, subpaths: &[SubPath], half: f64) {
        let round_join = self.line_join == LineJoin::Round;
        let round_cap = self.line_cap == LineCap::Round;
        for sub in subpaths {
            let pts = &sub.points;
            if pts.len() < 2 {
                continue;
            }
            let mut segs: Vec<(Vector2, Vector2)> = pts.windows(2).map(|p| (p[0], p[1])).collect();
            if sub.closed {
                segs.push((pts[pts.len() - 1], pts[0]));
            }
            let last = segs.len() - 1;
            for (i, &(a, b)) in segs.iter().enumerate() {
                let cap_a = if i == 0 && !sub.closed { round_cap } else { round_join };
                let cap_b = if i == last && !sub.closed { round_cap } else { round_join };
                self.cover_segment(a, b, half, cap_a, cap_b);
            }
        }
    }

    fn flatten_quad(&mut self, c: Vector2, p: Vector2) {
        let Some(p0) = self.last_point() else {
            return;
        };
        let len = (c - p0).magnitude() + (p - c).magnitude();
        let steps = (len / 1.5).ceil().clamp(1.0, 96.0) as usize;
        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            let u = 1.0 - t;
            let q = p0 * (u * u) + c * (2.0 * u * t) + p * (t * t);
            self.push_point(q);
        }
    }
}

/// Signed sweep from `start` to `end` following canvas arc rules.
fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    if anticlockwise {
        let span = start - end;
        if span >= TAU {
            -TAU
        } else {
            -span.rem_euclid(TAU)
        }
    } else {
        let span = end - start;
        if span >= TAU {
            TAU
        } else {
            span.rem_euclid(TAU)
        }
    }
}

impl Surface for RasterSurface {
    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.device(x, y);
        self.path.push(SubPath {
            points: vec![p],
            closed: false,
        });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let p = self.device(x, y);
        self.push_point(p);
    }

    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        let c = self.device(cpx, cpy);
        let p = self.device(x, y);
        if self.last_point().is_none() {
            self.push_point(c);
        }
        self.flatten_quad(c, p);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool) {
        let sweep = arc_sweep(start, end, anticlockwise);
        let device_r = radius * self.ctm.mean_scale() / self.units_per_pixel;
        let steps = ((device_r * sweep.abs()) / 1.5).ceil().clamp(1.0, 180.0) as usize;
        for i in 0..=steps {
            let angle = start + sweep * (i as f64 / steps as f64);
            let p = self.device(x + radius * angle.cos(), y + radius * angle.sin());
            self.push_point(p);
        }
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let points = vec![
            self.device(x, y),
            self.device(x + w, y),
            self.device(x + w, y + h),
            self.device(x, y + h),
        ];
        self.path.push(SubPath { points, closed: true });
        let start = self.device(x, y);
        self.path.push(SubPath {
            points: vec![start],
            closed: false,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let rect = SubPath {
            points: vec![
                self.device(x, y),
                self.device(x + w, y),
                self.device(x + w, y + h),
                self.device(x, y + h),
            ],
            closed: true,
        };
        self.cover_polygons(std::slice::from_ref(&rect));
        self.commit(self.fill_color);
    }

    fn fill(&mut self) {
        let path = std::mem::take(&mut self.path);
        self.cover_polygons(&path);
        self.path = path;
        self.commit(self.fill_color);
    }

    fn stroke(&mut self) {
        let half = (self.line_width * self.ctm.mean_scale() / self.units_per_pixel / 2.0).max(0.5);
        let path = std::mem::take(&mut self.path);
        self.cover_stroke(&path, half);
        self.path = path;
        self.commit(self.stroke_color);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.ctm = self.ctm.then(Affine::translation(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.ctm = self.ctm.then(Affine::rotation(angle));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.ctm = self.ctm.then(Affine::scaling(x, y));
    }

    fn transform(&mut self, m: Affine) {
        self.ctm = self.ctm.then(m);
    }

    fn reset_transform(&mut self) {
        self.ctm = Affine::IDENTITY;
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.fill_color = color;
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.stroke_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.line_join = join;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.line_cap = cap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::from_hex(0xFF0000FF);
    const WHITE: Rgba = Rgba::from_hex(0xFFFFFFFF);

    fn surface(w: usize, h: usize) -> RasterSurface {
        RasterSurface::new(w, h, 1.0)
    }

    fn count(s: &RasterSurface, color: Rgba) -> usize {
        let c = s.canvas();
        let mut n = 0;
        for y in 0..c.height() {
            for x in 0..c.width() {
                if c.get(x, y) == color {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn fill_rect_covers_exactly_its_pixels() {
        let mut s = surface(20, 10);
        s.set_fill_color(RED);
        s.fill_rect(2.0, 3.0, 5.0, 4.0);
        assert_eq!(count(&s, RED), 20);
        assert_eq!(s.canvas().get(2, 3), RED);
        assert_eq!(s.canvas().get(6, 6), RED);
        assert_eq!(s.canvas().get(7, 6), Rgba::BLACK);
    }

    #[test]
    fn fill_rect_leaves_the_path_alone() {
        let mut s = surface(10, 10);
        s.begin_path();
        s.rect(0.0, 0.0, 2.0, 2.0);
        s.set_fill_color(RED);
        s.fill_rect(5.0, 5.0, 2.0, 2.0);
        s.set_fill_color(WHITE);
        s.fill();
        assert_eq!(count(&s, WHITE), 4);
        assert_eq!(count(&s, RED), 4);
    }

    #[test]
    fn units_per_pixel_shrinks_the_scene() {
        let mut s = RasterSurface::new(10, 10, 4.0);
        s.set_fill_color(RED);
        s.fill_rect(0.0, 0.0, 40.0, 8.0);
        assert_eq!(count(&s, RED), 20);
    }

    #[test]
    fn opposite_winding_arcs_cut_a_hole() {
        let mut s = surface(40, 40);
        s.set_fill_color(WHITE);
        s.begin_path();
        s.arc(20.0, 20.0, 15.0, 0.0, TAU, false);
        s.arc(20.0, 20.0, 8.0, TAU, 0.0, true);
        s.fill();
        assert_eq!(s.canvas().get(20, 20), Rgba::BLACK);
        assert_eq!(s.canvas().get(20, 8), WHITE);
        assert_eq!(s.canvas().get(8, 20), WHITE);
        assert_eq!(s.canvas().get(1, 1), Rgba::BLACK);
    }

    #[test]
    fn same_winding_arcs_fill_solid() {
        let mut s = surface(40, 40);
        s.set_fill_color(WHITE);
        s.begin_path();
        s.arc(20.0, 20.0, 15.0, 0.0, TAU, false);
        s.arc(20.0, 20.0, 8.0, 0.0, TAU, false);
        s.fill();
        assert_eq!(s.canvas().get(20, 20), WHITE);
    }

    #[test]
    fn arc_sweep_follows_canvas_rules() {
        assert!((arc_sweep(0.0, TAU, false) - TAU).abs() < 1e-12);
        assert!((arc_sweep(TAU, 0.0, true) + TAU).abs() < 1e-12);
        assert!(arc_sweep(0.0, TAU, true).abs() < 1e-12);
        assert!((arc_sweep(0.0, -1.0, false) - (TAU - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn stroke_width_follows_the_transform() {
        let mut thin = surface(40, 40);
        thin.set_stroke_color(WHITE);
        thin.set_line_width(2.0);
        thin.begin_path();
        thin.move_to(5.0, 20.0);
        thin.line_to(35.0, 20.0);
        thin.stroke();

        let mut wide = surface(40, 40);
        wide.set_stroke_color(WHITE);
        wide.set_line_width(2.0);
        wide.scale(2.0, 2.0);
        wide.begin_path();
        wide.move_to(2.5, 10.0);
        wide.line_to(17.5, 10.0);
        wide.stroke();

        assert_eq!(count(&thin, WHITE), 60);
        assert_eq!(count(&wide, WHITE), 120);
    }

    #[test]
    fn round_caps_extend_past_the_ends() {
        let mut butt = surface(40, 20);
        butt.set_stroke_color(WHITE);
        butt.set_line_width(6.0);
        butt.begin_path();
        butt.move_to(10.0, 10.0);
        butt.line_to(30.0, 10.0);
        butt.stroke();
        assert_eq!(butt.canvas().get(8, 10), Rgba::BLACK);

        let mut round = surface(40, 20);
        round.set_stroke_color(WHITE);
        round.set_line_width(6.0);
        round.set_line_cap(LineCap::Round);
        round.begin_path();
        round.move_to(10.0, 10.0);
        round.line_to(30.0, 10.0);
        round.stroke();
        assert_eq!(round.canvas().get(8, 10), WHITE);
    }

    #[test]
    fn translucent_stroke_blends_once_where_segments_overlap() {
        let mut s = surface(30, 30);
        let half_white = Rgba::from_hex(0xFFFFFF80);
        s.set_stroke_color(half_white);
        s.set_line_width(4.0);
        s.set_line_join(LineJoin::Round);
        s.begin_path();
        s.move_to(5.0, 15.0);
        s.line_to(15.0, 15.0);
        s.line_to(15.0, 5.0);
        s.stroke();
        let corner = s.canvas().get(15, 15);
        let arm = s.canvas().get(8, 15);
        assert_eq!(corner, arm);
        assert!(arm.r > 100 && arm.r < 160);
    }

    #[test]
    fn quadratic_curve_passes_near_its_midpoint() {
        let mut s = surface(40, 40);
        s.set_stroke_color(WHITE);
        s.set_line_width(2.0);
        s.begin_path();
        s.move_to(0.0, 30.0);
        s.quadratic_curve_to(20.0, 0.0, 40.0, 30.0);
        s.stroke();
        // B(0.5) = (20, 15)
        assert_eq!(s.canvas().get(20, 14), WHITE);
        assert_eq!(s.canvas().get(20, 5), Rgba::BLACK);
    }

    #[test]
    fn empty_path_is_a_no_op() {
        let mut s = surface(8, 8);
        s.begin_path();
        s.fill();
        s.stroke();
        assert_eq!(count(&s, Rgba::BLACK), 64);
    }
}
