use std::ops::{Add, Mul, Sub};

/// Immutable 2D point/displacement in surface pixels (+x right, +y down).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Vector2 {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Vector2 {
    pub(crate) const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub(crate) fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Step `distance` along `direction`.
    ///
    /// The heading angle is measured from the +y axis (`atan2(x, y)`), so the
    /// x displacement comes from the sine and the y displacement from the
    /// cosine. A zero direction has angle 0 and therefore steps along +y.
    pub(crate) fn move_along(self, direction: Vector2, distance: f64) -> Self {
        let rotation = direction.x.atan2(direction.y);
        Self::new(
            self.x + rotation.sin() * distance,
            self.y + rotation.cos() * distance,
        )
    }
}

// Vector helpers the scene itself never calls; it only steps.
#[allow(dead_code)]
impl Vector2 {
    pub(crate) const ZERO: Vector2 = Vector2::new(0.0, 0.0);

    // Named steps for `move_along`; "up" is +y, matching its angle convention.
    pub(crate) const UP: Vector2 = Vector2::new(0.0, 1.0);
    pub(crate) const DOWN: Vector2 = Vector2::new(0.0, -1.0);
    pub(crate) const LEFT: Vector2 = Vector2::new(-1.0, 0.0);
    pub(crate) const RIGHT: Vector2 = Vector2::new(1.0, 0.0);

    /// Unit vector with the same direction. A zero-length vector stays zero.
    pub(crate) fn normalize(self) -> Self {
        let m = self.magnitude();
        if m <= 1e-12 {
            Self::ZERO
        } else {
            Self::new(self.x / m, self.y / m)
        }
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Vector2, b: Vector2) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn arithmetic_returns_new_values() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, -4.0);
        assert_eq!(a + b, Vector2::new(4.0, -2.0));
        assert_eq!(a - b, Vector2::new(-2.0, 6.0));
        assert_eq!(b * 0.5, Vector2::new(1.5, -2.0));
        assert_eq!(a, Vector2::new(1.0, 2.0));
        assert!((b.magnitude() - 5.0).abs() < EPS);
    }

    #[test]
    fn normalize_gives_unit_vector_in_same_direction() {
        for v in [
            Vector2::new(3.0, 4.0),
            Vector2::new(-0.2, 0.7),
            Vector2::new(1e-3, -5e-4),
            Vector2::new(-120.0, 0.0),
        ] {
            let n = v.normalize();
            assert!((n.magnitude() - 1.0).abs() < EPS);
            let cross = v.x * n.y - v.y * n.x;
            let dot = v.x * n.x + v.y * n.y;
            assert!(cross.abs() < 1e-9);
            assert!(dot > 0.0);
        }
    }

    #[test]
    fn normalize_zero_is_zero() {
        let n = Vector2::ZERO.normalize();
        assert_eq!(n, Vector2::ZERO);
        assert!(!n.x.is_nan() && !n.y.is_nan());
    }

    #[test]
    fn move_along_up_steps_positive_y() {
        let p = Vector2::new(10.0, 20.0).move_along(Vector2::UP, 7.5);
        assert!(close(p, Vector2::new(10.0, 27.5)));
    }

    #[test]
    fn move_along_named_directions() {
        let o = Vector2::ZERO;
        assert!(close(o.move_along(Vector2::RIGHT, 3.0), Vector2::new(3.0, 0.0)));
        assert!(close(o.move_along(Vector2::LEFT, 3.0), Vector2::new(-3.0, 0.0)));
        assert!(close(o.move_along(Vector2::DOWN, 3.0), Vector2::new(0.0, -3.0)));
    }

    #[test]
    fn move_along_ignores_direction_magnitude() {
        let o = Vector2::new(1.0, 1.0);
        let short = o.move_along(Vector2::new(0.3, 0.4), 10.0);
        let long = o.move_along(Vector2::new(30.0, 40.0), 10.0);
        assert!(close(short, long));
        assert!(close(short, Vector2::new(7.0, 9.0)));
    }

    #[test]
    fn move_along_zero_direction_steps_along_y() {
        let p = Vector2::ZERO.move_along(Vector2::ZERO, 2.0);
        assert!(close(p, Vector2::new(0.0, 2.0)));
    }
}
