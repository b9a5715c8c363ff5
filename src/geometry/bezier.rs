//! Cubic bezier segment math: evaluation, splitting, arc length and
//! arc-length parameterization.

use glam::Vec2;

/// One cubic bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBez {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl CubicBez {
    #[must_use]
    pub fn from_points(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }

    /// Tangent direction at `t`, in degrees.
    #[must_use]
    pub fn angle_at(&self, t: f32) -> f32 {
        let u = 1.0 - t;
        let d = (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t);
        d.y.atan2(d.x).to_degrees()
    }

    /// Arc length by chord/control-polygon bisection until the difference
    /// drops under 0.01.
    #[must_use]
    pub fn length(&self) -> f32 {
        let chord = (self.p3 - self.p0).length();
        let poly = (self.p1 - self.p0).length()
            + (self.p2 - self.p1).length()
            + (self.p3 - self.p2).length();
        if (poly - chord) > 0.01 {
            let (left, right) = self.split_at(0.5);
            left.length() + right.length()
        } else {
            chord + (poly - chord) * 0.5
        }
    }

    /// De Casteljau split at parameter `t`.
    #[must_use]
    pub fn split_at(&self, t: f32) -> (CubicBez, CubicBez) {
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let mid = p012.lerp(p123, t);
        (
            CubicBez::from_points(self.p0, p01, p012, mid),
            CubicBez::from_points(mid, p123, p23, self.p3),
        )
    }

    /// Splits the curve so the left part has the given arc length.
    /// Returns (left, right).
    #[must_use]
    pub fn split_at_length(&self, len: f32) -> (CubicBez, CubicBez) {
        let t = self.t_at_length_with(len, self.length());
        self.split_at(t)
    }

    /// Parameter whose arc length from the start equals `len`.
    #[must_use]
    pub fn t_at_length(&self, len: f32) -> f32 {
        self.t_at_length_with(len, self.length())
    }

    fn t_at_length_with(&self, len: f32, total: f32) -> f32 {
        if len <= 0.0 || total <= 0.0 {
            return 0.0;
        }
        if len >= total {
            return 1.0;
        }
        // Bisection on the monotone arc-length function.
        let mut lo = 0.0_f32;
        let mut hi = 1.0_f32;
        let mut t = len / total;
        for _ in 0..30 {
            let (left, _) = self.split_at(t);
            let l = left.length();
            let err = l - len;
            if err.abs() < 0.01 {
                break;
            }
            if err > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            t = (lo + hi) * 0.5;
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_length() {
        let b = CubicBez::from_points(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(30.0, 0.0),
        );
        assert!((b.length() - 30.0).abs() < 0.05);
    }

    #[test]
    fn split_preserves_endpoints() {
        let b = CubicBez::from_points(
            Vec2::ZERO,
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 0.0),
        );
        let (l, r) = b.split_at(0.5);
        assert_eq!(l.p0, b.p0);
        assert_eq!(r.p3, b.p3);
        assert_eq!(l.p3, r.p0);
    }

    #[test]
    fn t_at_half_length_of_line() {
        let b = CubicBez::from_points(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(30.0, 0.0),
        );
        let t = b.t_at_length(15.0);
        let p = b.point_at(t);
        assert!((p.x - 15.0).abs() < 0.1, "got {p:?}");
    }
}
