//! Cubic-bezier easing curves.
//!
//! Keyframe easing is a unit-square cubic bezier through the keyframe's
//! out-tangent and the next keyframe's in-tangent. Evaluation samples a
//! small table for an initial guess and refines with Newton-Raphson,
//! falling back to bisection where the slope collapses.

const SPLINE_TABLE_SIZE: usize = 11;
const SAMPLE_STEP: f32 = 1.0 / (SPLINE_TABLE_SIZE - 1) as f32;
const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f32 = 0.02;
const SUBDIVISION_PRECISION: f32 = 0.000_000_1;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;

#[derive(Debug, Clone)]
pub struct Interpolator {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    samples: [f32; SPLINE_TABLE_SIZE],
}

#[inline]
fn coeff_a(a1: f32, a2: f32) -> f32 {
    1.0 - 3.0 * a2 + 3.0 * a1
}

#[inline]
fn coeff_b(a1: f32, a2: f32) -> f32 {
    3.0 * a2 - 6.0 * a1
}

#[inline]
fn coeff_c(a1: f32) -> f32 {
    3.0 * a1
}

fn calc_bezier(t: f32, a1: f32, a2: f32) -> f32 {
    ((coeff_a(a1, a2) * t + coeff_b(a1, a2)) * t + coeff_c(a1)) * t
}

fn slope(t: f32, a1: f32, a2: f32) -> f32 {
    3.0 * coeff_a(a1, a2) * t * t + 2.0 * coeff_b(a1, a2) * t + coeff_c(a1)
}

impl Interpolator {
    /// `(x1, y1)` is the out-tangent of the starting keyframe, `(x2, y2)`
    /// the in-tangent of the ending keyframe.
    #[must_use]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let mut samples = [0.0; SPLINE_TABLE_SIZE];
        if x1 != y1 || x2 != y2 {
            for (i, s) in samples.iter_mut().enumerate() {
                *s = calc_bezier(i as f32 * SAMPLE_STEP, x1, x2);
            }
        }
        Self {
            x1,
            y1,
            x2,
            y2,
            samples,
        }
    }

    #[must_use]
    pub fn value(&self, x: f32) -> f32 {
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }
        calc_bezier(self.t_for_x(x), self.y1, self.y2)
    }

    fn t_for_x(&self, x: f32) -> f32 {
        let mut interval_start = 0.0;
        let mut i = 1;
        while i < SPLINE_TABLE_SIZE - 1 && self.samples[i] <= x {
            interval_start += SAMPLE_STEP;
            i += 1;
        }
        i -= 1;

        let dist = (x - self.samples[i]) / (self.samples[i + 1] - self.samples[i]);
        let guess = interval_start + dist * SAMPLE_STEP;

        let initial_slope = slope(guess, self.x1, self.x2);
        if initial_slope >= NEWTON_MIN_SLOPE {
            self.newton_raphson(x, guess)
        } else if initial_slope == 0.0 {
            guess
        } else {
            self.binary_subdivide(x, interval_start, interval_start + SAMPLE_STEP)
        }
    }

    fn newton_raphson(&self, x: f32, mut guess: f32) -> f32 {
        for _ in 0..NEWTON_ITERATIONS {
            let current_x = calc_bezier(guess, self.x1, self.x2) - x;
            let current_slope = slope(guess, self.x1, self.x2);
            if current_slope == 0.0 {
                return guess;
            }
            guess -= current_x / current_slope;
        }
        guess
    }

    fn binary_subdivide(&self, x: f32, mut a: f32, mut b: f32) -> f32 {
        let mut t = a;
        for _ in 0..SUBDIVISION_MAX_ITERATIONS {
            t = a + (b - a) / 2.0;
            let current_x = calc_bezier(t, self.x1, self.x2) - x;
            if current_x > 0.0 {
                b = t;
            } else {
                a = t;
            }
            if current_x.abs() <= SUBDIVISION_PRECISION {
                break;
            }
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_curve_is_identity() {
        let i = Interpolator::new(0.3, 0.3, 0.7, 0.7);
        assert_eq!(i.value(0.25), 0.25);
        assert_eq!(i.value(0.75), 0.75);
    }

    #[test]
    fn ease_hits_endpoints() {
        let i = Interpolator::new(0.42, 0.0, 0.58, 1.0);
        assert!(i.value(0.0).abs() < 1e-4);
        assert!((i.value(1.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ease_is_monotone() {
        let i = Interpolator::new(0.42, 0.0, 0.58, 1.0);
        let mut last = 0.0;
        for step in 0..=20 {
            let v = i.value(step as f32 / 20.0);
            assert!(v >= last - 1e-4, "not monotone at {step}: {v} < {last}");
            last = v;
        }
    }
}
