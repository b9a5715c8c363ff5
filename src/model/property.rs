//! Animated properties.
//!
//! Every animatable field is either a static value or an ordered keyframe
//! list. Evaluation clamps before the first and after the last keyframe,
//! eases the in-between progress through the keyframe's interpolator and
//! lerps. 2D positions may instead travel along a cubic defined by the
//! keyframe tangents, sampled by arc length; the tangent angle feeds
//! auto-orient.

use std::sync::Arc;

use glam::Vec2;

use crate::geometry::bezier::CubicBez;
use crate::geometry::color::Color;
use crate::geometry::path::Path;
use crate::model::interpolator::Interpolator;

/// Linear interpolation between property values.
pub trait Lerp: Clone {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Vec2::lerp(*a, *b, t)
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Color::new(
            a.r + (b.r - a.r) * t,
            a.g + (b.g - a.g) * t,
            a.b + (b.b - a.b) * t,
        )
    }
}

/// Bezier shape data: a start point followed by cubic triples
/// (control1, control2, end), plus a closed flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeData {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

impl ShapeData {
    /// Appends the shape to a path as move + cubics (+ close).
    pub fn to_path(&self, path: &mut Path) {
        if self.points.len() < 4 {
            return;
        }
        path.reserve(self.points.len(), self.points.len() / 3 + 2);
        path.move_to(self.points[0]);
        let mut i = 1;
        while i + 2 < self.points.len() {
            path.cubic_to(self.points[i], self.points[i + 1], self.points[i + 2]);
            i += 3;
        }
        if self.closed {
            path.close();
        }
    }
}

impl Lerp for ShapeData {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        if a.points.len() != b.points.len() {
            return if t < 0.5 { a.clone() } else { b.clone() };
        }
        ShapeData {
            points: a
                .points
                .iter()
                .zip(&b.points)
                .map(|(pa, pb)| pa.lerp(*pb, t))
                .collect(),
            closed: a.closed,
        }
    }
}

/// Raw gradient stop array as exported: `colorPoints` (pos,r,g,b)
/// records followed by (pos,opacity) records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientRaw(pub Vec<f32>);

impl Lerp for GradientRaw {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        if a.0.len() != b.0.len() {
            return if t < 0.5 { a.clone() } else { b.clone() };
        }
        GradientRaw(
            a.0.iter()
                .zip(&b.0)
                .map(|(va, vb)| va + (vb - va) * t)
                .collect(),
        )
    }
}

/// One keyframe interval `[start_frame, end_frame)`.
#[derive(Debug, Clone)]
pub struct KeyFrame<T> {
    pub start_frame: f32,
    pub end_frame: f32,
    pub start_value: T,
    pub end_value: T,
    /// Absent for hold keyframes and the terminating frame.
    pub interpolator: Option<Arc<Interpolator>>,
}

impl<T: Lerp> KeyFrame<T> {
    fn progress(&self, frame: f32) -> f32 {
        match &self.interpolator {
            Some(interp) if self.end_frame > self.start_frame => {
                interp.value((frame - self.start_frame) / (self.end_frame - self.start_frame))
            }
            _ => 0.0,
        }
    }

    fn value(&self, frame: f32) -> T {
        T::lerp(&self.start_value, &self.end_value, self.progress(frame))
    }
}

/// A static value or an animated keyframe sequence.
#[derive(Debug, Clone)]
pub enum Value<T> {
    Static(T),
    Animated(Vec<KeyFrame<T>>),
}

impl<T: Lerp> Value<T> {
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, Value::Static(_))
    }

    #[must_use]
    pub fn eval(&self, frame: f32) -> T {
        match self {
            Value::Static(v) => v.clone(),
            Value::Animated(frames) => {
                debug_assert!(!frames.is_empty());
                let first = &frames[0];
                if first.start_frame >= frame {
                    return first.start_value.clone();
                }
                let last = &frames[frames.len() - 1];
                if last.end_frame <= frame {
                    return last.end_value.clone();
                }
                for kf in frames {
                    if frame >= kf.start_frame && frame < kf.end_frame {
                        return kf.value(frame);
                    }
                }
                last.end_value.clone()
            }
        }
    }
}

impl<T: Lerp + Default> Default for Value<T> {
    fn default() -> Self {
        Value::Static(T::default())
    }
}

// ============================================================================
// Animated 2D position with optional spatial tangents
// ============================================================================

/// Position keyframe: when `path_key_frame` is set the value travels the
/// cubic `start → start+out_tangent → end+in_tangent → end` sampled at
/// the arc-length fraction of the eased progress.
#[derive(Debug, Clone)]
pub struct PositionKeyFrame {
    pub frame: KeyFrame<Vec2>,
    pub in_tangent: Vec2,
    pub out_tangent: Vec2,
    pub path_key_frame: bool,
}

impl PositionKeyFrame {
    fn bezier(&self) -> CubicBez {
        CubicBez::from_points(
            self.frame.start_value,
            self.frame.start_value + self.out_tangent,
            self.frame.end_value + self.in_tangent,
            self.frame.end_value,
        )
    }

    fn value(&self, frame: f32) -> Vec2 {
        let t = self.frame.progress(frame);
        if self.path_key_frame {
            let b = self.bezier();
            b.point_at(b.t_at_length(t * b.length()))
        } else {
            self.frame.start_value.lerp(self.frame.end_value, t)
        }
    }

    fn angle(&self, frame: f32) -> f32 {
        if self.path_key_frame {
            let t = self.frame.progress(frame);
            let b = self.bezier();
            b.angle_at(b.t_at_length(t * b.length()))
        } else {
            0.0
        }
    }
}

/// An animatable 2D position.
#[derive(Debug, Clone)]
pub enum Position {
    Static(Vec2),
    Animated(Vec<PositionKeyFrame>),
}

impl Default for Position {
    fn default() -> Self {
        Position::Static(Vec2::ZERO)
    }
}

impl Position {
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, Position::Static(_))
    }

    #[must_use]
    pub fn eval(&self, frame: f32) -> Vec2 {
        match self {
            Position::Static(v) => *v,
            Position::Animated(frames) => {
                debug_assert!(!frames.is_empty());
                let first = &frames[0];
                if first.frame.start_frame >= frame {
                    return first.frame.start_value;
                }
                let last = &frames[frames.len() - 1];
                if last.frame.end_frame <= frame {
                    return last.frame.end_value;
                }
                for kf in frames {
                    if frame >= kf.frame.start_frame && frame < kf.frame.end_frame {
                        return kf.value(frame);
                    }
                }
                last.frame.end_value
            }
        }
    }

    /// Tangent direction in degrees for auto-orient; zero outside the
    /// animated range.
    #[must_use]
    pub fn angle(&self, frame: f32) -> f32 {
        match self {
            Position::Static(_) => 0.0,
            Position::Animated(frames) => {
                debug_assert!(!frames.is_empty());
                if frames[0].frame.start_frame >= frame
                    || frames[frames.len() - 1].frame.end_frame <= frame
                {
                    return 0.0;
                }
                for kf in frames {
                    if frame >= kf.frame.start_frame && frame < kf.frame.end_frame {
                        return kf.angle(frame);
                    }
                }
                0.0
            }
        }
    }
}
