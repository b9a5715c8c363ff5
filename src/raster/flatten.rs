//! Curve flattening and coordinate snapping.
//!
//! Paths are flattened to polylines before scan conversion. Coordinates
//! are snapped to the 26.6 fixed-point grid with round-to-nearest-even,
//! which keeps scanline crossings stable between frames.

use glam::Vec2;

use crate::geometry::bezier::CubicBez;
use crate::geometry::path::{Path, Segment};

/// Flatness tolerance in pixels.
const FLATTEN_TOLERANCE: f32 = 0.1;
const MAX_DEPTH: u32 = 16;

/// Snaps a coordinate to 1/64 pixel, round-half-even.
#[inline]
#[must_use]
pub fn snap26_6(v: f32) -> f32 {
    (v * 64.0).round_ties_even() / 64.0
}

#[inline]
fn snap_point(p: Vec2) -> Vec2 {
    Vec2::new(snap26_6(p.x), snap26_6(p.y))
}

/// One closed or open contour as a polyline.
#[derive(Debug, Clone, Default)]
pub struct Contour {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

/// Flattens a path into polyline contours; every point lands on the 26.6
/// grid.
#[must_use]
pub fn flatten(path: &Path) -> Vec<Contour> {
    let mut contours: Vec<Contour> = Vec::new();
    let mut current = Contour::default();

    let mut flush = |current: &mut Contour, contours: &mut Vec<Contour>| {
        if current.points.len() > 1 {
            contours.push(std::mem::take(current));
        } else {
            current.points.clear();
            current.closed = false;
        }
    };

    for seg in path.segments() {
        match seg {
            Segment::MoveTo(p) => {
                flush(&mut current, &mut contours);
                current.points.push(snap_point(p));
            }
            Segment::Line { to, .. } => {
                current.points.push(snap_point(to));
            }
            Segment::Cubic(b) => {
                flatten_cubic(&b, &mut current.points);
            }
            Segment::Close { .. } => {
                current.closed = true;
                flush(&mut current, &mut contours);
            }
        }
    }
    flush(&mut current, &mut contours);
    contours
}

fn flatten_cubic(b: &CubicBez, out: &mut Vec<Vec2>) {
    fn recurse(b: &CubicBez, depth: u32, out: &mut Vec<Vec2>) {
        if depth >= MAX_DEPTH || is_flat(b) {
            out.push(snap_point(b.p3));
            return;
        }
        let (l, r) = b.split_at(0.5);
        recurse(&l, depth + 1, out);
        recurse(&r, depth + 1, out);
    }
    recurse(b, 0, out);
}

/// Control-point distance from the chord below tolerance.
fn is_flat(b: &CubicBez) -> bool {
    let chord = b.p3 - b.p0;
    let len2 = chord.length_squared();
    if len2 < 1e-12 {
        return (b.p1 - b.p0).length_squared() < FLATTEN_TOLERANCE * FLATTEN_TOLERANCE
            && (b.p2 - b.p0).length_squared() < FLATTEN_TOLERANCE * FLATTEN_TOLERANCE;
    }
    let d1 = cross(chord, b.p1 - b.p0);
    let d2 = cross(chord, b.p2 - b.p0);
    let max = FLATTEN_TOLERANCE * FLATTEN_TOLERANCE * len2;
    d1 * d1 <= max && d2 * d2 <= max
}

#[inline]
fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path::PathDirection;
    use crate::geometry::rect::Rect;

    #[test]
    fn snap_quantizes_to_64th() {
        let v = snap26_6(1.23456);
        assert!((v * 64.0 - (v * 64.0).round()).abs() < 1e-6);
    }

    #[test]
    fn rect_flattens_to_one_closed_contour() {
        let mut p = Path::new();
        p.add_rect(Rect::new(0.0, 0.0, 4.0, 4.0), PathDirection::Cw);
        let c = flatten(&p);
        assert_eq!(c.len(), 1);
        assert!(c[0].closed);
        assert_eq!(c[0].points.len(), 4);
    }

    #[test]
    fn circle_flattens_smooth() {
        let mut p = Path::new();
        p.add_circle(10.0, 10.0, 8.0, PathDirection::Cw);
        let c = flatten(&p);
        assert_eq!(c.len(), 1);
        assert!(c[0].points.len() > 8, "got {}", c[0].points.len());
        for pt in &c[0].points {
            let r = (*pt - Vec2::new(10.0, 10.0)).length();
            assert!((r - 8.0).abs() < 0.2, "point off circle: {pt:?}");
        }
    }
}
