//! Stroke expansion.
//!
//! Strokes are converted to fill outlines: each flattened contour is
//! offset on both sides, joined at vertices (miter with limit fallback,
//! bevel, round) and capped (flat, square, round). The outlines are then
//! filled with non-zero winding.

use glam::Vec2;

use crate::geometry::rect::IntRect;
use crate::raster::flatten::Contour;
use crate::raster::rle::Rle;
use crate::raster::{CapStyle, FillRule, JoinStyle, scan};

/// Angular step for round joins and caps.
const ROUND_STEP: f32 = std::f32::consts::PI / 16.0;

pub struct StrokeStyle {
    pub cap: CapStyle,
    pub join: JoinStyle,
    pub width: f32,
    pub miter_limit: f32,
}

/// Expands flattened contours and rasterizes the result.
#[must_use]
pub fn stroke(contours: &[Contour], style: &StrokeStyle, clip: &IntRect) -> Rle {
    if style.width <= 0.0 {
        return Rle::new();
    }
    let hw = style.width * 0.5;
    let mut outlines: Vec<Contour> = Vec::new();
    for contour in contours {
        let pts = dedup(&contour.points);
        if pts.len() < 2 {
            // A degenerate subpath still draws a dot with round caps.
            if pts.len() == 1 && style.cap == CapStyle::Round {
                outlines.push(circle_contour(pts[0], hw));
            }
            continue;
        }
        if contour.closed {
            outlines.push(offset_ring(&pts, hw, style, false));
            outlines.push(offset_ring(&pts, hw, style, true));
        } else {
            outlines.push(offset_open(&pts, hw, style));
        }
    }
    scan::fill(&outlines, FillRule::Winding, clip)
}

fn dedup(pts: &[Vec2]) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(pts.len());
    for &p in pts {
        if out.last().is_none_or(|last| (*last - p).length_squared() > 1e-12) {
            out.push(p);
        }
    }
    if out.len() > 1 && (out[0] - *out.last().unwrap()).length_squared() <= 1e-12 {
        out.pop();
    }
    out
}

fn circle_contour(center: Vec2, r: f32) -> Contour {
    let steps = 32;
    let mut points = Vec::with_capacity(steps);
    for i in 0..steps {
        let a = i as f32 / steps as f32 * std::f32::consts::TAU;
        points.push(center + Vec2::new(a.cos(), a.sin()) * r);
    }
    Contour {
        points,
        closed: true,
    }
}

#[inline]
fn normal(from: Vec2, to: Vec2) -> Vec2 {
    let d = (to - from).normalize_or_zero();
    Vec2::new(-d.y, d.x)
}

/// One side of a closed contour; `reverse` walks it backwards, producing
/// the inner ring with opposite winding so non-zero filling leaves the
/// middle empty.
fn offset_ring(pts: &[Vec2], hw: f32, style: &StrokeStyle, reverse: bool) -> Contour {
    let n = pts.len();
    let mut out = Vec::with_capacity(n * 2);
    let idx = |i: usize| -> Vec2 {
        if reverse {
            pts[(n - i % n) % n]
        } else {
            pts[i % n]
        }
    };
    for i in 0..n {
        let prev = idx(i + n - 1);
        let curr = idx(i);
        let next = idx(i + 1);
        add_join(&mut out, prev, curr, next, hw, style);
    }
    Contour {
        points: out,
        closed: true,
    }
}

/// Full outline of an open polyline: left side out, end cap, right side
/// back, start cap.
fn offset_open(pts: &[Vec2], hw: f32, style: &StrokeStyle) -> Contour {
    let n = pts.len();
    let mut out = Vec::with_capacity(n * 2 + 8);

    // Forward side.
    out.push(pts[0] + normal(pts[0], pts[1]) * hw);
    for i in 1..n - 1 {
        add_join(&mut out, pts[i - 1], pts[i], pts[i + 1], hw, style);
    }
    out.push(pts[n - 1] + normal(pts[n - 2], pts[n - 1]) * hw);

    // End cap.
    add_cap(&mut out, pts[n - 1], pts[n - 2], hw, style.cap);

    // Return side.
    out.push(pts[n - 1] - normal(pts[n - 2], pts[n - 1]) * hw);
    for i in (1..n - 1).rev() {
        add_join(&mut out, pts[i + 1], pts[i], pts[i - 1], hw, style);
    }
    out.push(pts[0] - normal(pts[0], pts[1]) * hw);

    // Start cap.
    add_cap(&mut out, pts[0], pts[1], hw, style.cap);

    Contour {
        points: out,
        closed: true,
    }
}

/// Emits the outline points around `curr` for the turn prev→curr→next,
/// offset to the left of the direction of travel.
fn add_join(out: &mut Vec<Vec2>, prev: Vec2, curr: Vec2, next: Vec2, hw: f32, style: &StrokeStyle) {
    let n0 = normal(prev, curr);
    let n1 = normal(curr, next);
    let turn = (curr - prev).perp_dot(next - curr);

    let p0 = curr + n0 * hw;
    let p1 = curr + n1 * hw;

    if turn.abs() < 1e-6 {
        out.push(p0);
        return;
    }

    // Convex side of the turn gets the join treatment; the concave side
    // just folds through both offset points (the overlap fills out under
    // non-zero winding).
    let convex = turn < 0.0;
    if !convex {
        out.push(p0);
        out.push(p1);
        return;
    }

    match style.join {
        JoinStyle::Bevel => {
            out.push(p0);
            out.push(p1);
        }
        JoinStyle::Miter => {
            let m = n0 + n1;
            let denom = m.length_squared();
            if denom < 1e-9 {
                out.push(p0);
                out.push(p1);
                return;
            }
            // Bisector intersection: distance 2·hw/|m| along n0+n1.
            let miter = curr + m * (2.0 * hw / denom);
            // Fall back to bevel past the miter limit.
            if (miter - curr).length() > style.miter_limit.max(1.0) * hw {
                out.push(p0);
                out.push(p1);
            } else {
                out.push(p0);
                out.push(miter);
                out.push(p1);
            }
        }
        JoinStyle::Round => {
            out.push(p0);
            arc_between(out, curr, p0, p1, hw);
            out.push(p1);
        }
    }
}

/// Appends arc points from `from` to `to` around `center` at radius `r`,
/// taking the short way.
fn arc_between(out: &mut Vec<Vec2>, center: Vec2, from: Vec2, to: Vec2, r: f32) {
    let a0 = (from - center).y.atan2((from - center).x);
    let mut a1 = (to - center).y.atan2((to - center).x);
    let mut sweep = a1 - a0;
    if sweep > std::f32::consts::PI {
        sweep -= std::f32::consts::TAU;
    } else if sweep < -std::f32::consts::PI {
        sweep += std::f32::consts::TAU;
    }
    a1 = a0 + sweep;
    let steps = (sweep.abs() / ROUND_STEP).ceil() as usize;
    for i in 1..steps {
        let a = a0 + (a1 - a0) * (i as f32 / steps as f32);
        out.push(center + Vec2::new(a.cos(), a.sin()) * r);
    }
}

/// Cap at `end` pointing away from `inner`.
fn add_cap(out: &mut Vec<Vec2>, end: Vec2, inner: Vec2, hw: f32, cap: CapStyle) {
    let dir = (end - inner).normalize_or_zero();
    let n = Vec2::new(-dir.y, dir.x);
    match cap {
        CapStyle::Flat => {}
        CapStyle::Square => {
            out.push(end + n * hw + dir * hw);
            out.push(end - n * hw + dir * hw);
        }
        CapStyle::Round => {
            // Half circle from +n to -n passing through +dir.
            let a0 = n.y.atan2(n.x);
            let steps = 16;
            for i in 1..steps {
                let a = a0 - std::f32::consts::PI * (i as f32 / steps as f32);
                out.push(end + Vec2::new(a.cos(), a.sin()) * hw);
            }
        }
    }
}
