//! Scanline coverage rasterization.
//!
//! Contours are converted to y-monotonic edges, then each pixel row is
//! sampled with several sub-scanlines. Horizontal coverage is exact per
//! sub-scanline; vertical coverage comes from the sub-sample count.

use glam::Vec2;

use crate::geometry::rect::IntRect;
use crate::raster::FillRule;
use crate::raster::flatten::Contour;
use crate::raster::rle::{Rle, Span};

/// Sub-scanlines per pixel row.
const SUB_SAMPLES: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Edge {
    /// Top endpoint.
    x0: f32,
    y0: f32,
    /// Bottom endpoint.
    x1: f32,
    y1: f32,
    /// +1 when the original segment pointed down, -1 when up.
    winding: i32,
}

impl Edge {
    fn from_points(a: Vec2, b: Vec2) -> Option<Edge> {
        if a.y == b.y {
            return None;
        }
        if a.y < b.y {
            Some(Edge {
                x0: a.x,
                y0: a.y,
                x1: b.x,
                y1: b.y,
                winding: 1,
            })
        } else {
            Some(Edge {
                x0: b.x,
                y0: b.y,
                x1: a.x,
                y1: a.y,
                winding: -1,
            })
        }
    }

    #[inline]
    fn x_at(&self, y: f32) -> f32 {
        self.x0 + (self.x1 - self.x0) * (y - self.y0) / (self.y1 - self.y0)
    }
}

/// Fills flattened contours into an RLE clipped to `clip`. Open contours
/// are treated as closed (implicit closing edge), matching fill
/// semantics.
#[must_use]
pub fn fill(contours: &[Contour], fill_rule: FillRule, clip: &IntRect) -> Rle {
    if clip.is_empty() {
        return Rle::new();
    }

    let mut edges: Vec<Edge> = Vec::new();
    let mut y_min = f32::MAX;
    let mut y_max = f32::MIN;
    for contour in contours {
        let pts = &contour.points;
        if pts.len() < 2 {
            continue;
        }
        for i in 0..pts.len() {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            if let Some(e) = Edge::from_points(a, b) {
                y_min = y_min.min(e.y0);
                y_max = y_max.max(e.y1);
                edges.push(e);
            }
        }
    }
    if edges.is_empty() {
        return Rle::new();
    }

    let y_start = (y_min.floor() as i32).max(clip.y);
    let y_end = (y_max.ceil() as i32).min(clip.bottom());
    if y_end <= y_start {
        return Rle::new();
    }

    let width = clip.width as usize;
    let mut row = vec![0.0_f32; width];
    let mut crossings: Vec<(f32, i32)> = Vec::new();
    let mut spans: Vec<Span> = Vec::new();

    for y in y_start..y_end {
        row.fill(0.0);
        let mut touched = false;

        for s in 0..SUB_SAMPLES {
            let sy = y as f32 + (s as f32 + 0.5) / SUB_SAMPLES as f32;
            crossings.clear();
            for e in &edges {
                if sy >= e.y0 && sy < e.y1 {
                    crossings.push((e.x_at(sy), e.winding));
                }
            }
            if crossings.is_empty() {
                continue;
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            // Walk crossings accumulating winding; emit inside intervals.
            let mut winding = 0;
            let mut interval_start = 0.0_f32;
            for &(x, w) in &crossings {
                let was_inside = inside(winding, fill_rule);
                winding += w;
                let is_inside = inside(winding, fill_rule);
                if !was_inside && is_inside {
                    interval_start = x;
                } else if was_inside && !is_inside {
                    touched |= accumulate(&mut row, clip, interval_start, x);
                }
            }
        }

        if touched {
            emit_row(&row, clip, y, &mut spans);
        }
    }
    Rle::from_spans(spans)
}

#[inline]
fn inside(winding: i32, rule: FillRule) -> bool {
    match rule {
        FillRule::Winding => winding != 0,
        FillRule::EvenOdd => winding % 2 != 0,
    }
}

/// Adds one sub-scanline interval's horizontal coverage into the row
/// accumulator. Returns whether anything landed inside the clip.
fn accumulate(row: &mut [f32], clip: &IntRect, x0: f32, x1: f32) -> bool {
    let weight = 1.0 / SUB_SAMPLES as f32;
    let x0 = x0.max(clip.x as f32);
    let x1 = x1.min(clip.right() as f32);
    if x1 <= x0 {
        return false;
    }
    let first = x0.floor() as i32;
    let last = (x1.ceil() as i32 - 1).max(first);
    for px in first..=last {
        let lo = (px as f32).max(x0);
        let hi = ((px + 1) as f32).min(x1);
        if hi > lo {
            let idx = (px - clip.x) as usize;
            if idx < row.len() {
                row[idx] += (hi - lo) * weight;
            }
        }
    }
    true
}

/// Quantizes an accumulated row into spans, merging equal-coverage runs.
fn emit_row(row: &[f32], clip: &IntRect, y: i32, out: &mut Vec<Span>) {
    let mut x = 0usize;
    while x < row.len() {
        let cov = (row[x].clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
        if cov == 0 {
            x += 1;
            continue;
        }
        let start = x;
        while x < row.len() {
            let c = (row[x].clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
            if c != cov {
                break;
            }
            x += 1;
        }
        out.push(Span {
            x: (clip.x + start as i32) as i16,
            y: y as i16,
            len: (x - start) as u16,
            coverage: cov.min(255) as u8,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path::{Path, PathDirection};
    use crate::geometry::rect::Rect;
    use crate::raster::flatten::flatten;

    fn fill_rect(x: f32, y: f32, w: f32, h: f32) -> Rle {
        let mut p = Path::new();
        p.add_rect(Rect::new(x, y, w, h), PathDirection::Cw);
        fill(
            &flatten(&p),
            FillRule::Winding,
            &IntRect::new(0, 0, 64, 64),
        )
    }

    #[test]
    fn integer_rect_is_fully_covered() {
        let rle = fill_rect(2.0, 3.0, 10.0, 5.0);
        assert_eq!(rle.bounds(), IntRect::new(2, 3, 10, 5));
        for s in rle.spans() {
            assert_eq!(s.coverage, 255, "span {s:?}");
            assert_eq!(s.len, 10);
        }
    }

    #[test]
    fn half_pixel_rect_has_half_coverage() {
        let rle = fill_rect(0.0, 0.0, 0.5, 1.0);
        assert_eq!(rle.spans().len(), 1);
        let c = rle.spans()[0].coverage;
        assert!((i32::from(c) - 128).abs() <= 2, "coverage {c}");
    }

    #[test]
    fn empty_contours_produce_no_spans() {
        let rle = fill(&[], FillRule::Winding, &IntRect::new(0, 0, 8, 8));
        assert!(rle.is_empty());
    }

    #[test]
    fn clip_limits_output() {
        let mut p = Path::new();
        p.add_rect(Rect::new(0.0, 0.0, 100.0, 100.0), PathDirection::Cw);
        let rle = fill(&flatten(&p), FillRule::Winding, &IntRect::new(0, 0, 8, 8));
        assert_eq!(rle.bounds(), IntRect::new(0, 0, 8, 8));
    }

    #[test]
    fn even_odd_hole() {
        let mut p = Path::new();
        p.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0), PathDirection::Cw);
        p.add_rect(Rect::new(3.0, 3.0, 4.0, 4.0), PathDirection::Cw);
        let rle = fill(
            &flatten(&p),
            FillRule::EvenOdd,
            &IntRect::new(0, 0, 16, 16),
        );
        // The centre of the hole carries no coverage.
        let covered = rle
            .spans()
            .iter()
            .any(|s| s.y == 5 && i32::from(s.x) <= 5 && i32::from(s.x) + i32::from(s.len) > 5);
        assert!(!covered, "hole should be empty");
    }
}
