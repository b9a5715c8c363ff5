//! Run-length-encoded coverage masks.
//!
//! The rasterizer output is a list of horizontal spans, sorted by (y, x),
//! non-overlapping within a scanline. Mask composition is
//! span algebra over these lists.

use crate::geometry::rect::IntRect;

/// One horizontal run of pixels sharing a coverage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: i16,
    pub y: i16,
    pub len: u16,
    pub coverage: u8,
}

/// A coverage mask as sorted spans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rle {
    spans: Vec<Span>,
}

impl Rle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_spans(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Full-coverage mask over a rectangle.
    #[must_use]
    pub fn from_rect(rect: IntRect) -> Self {
        if rect.is_empty() {
            return Self::new();
        }
        let mut spans = Vec::with_capacity(rect.height as usize);
        for y in rect.y..rect.bottom() {
            spans.push(Span {
                x: rect.x as i16,
                y: y as i16,
                len: rect.width as u16,
                coverage: 255,
            });
        }
        Self { spans }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Bounding box of all spans.
    #[must_use]
    pub fn bounds(&self) -> IntRect {
        if self.spans.is_empty() {
            return IntRect::default();
        }
        let mut x1 = i32::MAX;
        let mut x2 = i32::MIN;
        let y1 = i32::from(self.spans[0].y);
        let y2 = i32::from(self.spans[self.spans.len() - 1].y);
        for s in &self.spans {
            x1 = x1.min(i32::from(s.x));
            x2 = x2.max(i32::from(s.x) + i32::from(s.len));
        }
        IntRect::new(x1, y1, x2 - x1, y2 - y1 + 1)
    }

    /// Scales every coverage value by `alpha` in [0,255].
    pub fn mul_alpha(&mut self, alpha: u8) {
        let a = u32::from(alpha) + 1;
        for s in &mut self.spans {
            s.coverage = ((u32::from(s.coverage) * a) >> 8) as u8;
        }
        self.spans.retain(|s| s.coverage > 0);
    }

    /// Flips coverage inside the spans (does not extend beyond them).
    pub fn invert(&mut self) {
        for s in &mut self.spans {
            s.coverage = 255 - s.coverage;
        }
        self.spans.retain(|s| s.coverage > 0);
    }

    /// Clips spans against a rectangle.
    #[must_use]
    pub fn intersected_rect(&self, clip: &IntRect) -> Rle {
        if clip.is_empty() || self.is_empty() {
            return Rle::new();
        }
        let mut out = Vec::with_capacity(self.spans.len());
        for s in &self.spans {
            let y = i32::from(s.y);
            if y < clip.y || y >= clip.bottom() {
                continue;
            }
            let x1 = i32::from(s.x).max(clip.x);
            let x2 = (i32::from(s.x) + i32::from(s.len)).min(clip.right());
            if x2 > x1 {
                out.push(Span {
                    x: x1 as i16,
                    y: s.y,
                    len: (x2 - x1) as u16,
                    coverage: s.coverage,
                });
            }
        }
        Rle { spans: out }
    }

    /// Union: coverage accumulates like stacked alpha.
    #[must_use]
    pub fn unioned(&self, other: &Rle) -> Rle {
        combine(self, other, |a, b| a + b - (a * b + 127) / 255)
    }

    /// Intersection: coverage multiplies.
    #[must_use]
    pub fn intersected(&self, other: &Rle) -> Rle {
        combine(self, other, |a, b| (a * b + 127) / 255)
    }

    /// Subtraction: keep where `other` is absent.
    #[must_use]
    pub fn subtracted(&self, other: &Rle) -> Rle {
        combine(self, other, |a, b| (a * (255 - b) + 127) / 255)
    }

    /// Symmetric difference.
    #[must_use]
    pub fn xored(&self, other: &Rle) -> Rle {
        combine(self, other, |a, b| {
            (a * (255 - b) + b * (255 - a) + 127) / 255
        })
    }
}

/// Combines two sorted span lists with a per-pixel coverage function.
/// Scanlines are swept by elementary x-intervals; equal-coverage
/// neighbours merge back into single spans.
fn combine(a: &Rle, b: &Rle, f: impl Fn(u32, u32) -> u32) -> Rle {
    let mut out: Vec<Span> = Vec::with_capacity(a.spans.len() + b.spans.len());
    let mut ia = 0;
    let mut ib = 0;
    let sa = &a.spans;
    let sb = &b.spans;

    while ia < sa.len() || ib < sb.len() {
        // Current scanline = smallest y on either side.
        let y = match (sa.get(ia), sb.get(ib)) {
            (Some(x), Some(z)) => x.y.min(z.y),
            (Some(x), None) => x.y,
            (None, Some(z)) => z.y,
            (None, None) => break,
        };
        let a_start = ia;
        while ia < sa.len() && sa[ia].y == y {
            ia += 1;
        }
        let b_start = ib;
        while ib < sb.len() && sb[ib].y == y {
            ib += 1;
        }
        combine_scanline(&sa[a_start..ia], &sb[b_start..ib], y, &f, &mut out);
    }
    Rle { spans: out }
}

fn combine_scanline(
    row_a: &[Span],
    row_b: &[Span],
    y: i16,
    f: &impl Fn(u32, u32) -> u32,
    out: &mut Vec<Span>,
) {
    // Sweep over boundaries of both rows.
    let mut ia = 0;
    let mut ib = 0;
    let mut x = i32::MIN;

    let push = |out: &mut Vec<Span>, x1: i32, x2: i32, cov: u32| {
        if x2 <= x1 || cov == 0 {
            return;
        }
        let cov = cov.min(255) as u8;
        if let Some(last) = out.last_mut()
            && last.y == y
            && last.coverage == cov
            && i32::from(last.x) + i32::from(last.len) == x1
        {
            last.len += (x2 - x1) as u16;
            return;
        }
        out.push(Span {
            x: x1 as i16,
            y,
            len: (x2 - x1) as u16,
            coverage: cov,
        });
    };

    loop {
        let a = row_a.get(ia);
        let b = row_b.get(ib);
        if a.is_none() && b.is_none() {
            break;
        }

        let a_range = a.map(|s| (i32::from(s.x), i32::from(s.x) + i32::from(s.len)));
        let b_range = b.map(|s| (i32::from(s.x), i32::from(s.x) + i32::from(s.len)));

        // Next boundary after x.
        let mut next = i32::MAX;
        for r in [a_range, b_range].into_iter().flatten() {
            if r.0 > x {
                next = next.min(r.0);
            }
            if r.1 > x {
                next = next.min(r.1);
            }
        }
        if next == i32::MAX {
            break;
        }
        let start = if x == i32::MIN {
            // First boundary opens the sweep.
            x = next;
            continue;
        } else {
            x
        };

        let ca = a_range
            .filter(|r| start >= r.0 && start < r.1)
            .map_or(0, |_| u32::from(row_a[ia].coverage));
        let cb = b_range
            .filter(|r| start >= r.0 && start < r.1)
            .map_or(0, |_| u32::from(row_b[ib].coverage));
        push(out, start, next, f(ca, cb));

        // Advance past consumed spans.
        if let Some(r) = a_range
            && next >= r.1
        {
            ia += 1;
        }
        if let Some(r) = b_range
            && next >= r.1
        {
            ib += 1;
        }
        x = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_rle(x: i32, y: i32, w: i32, h: i32) -> Rle {
        Rle::from_rect(IntRect::new(x, y, w, h))
    }

    #[test]
    fn rect_mask_has_one_span_per_line() {
        let r = rect_rle(2, 3, 5, 4);
        assert_eq!(r.spans().len(), 4);
        assert!(r.spans().iter().all(|s| s.coverage == 255 && s.len == 5));
        assert_eq!(r.bounds(), IntRect::new(2, 3, 5, 4));
    }

    #[test]
    fn union_of_disjoint_rects() {
        let u = rect_rle(0, 0, 2, 1).unioned(&rect_rle(5, 0, 2, 1));
        assert_eq!(u.spans().len(), 2);
    }

    #[test]
    fn union_of_adjacent_rects_merges() {
        let u = rect_rle(0, 0, 2, 1).unioned(&rect_rle(2, 0, 2, 1));
        assert_eq!(u.spans().len(), 1);
        assert_eq!(u.spans()[0].len, 4);
    }

    #[test]
    fn intersection_clips() {
        let i = rect_rle(0, 0, 4, 4).intersected(&rect_rle(2, 2, 4, 4));
        assert_eq!(i.bounds(), IntRect::new(2, 2, 2, 2));
        assert!(i.spans().iter().all(|s| s.coverage == 255));
    }

    #[test]
    fn subtract_removes_overlap() {
        let s = rect_rle(0, 0, 4, 1).subtracted(&rect_rle(2, 0, 4, 1));
        assert_eq!(s.spans().len(), 1);
        assert_eq!(s.spans()[0].x, 0);
        assert_eq!(s.spans()[0].len, 2);
    }

    #[test]
    fn xor_keeps_non_overlap() {
        let x = rect_rle(0, 0, 4, 1).xored(&rect_rle(2, 0, 4, 1));
        // [0,2) and [4,6) survive, [2,4) cancels.
        assert_eq!(x.spans().len(), 2);
        assert_eq!(x.spans()[0].x, 0);
        assert_eq!(x.spans()[1].x, 4);
    }

    #[test]
    fn empty_interactions() {
        let e = Rle::new();
        let r = rect_rle(0, 0, 2, 2);
        assert!(e.intersected(&r).is_empty());
        assert_eq!(e.unioned(&r), r);
        assert!(r.subtracted(&r).is_empty());
    }

    #[test]
    fn mul_alpha_halves_coverage() {
        let mut r = rect_rle(0, 0, 2, 1);
        r.mul_alpha(128);
        assert_eq!(r.spans()[0].coverage, 128);
    }
}
