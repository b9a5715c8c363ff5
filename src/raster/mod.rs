//! Rasterizer facade.
//!
//! Converts a path plus a fill or stroke style into an RLE coverage mask
//! clipped to a rectangle. Curves are flattened and snapped to a 26.6
//! grid before scan conversion.

pub mod flatten;
pub mod rle;
pub mod scan;
pub mod stroke;

use crate::geometry::dash::Dasher;
use crate::geometry::path::Path;
use crate::geometry::rect::IntRect;
use rle::Rle;
use stroke::StrokeStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    EvenOdd,
    #[default]
    Winding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinStyle {
    #[default]
    Miter,
    Bevel,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapStyle {
    #[default]
    Flat,
    Square,
    Round,
}

/// Owns the RLE produced from the most recent rasterize call.
#[derive(Debug, Default)]
pub struct Rasterizer {
    rle: Rle,
}

impl Rasterizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan-converts a filled path.
    pub fn rasterize_fill(&mut self, path: &Path, fill_rule: FillRule, clip: &IntRect) {
        if path.is_empty() || clip.is_empty() {
            self.rle = Rle::new();
            return;
        }
        let contours = flatten::flatten(path);
        self.rle = scan::fill(&contours, fill_rule, clip);
    }

    /// Expands and scan-converts a stroked path. A dash pattern, when
    /// present, is applied before stroking.
    pub fn rasterize_stroke(
        &mut self,
        path: &Path,
        cap: CapStyle,
        join: JoinStyle,
        width: f32,
        miter_limit: f32,
        dash: Option<&[f32]>,
        clip: &IntRect,
    ) {
        if path.is_empty() || clip.is_empty() || width <= 0.0 {
            self.rle = Rle::new();
            return;
        }
        let dashed;
        let path = match dash {
            Some(pattern) if !pattern.is_empty() => {
                dashed = Dasher::new(pattern).dashed(path);
                &dashed
            }
            _ => path,
        };
        let contours = flatten::flatten(path);
        let style = StrokeStyle {
            cap,
            join,
            width,
            miter_limit,
        };
        self.rle = stroke::stroke(&contours, &style, clip);
    }

    /// The coverage mask of the last rasterize call.
    #[must_use]
    pub fn rle(&self) -> &Rle {
        &self.rle
    }

    /// Moves the coverage mask out, leaving the rasterizer empty.
    #[must_use]
    pub fn take_rle(&mut self) -> Rle {
        std::mem::take(&mut self.rle)
    }
}
