//! Render-tree leaf: a path plus its evaluated brush, rasterized on
//! demand into an owned coverage mask.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::geometry::path::Path;
use crate::geometry::rect::IntRect;
use crate::paint::Brush;
use crate::raster::rle::Rle;
use crate::raster::{CapStyle, FillRule, JoinStyle, Rasterizer};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DrawableDirty: u8 {
        const NONE = 0x00;
        const PATH = 0x01;
        const BRUSH = 0x02;
        const ALL = 0x03;
    }
}

#[derive(Debug, Clone)]
pub enum DrawableStyle {
    Fill {
        rule: FillRule,
    },
    Stroke {
        cap: CapStyle,
        join: JoinStyle,
        miter_limit: f32,
        width: f32,
        dash: SmallVec<[f32; 8]>,
    },
}

pub struct Drawable {
    pub path: Path,
    pub brush: Brush,
    pub style: DrawableStyle,
    pub flags: DrawableDirty,
    rasterizer: Rasterizer,
}

impl Drawable {
    #[must_use]
    pub fn fill(rule: FillRule) -> Self {
        Self {
            path: Path::new(),
            brush: Brush::None,
            style: DrawableStyle::Fill { rule },
            flags: DrawableDirty::ALL,
            rasterizer: Rasterizer::new(),
        }
    }

    #[must_use]
    pub fn stroke() -> Self {
        Self {
            path: Path::new(),
            brush: Brush::None,
            style: DrawableStyle::Stroke {
                cap: CapStyle::Flat,
                join: JoinStyle::Miter,
                miter_limit: 4.0,
                width: 0.0,
                dash: SmallVec::new(),
            },
            flags: DrawableDirty::ALL,
            rasterizer: Rasterizer::new(),
        }
    }

    pub fn set_path(&mut self, path: Path) {
        self.path = path;
        self.flags |= DrawableDirty::PATH;
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
        self.flags |= DrawableDirty::BRUSH;
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        if let DrawableStyle::Fill { rule: r } = &mut self.style {
            *r = rule;
        }
    }

    pub fn set_stroke_info(
        &mut self,
        cap: CapStyle,
        join: JoinStyle,
        miter_limit: f32,
        width: f32,
    ) {
        if let DrawableStyle::Stroke {
            cap: c,
            join: j,
            miter_limit: ml,
            width: w,
            ..
        } = &mut self.style
        {
            if *c != cap || *j != join || *ml != miter_limit || *w != width {
                *c = cap;
                *j = join;
                *ml = miter_limit;
                *w = width;
                self.flags |= DrawableDirty::PATH;
            }
        }
    }

    pub fn set_dash(&mut self, pattern: &[f32]) {
        if let DrawableStyle::Stroke { dash, .. } = &mut self.style {
            if dash.as_slice() != pattern {
                dash.clear();
                dash.extend_from_slice(pattern);
                self.flags |= DrawableDirty::PATH;
            }
        }
    }

    /// Rasterizes the path when it changed since the last pass.
    pub fn preprocess(&mut self, clip: &IntRect) {
        if !self.flags.contains(DrawableDirty::PATH) {
            return;
        }
        match &self.style {
            DrawableStyle::Fill { rule } => {
                self.rasterizer.rasterize_fill(&self.path, *rule, clip);
            }
            DrawableStyle::Stroke {
                cap,
                join,
                miter_limit,
                width,
                dash,
            } => {
                let dash = if dash.is_empty() {
                    None
                } else {
                    Some(dash.as_slice())
                };
                self.rasterizer
                    .rasterize_stroke(&self.path, *cap, *join, *width, *miter_limit, dash, clip);
            }
        }
        self.flags.remove(DrawableDirty::PATH);
    }

    #[must_use]
    pub fn rle(&self) -> &Rle {
        self.rasterizer.rle()
    }

    pub fn clear_dirty(&mut self) {
        self.flags = DrawableDirty::NONE;
    }
}
