//! The per-playback render tree.
//!
//! A [`RenderTree`] mirrors one composition: built once, updated per
//! frame, rasterized into a caller surface. The viewbox is fitted to the
//! viewport with min-scale + center alignment, or stretched when aspect
//! preservation is off.

pub mod content;
pub mod drawable;
pub mod layer;
pub mod mask;

use std::sync::Arc;

use glam::{Affine2, Vec2};

use crate::model::Composition;
use crate::paint::{Painter, Surface};
use crate::raster::rle::Rle;
use layer::LayerItem;

pub struct RenderTree {
    comp: Arc<Composition>,
    root: Option<LayerItem>,
    view_size: (u32, u32),
    cur_frame: f32,
    keep_aspect_ratio: bool,
    primed: bool,
}

impl RenderTree {
    #[must_use]
    pub fn new(comp: Arc<Composition>) -> Self {
        let root = comp.root.map(|id| LayerItem::new(&comp, id));
        Self {
            comp,
            root,
            view_size: (0, 0),
            cur_frame: f32::MIN,
            keep_aspect_ratio: true,
            primed: false,
        }
    }

    /// Advances the tree to `frame_no` for the given viewport. Returns
    /// `false` when nothing changed since the last update.
    pub fn update(&mut self, frame_no: f32, width: u32, height: u32, keep_aspect: bool) -> bool {
        if self.primed
            && self.view_size == (width, height)
            && self.cur_frame == frame_no
            && self.keep_aspect_ratio == keep_aspect
        {
            return false;
        }
        self.view_size = (width, height);
        self.cur_frame = frame_no;
        self.keep_aspect_ratio = keep_aspect;
        self.primed = true;

        let view_box = self.comp.size;
        let m = if view_box.x <= 0.0 || view_box.y <= 0.0 {
            Affine2::IDENTITY
        } else {
            let sx = width as f32 / view_box.x;
            let sy = height as f32 / view_box.y;
            if keep_aspect {
                let scale = sx.min(sy);
                let tx = (width as f32 - view_box.x * scale) * 0.5;
                let ty = (height as f32 - view_box.y * scale) * 0.5;
                Affine2::from_translation(Vec2::new(tx, ty))
                    * Affine2::from_scale(Vec2::splat(scale))
            } else {
                Affine2::from_scale(Vec2::new(sx, sy))
            }
        };

        if let Some(root) = &mut self.root {
            root.update(&self.comp, frame_no, &m, 1.0);
        }
        true
    }

    /// Rasterizes the current tree state into the surface. The surface
    /// is cleared first; every pixel of the target is written.
    pub fn render(&mut self, surface: Surface<'_>) {
        let clip = surface.rect();
        let mut painter = Painter::begin(surface);
        painter.set_draw_region(clip);
        if let Some(root) = &mut self.root {
            root.preprocess(&self.comp, &clip);
            root.render(&mut painter, &Rle::new(), &Rle::new(), &self.comp);
        }
    }
}
