//! Layer masks.
//!
//! Every mask rasterizes its (possibly animated) bezier path each frame;
//! the layer mask folds the individual coverage masks into one RLE under
//! the mask modes.

use glam::Affine2;

use crate::geometry::path::Path;
use crate::geometry::rect::IntRect;
use crate::model::layer::{MaskData, MaskMode};
use crate::raster::rle::Rle;
use crate::raster::{FillRule, Rasterizer};
use crate::render::layer::DirtyFlags;
use crate::utils::fuzzy_compare;

pub struct MaskItem {
    data: MaskData,
    local_path: Path,
    final_path: Path,
    rasterizer: Rasterizer,
    combined_alpha: f32,
    raster_request: bool,
    rle_valid: bool,
    rle: Rle,
}

impl MaskItem {
    #[must_use]
    pub fn new(data: MaskData) -> Self {
        Self {
            data,
            local_path: Path::new(),
            final_path: Path::new(),
            rasterizer: Rasterizer::new(),
            combined_alpha: 1.0,
            raster_request: false,
            rle_valid: false,
            rle: Rle::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> MaskMode {
        self.data.mode
    }

    pub fn update(&mut self, frame_no: f32, parent_matrix: &Affine2, flag: DirtyFlags) {
        if flag == DirtyFlags::NONE && self.data.statik && self.rle_valid {
            return;
        }

        if self.data.shape.is_static() {
            if self.local_path.is_empty() {
                let shape = self.data.shape.eval(frame_no);
                shape.to_path(&mut self.local_path);
            }
        } else {
            self.local_path.reset();
            let shape = self.data.shape.eval(frame_no);
            shape.to_path(&mut self.local_path);
        }
        // Masks do not inherit the layer opacity.
        self.combined_alpha = self.data.opacity.eval(frame_no) / 100.0;

        self.final_path.reset();
        self.final_path.add_path(&self.local_path, None);
        self.final_path.transform(parent_matrix);
        self.raster_request = true;
    }

    pub fn preprocess(&mut self, clip: &IntRect) {
        if self.raster_request {
            self.rasterizer
                .rasterize_fill(&self.final_path, FillRule::Winding, clip);
        }
    }

    fn rle(&mut self) -> &Rle {
        if self.raster_request {
            self.raster_request = false;
            self.rle = self.rasterizer.take_rle();
            if !fuzzy_compare(self.combined_alpha, 1.0) {
                self.rle
                    .mul_alpha((self.combined_alpha.clamp(0.0, 1.0) * 255.0) as u8);
            }
            if self.data.inverted {
                self.rle.invert();
            }
            self.rle_valid = true;
        }
        &self.rle
    }
}

pub struct LayerMask {
    masks: Vec<MaskItem>,
    statik: bool,
    dirty: bool,
    rle: Rle,
}

impl LayerMask {
    #[must_use]
    pub fn new(masks: &[MaskData]) -> Self {
        let statik = masks.iter().all(|m| m.statik);
        Self {
            masks: masks.iter().cloned().map(MaskItem::new).collect(),
            statik,
            dirty: true,
            rle: Rle::new(),
        }
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.statik
    }

    pub fn update(&mut self, frame_no: f32, parent_matrix: &Affine2, flag: DirtyFlags) {
        if flag == DirtyFlags::NONE && self.statik && !self.dirty {
            return;
        }
        for mask in &mut self.masks {
            mask.update(frame_no, parent_matrix, flag);
        }
        self.dirty = true;
    }

    pub fn preprocess(&mut self, clip: &IntRect) {
        for mask in &mut self.masks {
            mask.preprocess(clip);
        }
    }

    /// The combined mask: Add unions, Subtract/Intersect seed with the
    /// clip rect when empty, Difference xors.
    pub fn mask_rle(&mut self, clip: &IntRect) -> Rle {
        if !self.dirty {
            return self.rle.clone();
        }
        let mut rle = Rle::new();
        for mask in &mut self.masks {
            let mode = mask.mode();
            let mask_rle = mask.rle().clone();
            match mode {
                MaskMode::Add => rle = rle.unioned(&mask_rle),
                MaskMode::Subtract => {
                    if rle.is_empty() && !clip.is_empty() {
                        rle = Rle::from_rect(*clip);
                    }
                    rle = rle.subtracted(&mask_rle);
                }
                MaskMode::Intersect => {
                    if rle.is_empty() && !clip.is_empty() {
                        rle = Rle::from_rect(*clip);
                    }
                    rle = rle.intersected(&mask_rle);
                }
                MaskMode::Difference => rle = rle.xored(&mask_rle),
                MaskMode::None => {}
            }
        }
        self.rle = rle.clone();
        self.dirty = false;
        rle
    }
}
