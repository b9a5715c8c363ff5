//! Per-playback layer items.
//!
//! Each layer item mirrors a model layer and carries the mutable
//! per-frame state: combined matrix, combined alpha, dirty flags, an
//! optional layer mask and a scratch bitmap for matte and group-opacity
//! composition. Children are kept back-to-front (paint order).

use bitflags::bitflags;
use glam::{Affine2, Vec2};
use smallvec::SmallVec;

use crate::geometry::path::{Path, PathDirection};
use crate::geometry::rect::{IntRect, Rect};
use crate::model::layer::{LayerId, LayerKind, MatteType};
use crate::model::{Asset, Composition, Layer};
use crate::paint::blend::BlendMode;
use crate::paint::{Bitmap, Brush, Painter};
use crate::raster::rle::Rle;
use crate::raster::{FillRule, Rasterizer};
use crate::render::content::{ContentTree, draw_drawable};
use crate::render::drawable::Drawable;
use crate::render::mask::LayerMask;
use crate::utils::fuzzy_compare;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        const NONE = 0x00;
        const MATRIX = 0x01;
        const ALPHA = 0x02;
        const ALL = 0x03;
    }
}

pub struct LayerItem {
    layer_id: LayerId,
    content: LayerContent,
    layer_mask: Option<LayerMask>,
    combined_matrix: Affine2,
    combined_alpha: f32,
    dirty: DirtyFlags,
    frame_no: f32,
    statik: bool,
    /// Backing store for matte sources and non-trivial group opacity,
    /// allocated on demand.
    scratch: Option<Box<Bitmap>>,
}

enum LayerContent {
    Comp(CompContent),
    Solid(SolidContent),
    Image(ImageContent),
    Shape(ShapeContent),
    Null,
}

impl LayerItem {
    #[must_use]
    pub fn new(comp: &Composition, layer_id: LayerId) -> Self {
        let layer = comp.layer(layer_id);
        let content = match layer.kind {
            LayerKind::Precomp => LayerContent::Comp(CompContent::new(comp, layer)),
            LayerKind::Solid => LayerContent::Solid(SolidContent::new()),
            LayerKind::Image => match ImageContent::new(comp, layer) {
                Some(image) => LayerContent::Image(image),
                None => LayerContent::Null,
            },
            LayerKind::Shape => LayerContent::Shape(ShapeContent {
                tree: ContentTree::new(comp, &layer.shapes),
            }),
            LayerKind::Null => LayerContent::Null,
        };
        let layer_mask = if layer.masks.is_empty() {
            None
        } else {
            Some(LayerMask::new(&layer.masks))
        };
        Self {
            layer_id,
            content,
            layer_mask,
            combined_matrix: Affine2::IDENTITY,
            combined_alpha: 0.0,
            dirty: DirtyFlags::ALL,
            frame_no: f32::MIN,
            statik: layer.statik,
            scratch: None,
        }
    }

    #[inline]
    fn layer<'a>(&self, comp: &'a Composition) -> &'a Layer {
        comp.layer(self.layer_id)
    }

    #[must_use]
    pub fn visible(&self, comp: &Composition) -> bool {
        let layer = self.layer(comp);
        self.frame_no >= layer.in_frame && self.frame_no < layer.out_frame
    }

    fn skip_rendering(&self, comp: &Composition) -> bool {
        !self.visible(comp) || self.combined_alpha == 0.0
    }

    #[must_use]
    pub fn has_matte(&self, comp: &Composition) -> bool {
        self.layer(comp).has_matte()
    }

    /// Per-frame layer update: visibility, alpha, matrix, dirty flags,
    /// mask, then content.
    pub fn update(
        &mut self,
        comp: &Composition,
        frame_no: f32,
        world_matrix: &Affine2,
        parent_alpha: f32,
    ) {
        self.frame_no = frame_no;
        if !self.visible(comp) {
            return;
        }
        let layer = self.layer(comp);

        let alpha = parent_alpha * layer.transform.opacity(frame_no);
        if alpha == 0.0 {
            self.combined_alpha = 0.0;
            return;
        }

        if *world_matrix != self.combined_matrix {
            self.dirty |= DirtyFlags::MATRIX;
            self.combined_matrix = *world_matrix;
        }
        if !fuzzy_compare(self.combined_alpha, alpha) {
            self.dirty |= DirtyFlags::ALPHA;
            self.combined_alpha = alpha;
        }

        if let Some(mask) = &mut self.layer_mask {
            mask.update(frame_no, &self.combined_matrix, self.dirty);
        }

        // A static layer with clean flags has nothing new to compute,
        // except precomps which must still advance their children.
        let is_precomp = matches!(self.content, LayerContent::Comp(_));
        if !is_precomp && self.dirty == DirtyFlags::NONE && self.statik {
            return;
        }

        self.update_content(comp);
        self.dirty = DirtyFlags::NONE;
    }

    fn update_content(&mut self, comp: &Composition) {
        let layer = comp.layer(self.layer_id);
        match &mut self.content {
            LayerContent::Comp(content) => {
                content.update(
                    comp,
                    layer,
                    self.frame_no,
                    &self.combined_matrix,
                    self.combined_alpha,
                    self.dirty,
                );
            }
            LayerContent::Solid(content) => {
                content.update(layer, &self.combined_matrix, self.combined_alpha, self.dirty);
            }
            LayerContent::Image(content) => {
                content.update(&self.combined_matrix, self.combined_alpha, self.dirty);
            }
            LayerContent::Shape(content) => {
                content.tree.update(
                    comp,
                    self.frame_no,
                    &self.combined_matrix,
                    self.combined_alpha,
                    self.dirty,
                );
            }
            LayerContent::Null => {}
        }
    }

    /// Rasterizes everything this layer will draw.
    pub fn preprocess(&mut self, comp: &Composition, clip: &IntRect) {
        if self.skip_rendering(comp) {
            return;
        }
        if let Some(mask) = &mut self.layer_mask {
            mask.preprocess(clip);
        }
        match &mut self.content {
            LayerContent::Comp(content) => content.preprocess(comp, clip),
            LayerContent::Solid(content) => content.drawable.preprocess(clip),
            LayerContent::Image(content) => content.drawable.preprocess(clip),
            LayerContent::Shape(content) => content.tree.preprocess(clip),
            LayerContent::Null => {}
        }
    }

    pub fn render(
        &mut self,
        painter: &mut Painter<'_>,
        inherit_mask: &Rle,
        matte_rle: &Rle,
        comp: &Composition,
    ) {
        if self.skip_rendering(comp) {
            return;
        }
        if matches!(self.content, LayerContent::Comp(_)) {
            self.render_comp(painter, inherit_mask, matte_rle, comp);
            return;
        }

        // Fold the layer mask into the inherited one.
        let mask = match &mut self.layer_mask {
            Some(lm) => {
                let mut mask = lm.mask_rle(&painter.clip_bounding_rect());
                if !inherit_mask.is_empty() {
                    mask = mask.intersected(inherit_mask);
                }
                if mask.is_empty() {
                    return;
                }
                mask
            }
            None => inherit_mask.clone(),
        };

        let matte_type = self.layer(comp).matte_type;
        let mask_opt = (!mask.is_empty()).then_some(&mask);
        let matte_opt = (!matte_rle.is_empty()).then_some(matte_rle);

        match &mut self.content {
            LayerContent::Solid(content) => {
                render_single(&mut content.drawable, painter, mask_opt, matte_opt, matte_type);
            }
            LayerContent::Image(content) => {
                render_single(&mut content.drawable, painter, mask_opt, matte_opt, matte_type);
            }
            LayerContent::Shape(content) => {
                if matte_type == MatteType::AlphaInv && matte_opt.is_some() {
                    for idx in content.tree.render_list() {
                        content.tree.draw_one_inverse(idx, painter, mask_opt, matte_rle);
                    }
                } else {
                    content.tree.draw(painter, mask_opt, matte_opt);
                }
            }
            _ => {}
        }
    }

    fn render_comp(
        &mut self,
        painter: &mut Painter<'_>,
        inherit_mask: &Rle,
        matte_rle: &Rle,
        comp: &Composition,
    ) {
        if self.combined_alpha == 0.0 {
            return;
        }
        let complex = match &self.content {
            LayerContent::Comp(c) => c.complex,
            _ => false,
        };
        if fuzzy_compare(self.combined_alpha, 1.0) || !complex {
            self.render_comp_helper(painter, inherit_mask, matte_rle, comp);
            return;
        }

        // Non-trivial group opacity over complex content: compose the
        // subtree into a scratch buffer, then blend it once.
        let region = painter.clip_bounding_rect();
        let alpha = (self.combined_alpha * 255.0) as u8;
        let mut scratch = self.scratch.take().unwrap_or_default();
        scratch.reset(region.width.max(0) as u32, region.height.max(0) as u32);
        {
            let surface = scratch.surface();
            let mut sub_painter = Painter::begin(surface);
            sub_painter.set_draw_region(region);
            self.render_comp_helper(&mut sub_painter, inherit_mask, matte_rle, comp);
        }
        painter.set_blend_mode(BlendMode::SrcOver);
        painter.draw_bitmap(&scratch, alpha);
        self.scratch = Some(scratch);
    }

    fn render_comp_helper(
        &mut self,
        painter: &mut Painter<'_>,
        inherit_mask: &Rle,
        matte_rle: &Rle,
        comp: &Composition,
    ) {
        let mask = match &mut self.layer_mask {
            Some(lm) => {
                let mut mask = lm.mask_rle(&painter.clip_bounding_rect());
                if !inherit_mask.is_empty() {
                    mask = mask.intersected(inherit_mask);
                }
                if mask.is_empty() {
                    return;
                }
                mask
            }
            None => inherit_mask.clone(),
        };

        let LayerContent::Comp(content) = &mut self.content else {
            return;
        };

        let mask = match &mut content.clipper {
            Some(clipper) => {
                let clipped = clipper.rle_with(&mask);
                if clipped.is_empty() {
                    return;
                }
                clipped
            }
            None => mask,
        };

        // Matte pairing: a matte-flagged layer waits for the next layer
        // in paint order, which acts as its matte source.
        let mut matte_idx: Option<usize> = None;
        for i in 0..content.layers.len() {
            if content.layers[i].has_matte(comp) {
                matte_idx = Some(i);
                continue;
            }
            if content.layers[i].visible(comp) {
                if let Some(m) = matte_idx {
                    if content.layers[m].visible(comp) {
                        render_matte_pair(
                            &mut content.layers,
                            m,
                            i,
                            painter,
                            &mask,
                            matte_rle,
                            comp,
                        );
                    }
                } else {
                    content.layers[i].render(painter, &mask, matte_rle, comp);
                }
            }
            matte_idx = None;
        }
    }
}

/// Draws a solid/image drawable under mask and matte.
fn render_single(
    drawable: &mut Drawable,
    painter: &mut Painter<'_>,
    mask: Option<&Rle>,
    matte: Option<&Rle>,
    matte_type: MatteType,
) {
    match matte {
        None => draw_drawable(drawable, painter, mask, None),
        Some(matte) => {
            let mut rle = drawable.rle().clone();
            if let Some(m) = mask {
                rle = rle.intersected(m);
            }
            if rle.is_empty() {
                return;
            }
            painter.set_brush(&drawable.brush);
            if matte_type == MatteType::AlphaInv {
                let rle = rle.subtracted(matte);
                painter.draw_rle(&rle, None);
            } else {
                painter.draw_rle(&rle, Some(matte));
            }
        }
    }
}

/// Composites a matte consumer/source pair through scratch bitmaps:
/// source and consumer render separately, then the source coverage is
/// applied with DestIn/DestOut (luminance moved to alpha for luma
/// mattes) and the result blends into the target.
fn render_matte_pair(
    layers: &mut [LayerItem],
    consumer_idx: usize,
    src_idx: usize,
    painter: &mut Painter<'_>,
    mask: &Rle,
    matte_rle: &Rle,
    comp: &Composition,
) {
    debug_assert!(consumer_idx < src_idx);
    let (left, right) = layers.split_at_mut(src_idx);
    let consumer = &mut left[consumer_idx];
    let src = &mut right[0];

    let region = painter.clip_bounding_rect();
    let w = region.width.max(0) as u32;
    let h = region.height.max(0) as u32;

    let matte_type = comp.layer(consumer.layer_id).matte_type;

    // 1. Matte source into its own buffer.
    let mut src_bitmap = src.scratch.take().unwrap_or_default();
    src_bitmap.reset(w, h);
    {
        let mut sub = Painter::begin_no_clear(src_bitmap.surface());
        sub.set_draw_region(region);
        src.render(&mut sub, mask, matte_rle, comp);
    }

    // 2. Consumer into its buffer.
    let mut dst_bitmap = consumer.scratch.take().unwrap_or_default();
    dst_bitmap.reset(w, h);
    {
        let mut sub = Painter::begin_no_clear(dst_bitmap.surface());
        sub.set_draw_region(region);
        consumer.render(&mut sub, mask, matte_rle, comp);

        // 2.1 Luma mattes carry their weight in luminance.
        if matte_type == MatteType::Luma || matte_type == MatteType::LumaInv {
            src_bitmap.luma_to_alpha();
        }

        // 2.2 Apply the matte.
        let mode = match matte_type {
            MatteType::Alpha | MatteType::Luma => BlendMode::DestIn,
            MatteType::AlphaInv | MatteType::LumaInv => BlendMode::DestOut,
            MatteType::None => BlendMode::SrcOver,
        };
        sub.set_blend_mode(mode);
        sub.draw_bitmap(&src_bitmap, 255);
    }

    // 3. Composite the matted result.
    painter.set_blend_mode(BlendMode::SrcOver);
    painter.draw_bitmap(&dst_bitmap, 255);

    src.scratch = Some(src_bitmap);
    consumer.scratch = Some(dst_bitmap);
}

// ======================================================================
// Content kinds
// ======================================================================

struct CompContent {
    layers: Vec<LayerItem>,
    /// Ancestor layer-id chains resolved once from `parent` links.
    parent_chains: Vec<SmallVec<[LayerId; 2]>>,
    clipper: Option<Clipper>,
    complex: bool,
}

impl CompContent {
    fn new(comp: &Composition, layer: &Layer) -> Self {
        // Model children are front-to-back; keep paint order.
        let layers: Vec<LayerItem> = layer
            .children
            .iter()
            .rev()
            .map(|id| LayerItem::new(comp, *id))
            .collect();

        // Resolve parent chains by AE index among the siblings.
        let mut parent_chains = Vec::with_capacity(layers.len());
        for item in &layers {
            let mut chain: SmallVec<[LayerId; 2]> = SmallVec::new();
            let mut parent_id = comp.layer(item.layer_id).parent_id;
            let mut guard = 0;
            while parent_id >= 0 && guard < 64 {
                let found = layer
                    .children
                    .iter()
                    .find(|id| comp.layer(**id).id == parent_id);
                match found {
                    Some(id) => {
                        chain.push(*id);
                        parent_id = comp.layer(*id).parent_id;
                    }
                    None => break,
                }
                guard += 1;
            }
            parent_chains.push(chain);
        }

        let clipper = if layer.layer_size.x > 0.0 && layer.layer_size.y > 0.0 {
            Some(Clipper::new(layer.layer_size))
        } else {
            None
        };
        let complex = layers.len() > 1;
        Self {
            layers,
            parent_chains,
            clipper,
            complex,
        }
    }

    fn update(
        &mut self,
        comp: &Composition,
        layer: &Layer,
        frame_no: f32,
        combined_matrix: &Affine2,
        combined_alpha: f32,
        flag: DirtyFlags,
    ) {
        if let Some(clipper) = &mut self.clipper
            && flag.contains(DirtyFlags::MATRIX)
        {
            clipper.update(combined_matrix);
        }

        let mapped_frame = time_remap(layer, comp, frame_no);
        let alpha = if self.complex { 1.0 } else { combined_alpha };

        for (i, item) in self.layers.iter_mut().enumerate() {
            // Own transform composed through the parent-link chain.
            let child_layer = comp.layer(item.layer_id);
            let mut m = child_layer
                .transform
                .matrix(mapped_frame, child_layer.auto_orient);
            for ancestor in &self.parent_chains[i] {
                let ancestor_layer = comp.layer(*ancestor);
                m = ancestor_layer
                    .transform
                    .matrix(mapped_frame, ancestor_layer.auto_orient)
                    * m;
            }
            let world = *combined_matrix * m;
            item.update(comp, mapped_frame, &world, alpha);
        }
    }

    fn preprocess(&mut self, comp: &Composition, clip: &IntRect) {
        if let Some(clipper) = &mut self.clipper {
            clipper.preprocess(clip);
        }
        let mut matte_idx: Option<usize> = None;
        for i in 0..self.layers.len() {
            if self.layers[i].has_matte(comp) {
                matte_idx = Some(i);
                continue;
            }
            if self.layers[i].visible(comp) {
                if let Some(m) = matte_idx {
                    if self.layers[m].visible(comp) {
                        self.layers[i].preprocess(comp, clip);
                        self.layers[m].preprocess(comp, clip);
                    }
                } else {
                    self.layers[i].preprocess(comp, clip);
                }
            }
            matte_idx = None;
        }
    }
}

/// Effective child frame: plain start-frame shift, or composition time
/// lookup through the remap curve; stretched either way.
fn time_remap(layer: &Layer, comp: &Composition, frame_no: f32) -> f32 {
    let frame = if layer.has_time_remap() {
        let remap = layer.time_remap.as_ref().unwrap();
        comp.frame_at_time(f64::from(remap.eval(frame_no)))
    } else {
        frame_no - layer.start_frame
    };
    let stretch = if layer.time_stretch <= 0.0 {
        1.0
    } else {
        layer.time_stretch
    };
    frame / stretch
}

struct SolidContent {
    drawable: Drawable,
}

impl SolidContent {
    fn new() -> Self {
        Self {
            drawable: Drawable::fill(FillRule::Winding),
        }
    }

    fn update(
        &mut self,
        layer: &Layer,
        combined_matrix: &Affine2,
        combined_alpha: f32,
        flag: DirtyFlags,
    ) {
        if flag.contains(DirtyFlags::MATRIX) {
            let mut path = Path::new();
            path.add_rect(
                Rect::new(0.0, 0.0, layer.layer_size.x, layer.layer_size.y),
                PathDirection::Cw,
            );
            path.transform(combined_matrix);
            self.drawable.set_path(path);
        }
        if flag.contains(DirtyFlags::ALPHA) {
            self.drawable
                .set_brush(Brush::Solid(layer.solid_color.premultiplied(combined_alpha)));
        }
    }
}

struct ImageContent {
    drawable: Drawable,
    bitmap: std::sync::Arc<Bitmap>,
    width: f32,
    height: f32,
}

impl ImageContent {
    fn new(comp: &Composition, layer: &Layer) -> Option<Self> {
        let ref_id = layer.ref_id.as_ref()?;
        match comp.assets.get(ref_id) {
            Some(Asset::Image {
                width,
                height,
                bitmap: Some(bitmap),
            }) => Some(Self {
                drawable: Drawable::fill(FillRule::Winding),
                bitmap: bitmap.clone(),
                width: *width as f32,
                height: *height as f32,
            }),
            _ => {
                log::warn!("image asset missing: {ref_id}");
                None
            }
        }
    }

    fn update(&mut self, combined_matrix: &Affine2, combined_alpha: f32, flag: DirtyFlags) {
        if flag.contains(DirtyFlags::MATRIX) {
            let mut path = Path::new();
            path.add_rect(
                Rect::new(0.0, 0.0, self.width, self.height),
                PathDirection::Cw,
            );
            path.transform(combined_matrix);
            self.drawable.set_path(path);
        }
        if flag.intersects(DirtyFlags::MATRIX | DirtyFlags::ALPHA) {
            self.drawable.set_brush(Brush::Texture {
                bitmap: self.bitmap.clone(),
                matrix: *combined_matrix,
                alpha: (combined_alpha * 255.0) as u8,
            });
        }
    }
}

struct ShapeContent {
    tree: ContentTree,
}

/// Precomp viewport clip.
struct Clipper {
    size: Vec2,
    path: Path,
    rasterizer: Rasterizer,
    raster_request: bool,
    rle: Rle,
}

impl Clipper {
    fn new(size: Vec2) -> Self {
        Self {
            size,
            path: Path::new(),
            rasterizer: Rasterizer::new(),
            raster_request: false,
            rle: Rle::new(),
        }
    }

    fn update(&mut self, matrix: &Affine2) {
        self.path.reset();
        self.path.add_rect(
            Rect::new(0.0, 0.0, self.size.x, self.size.y),
            PathDirection::Cw,
        );
        self.path.transform(matrix);
        self.raster_request = true;
    }

    fn preprocess(&mut self, clip: &IntRect) {
        if self.raster_request {
            self.rasterizer
                .rasterize_fill(&self.path, FillRule::Winding, clip);
            self.rle = self.rasterizer.take_rle();
            self.raster_request = false;
        }
    }

    fn rle_with(&self, mask: &Rle) -> Rle {
        if mask.is_empty() {
            self.rle.clone()
        } else {
            mask.intersected(&self.rle)
        }
    }
}
