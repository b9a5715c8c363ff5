//! Span painter.
//!
//! Walks RLE spans and blends them into a surface through the selected
//! (brush, blend-mode) pair. Gradient and texture sources are fetched
//! per span into a fixed scratch buffer before composition.

use glam::{Affine2, Vec2};
use std::sync::Arc;

use crate::geometry::rect::IntRect;
use crate::paint::blend::{BlendMode, comp_fetched, comp_solid};
use crate::paint::brush::{Brush, LinearValues, RadialValues};
use crate::paint::gradient::{COLOR_TABLE_SIZE, GradientKind, table_pixel, table_pixel_fixed};
use crate::paint::surface::{Bitmap, Surface};
use crate::raster::rle::Rle;

/// Scratch run length, matching the compositor's fixed blend buffer.
const BUFFER_SIZE: usize = 1024;

/// 8.8 fixed point for the linear gradient accumulator.
const FIXPT_BITS: i32 = 8;
const FIXPT_SIZE: f32 = (1 << FIXPT_BITS) as f32;

enum SpanSource {
    None,
    Solid(u32),
    Linear {
        table: Arc<Vec<u32>>,
        values: LinearValues,
        inv: Affine2,
    },
    Radial {
        table: Arc<Vec<u32>>,
        values: RadialValues,
        focal: Vec2,
        focal_radius: f32,
        inv: Affine2,
    },
    Texture {
        bitmap: Arc<Bitmap>,
        inv: Affine2,
        alpha: u8,
    },
}

pub struct Painter<'a> {
    surface: Surface<'a>,
    region: IntRect,
    source: SpanSource,
    blend: BlendMode,
    dest_buf: Vec<u32>,
    src_buf: Vec<u32>,
}

impl<'a> Painter<'a> {
    /// Begins painting into a cleared surface.
    #[must_use]
    pub fn begin(mut surface: Surface<'a>) -> Self {
        surface.clear();
        let region = surface.rect();
        Self {
            surface,
            region,
            source: SpanSource::None,
            blend: BlendMode::SrcOver,
            dest_buf: vec![0; BUFFER_SIZE],
            src_buf: vec![0; BUFFER_SIZE],
        }
    }

    /// Begins painting without clearing (matte second passes).
    #[must_use]
    pub fn begin_no_clear(surface: Surface<'a>) -> Self {
        let region = surface.rect();
        Self {
            surface,
            region,
            source: SpanSource::None,
            blend: BlendMode::SrcOver,
            dest_buf: vec![0; BUFFER_SIZE],
            src_buf: vec![0; BUFFER_SIZE],
        }
    }

    pub fn set_draw_region(&mut self, region: IntRect) {
        self.region = region.intersected(&self.surface.rect());
    }

    #[must_use]
    pub fn clip_bounding_rect(&self) -> IntRect {
        self.region
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    pub fn set_brush(&mut self, brush: &Brush) {
        self.source = match brush {
            Brush::None => SpanSource::None,
            Brush::Solid(c) => SpanSource::Solid(*c),
            Brush::Gradient {
                gradient,
                table,
                matrix,
            } => {
                let inv = matrix.inverse();
                match gradient.kind {
                    GradientKind::Linear { start, end } => SpanSource::Linear {
                        table: table.clone(),
                        values: LinearValues::new(start, end),
                        inv,
                    },
                    GradientKind::Radial {
                        center,
                        center_radius,
                        focal,
                        focal_radius,
                    } => SpanSource::Radial {
                        table: table.clone(),
                        values: RadialValues::new(center, center_radius, focal, focal_radius),
                        focal,
                        focal_radius,
                        inv,
                    },
                }
            }
            Brush::Texture {
                bitmap,
                matrix,
                alpha,
            } => SpanSource::Texture {
                bitmap: bitmap.clone(),
                inv: matrix.inverse(),
                alpha: *alpha,
            },
        };
    }

    /// Blends the RLE, optionally intersected with a clip mask, through
    /// the current brush and blend mode.
    pub fn draw_rle(&mut self, rle: &Rle, clip: Option<&Rle>) {
        if rle.is_empty() {
            return;
        }
        if matches!(self.source, SpanSource::None) {
            return;
        }
        let effective = match clip {
            Some(c) if !c.is_empty() => rle.intersected(c).intersected_rect(&self.region),
            Some(_) => return,
            None => rle.intersected_rect(&self.region),
        };
        for span in effective.spans() {
            let mut x = i32::from(span.x);
            let y = i32::from(span.y);
            let mut remaining = usize::from(span.len);
            while remaining > 0 {
                let run = remaining.min(BUFFER_SIZE);
                self.blend_run(x, y, run, u32::from(span.coverage));
                x += run as i32;
                remaining -= run;
            }
        }
    }

    /// Blends a bitmap (sized at least `region`) at the origin with a
    /// constant alpha.
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, const_alpha: u8) {
        if !bitmap.is_valid() {
            return;
        }
        let w = self.region.width.min(bitmap.width() as i32);
        if w <= 0 {
            return;
        }
        let y1 = self.region.y;
        let y2 = self.region.bottom().min(bitmap.height() as i32);
        for y in y1..y2 {
            let mut x = self.region.x;
            let x_end = self.region.x + w;
            while x < x_end {
                let run = ((x_end - x) as usize).min(BUFFER_SIZE);
                for (i, px) in self.src_buf[..run].iter_mut().enumerate() {
                    *px = bitmap.pixel(x + i as i32, y);
                }
                self.surface.read_span(x, y, &mut self.dest_buf[..run]);
                comp_fetched(
                    &mut self.dest_buf[..run],
                    &self.src_buf[..run],
                    u32::from(const_alpha),
                    self.blend,
                );
                self.surface.write_span(x, y, &self.dest_buf[..run]);
                x += run as i32;
            }
        }
    }

    fn blend_run(&mut self, x: i32, y: i32, len: usize, coverage: u32) {
        self.surface.read_span(x, y, &mut self.dest_buf[..len]);
        match &self.source {
            SpanSource::None => return,
            SpanSource::Solid(color) => {
                comp_solid(&mut self.dest_buf[..len], *color, coverage, self.blend);
            }
            SpanSource::Linear { table, values, inv } => {
                fetch_linear(&mut self.src_buf[..len], table, values, inv, x, y);
                comp_fetched(
                    &mut self.dest_buf[..len],
                    &self.src_buf[..len],
                    coverage,
                    self.blend,
                );
            }
            SpanSource::Radial {
                table,
                values,
                focal,
                focal_radius,
                inv,
            } => {
                fetch_radial(
                    &mut self.src_buf[..len],
                    table,
                    values,
                    *focal,
                    *focal_radius,
                    inv,
                    x,
                    y,
                );
                comp_fetched(
                    &mut self.dest_buf[..len],
                    &self.src_buf[..len],
                    coverage,
                    self.blend,
                );
            }
            SpanSource::Texture { bitmap, inv, alpha } => {
                fetch_texture(&mut self.src_buf[..len], bitmap, inv, *alpha, x, y);
                comp_fetched(
                    &mut self.dest_buf[..len],
                    &self.src_buf[..len],
                    coverage,
                    self.blend,
                );
            }
        }
        self.surface.write_span(x, y, &self.dest_buf[..len]);
    }
}

fn fetch_linear(
    buf: &mut [u32],
    table: &[u32],
    lv: &LinearValues,
    inv: &Affine2,
    x: i32,
    y: i32,
) {
    let (t, inc);
    if lv.l == 0.0 {
        t = 0.0;
        inc = 0.0;
    } else {
        let local = inv.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
        t = lv.dx * local.x + lv.dy * local.y + lv.off;
        let step = inv.matrix2.x_axis;
        inc = lv.dx * step.x + lv.dy * step.y;
    }
    let scale = (COLOR_TABLE_SIZE - 1) as f32;
    let mut t_scaled = t * scale;
    let inc_scaled = inc * scale;

    if inc_scaled.abs() < 1e-5 {
        let px = table_pixel_fixed(table, (t_scaled * FIXPT_SIZE) as i32);
        buf.fill(px);
        return;
    }

    let end = t_scaled + inc_scaled * buf.len() as f32;
    let limit = (i32::MAX >> (FIXPT_BITS + 1)) as f32;
    if end < limit && end > -limit {
        // Fixed-point accumulator.
        let mut t_fixed = (t_scaled * FIXPT_SIZE) as i32;
        let inc_fixed = (inc_scaled * FIXPT_SIZE) as i32;
        for px in buf {
            *px = table_pixel_fixed(table, t_fixed);
            t_fixed = t_fixed.wrapping_add(inc_fixed);
        }
    } else {
        // Float fallback for extreme magnification.
        for px in buf {
            *px = table_pixel(table, t_scaled / COLOR_TABLE_SIZE as f32);
            t_scaled += inc_scaled;
        }
    }
}

fn fetch_radial(
    buf: &mut [u32],
    table: &[u32],
    rv: &RadialValues,
    focal: Vec2,
    focal_radius: f32,
    inv: &Affine2,
    x: i32,
    y: i32,
) {
    // A degenerate quadratic renders transparent.
    if rv.a.abs() < 1e-12 {
        buf.fill(0);
        return;
    }
    let mut local = inv.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
    let step = inv.matrix2.x_axis;
    for px in buf {
        let g = local - focal;
        let b = 2.0 * (rv.dr * focal_radius + g.x * rv.dx + g.y * rv.dy);
        let det = b * b - 4.0 * rv.a * (rv.sqrfr - (g.x * g.x + g.y * g.y));
        let mut result = 0;
        if det >= 0.0 {
            let det_sqrt = det.sqrt();
            let s0 = (-b - det_sqrt) * rv.inv2a;
            let s1 = (-b + det_sqrt) * rv.inv2a;
            let s = s0.max(s1);
            if focal_radius + rv.dr * s >= 0.0 {
                result = table_pixel(table, s);
            }
        }
        *px = result;
        local += step;
    }
}

fn fetch_texture(buf: &mut [u32], bitmap: &Bitmap, inv: &Affine2, alpha: u8, x: i32, y: i32) {
    use crate::geometry::color::byte_mul;
    let mut local = inv.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
    let step = inv.matrix2.x_axis;
    let w = bitmap.width() as i32;
    let h = bitmap.height() as i32;
    for px in buf {
        let ix = (local.x.floor() as i32).clamp(0, w - 1);
        let iy = (local.y.floor() as i32).clamp(0, h - 1);
        let sample = if local.x < -0.5
            || local.y < -0.5
            || local.x >= w as f32 + 0.5
            || local.y >= h as f32 + 0.5
        {
            0
        } else {
            bitmap.pixel(ix, iy)
        };
        *px = if alpha == 255 {
            sample
        } else {
            byte_mul(sample, u32::from(alpha))
        };
        local += step;
    }
}
