//! Brushes: the evaluated paint a drawable carries to the compositor.

use std::sync::Arc;

use glam::{Affine2, Vec2};

use crate::paint::gradient::Gradient;
use crate::paint::surface::Bitmap;

#[derive(Debug, Clone, Default)]
pub enum Brush {
    #[default]
    None,
    /// Premultiplied BGRA.
    Solid(u32),
    /// Gradient in local space plus the local→device matrix.
    Gradient {
        gradient: Arc<Gradient>,
        table: Arc<Vec<u32>>,
        matrix: Affine2,
    },
    /// Image in local space plus the local→device matrix.
    Texture {
        bitmap: Arc<Bitmap>,
        matrix: Affine2,
        alpha: u8,
    },
}

impl Brush {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Brush::None)
    }

    /// A brush that cannot contribute pixels.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        match self {
            Brush::None => true,
            Brush::Solid(c) => *c >> 24 == 0,
            Brush::Texture { alpha, .. } => *alpha == 0,
            Brush::Gradient { .. } => false,
        }
    }
}

/// Linear gradient span parameters derived from the end points, original
/// `getLinearGradientValues`.
#[derive(Debug, Clone, Copy)]
pub struct LinearValues {
    pub dx: f32,
    pub dy: f32,
    pub l: f32,
    pub off: f32,
}

impl LinearValues {
    #[must_use]
    pub fn new(start: Vec2, end: Vec2) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let l = dx * dx + dy * dy;
        if l != 0.0 {
            Self {
                dx: dx / l,
                dy: dy / l,
                l,
                off: -(dx / l) * start.x - (dy / l) * start.y,
            }
        } else {
            Self {
                dx,
                dy,
                l,
                off: 0.0,
            }
        }
    }
}

/// Radial gradient span parameters, original `getRadialGradientValues`.
#[derive(Debug, Clone, Copy)]
pub struct RadialValues {
    pub dx: f32,
    pub dy: f32,
    pub dr: f32,
    pub sqrfr: f32,
    pub a: f32,
    pub inv2a: f32,
    pub extended: bool,
}

impl RadialValues {
    #[must_use]
    pub fn new(center: Vec2, center_radius: f32, focal: Vec2, focal_radius: f32) -> Self {
        let dx = center.x - focal.x;
        let dy = center.y - focal.y;
        let dr = center_radius - focal_radius;
        let sqrfr = focal_radius * focal_radius;
        let a = dr * dr - dx * dx - dy * dy;
        Self {
            dx,
            dy,
            dr,
            sqrfr,
            a,
            inv2a: if a == 0.0 { 0.0 } else { 1.0 / (2.0 * a) },
            extended: focal_radius != 0.0 || a <= 0.0,
        }
    }
}
