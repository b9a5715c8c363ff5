//! The immutable animation document.

use std::sync::Arc;

use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::model::layer::{Layer, LayerId};
use crate::model::shape::{ShapeId, ShapeNode};
use crate::paint::Bitmap;

/// A named frame range.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub start_frame: f32,
    pub end_frame: f32,
}

/// An entry of the composition's asset table.
#[derive(Debug, Clone)]
pub enum Asset {
    Image {
        width: u32,
        height: u32,
        bitmap: Option<Arc<Bitmap>>,
    },
    Precomp {
        layers: Vec<LayerId>,
        statik: bool,
    },
}

/// Parsed Lottie document: arena-stored layer and shape trees plus flat
/// asset/marker tables. Immutable after parse; render trees index into
/// it.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    pub version: String,
    pub size: Vec2,
    pub start_frame: f32,
    pub end_frame: f32,
    pub frame_rate: f32,
    /// Synthetic precomp layer holding the document layers.
    pub root: Option<LayerId>,
    pub layers: Vec<Layer>,
    pub shapes: Vec<ShapeNode>,
    pub assets: FxHashMap<String, Asset>,
    pub markers: Vec<Marker>,
    pub statik: bool,
}

impl Composition {
    #[inline]
    #[must_use]
    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.0 as usize]
    }

    #[inline]
    #[must_use]
    pub fn shape(&self, id: ShapeId) -> &ShapeNode {
        &self.shapes[id.0 as usize]
    }

    #[inline]
    #[must_use]
    pub fn total_frame(&self) -> f32 {
        self.end_frame - self.start_frame
    }

    /// Seconds.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f64 {
        if self.frame_rate <= 0.0 {
            return 0.0;
        }
        f64::from(self.total_frame()) / f64::from(self.frame_rate)
    }

    /// Frame index for a normalized position: `round(p·(total−1))`, `p`
    /// clamped to [0,1].
    #[must_use]
    pub fn frame_at_pos(&self, pos: f64) -> usize {
        let pos = pos.clamp(0.0, 1.0);
        let total = self.total_frame().max(1.0);
        (pos * f64::from(total - 1.0)).round() as usize
    }

    /// Frame index for a time in seconds.
    #[must_use]
    pub fn frame_at_time(&self, time_sec: f64) -> f32 {
        let duration = self.duration();
        if duration <= 0.0 {
            return 0.0;
        }
        self.frame_at_pos(time_sec / duration) as f32
    }
}
