//! Layer model nodes.

use glam::Vec2;

use crate::geometry::color::Color;
use crate::model::property::{ShapeData, Value};
use crate::model::shape::ShapeId;
use crate::model::transform::TransformData;
use crate::utils::Tag;

/// Index into [`crate::model::Composition::layers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerKind {
    Precomp,
    Solid,
    Image,
    #[default]
    Null,
    Shape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatteType {
    #[default]
    None,
    Alpha,
    AlphaInv,
    Luma,
    LumaInv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    None,
    #[default]
    Add,
    Subtract,
    Intersect,
    Difference,
}

#[derive(Debug, Clone)]
pub struct MaskData {
    pub shape: Value<ShapeData>,
    /// 0..100.
    pub opacity: Value<f32>,
    pub inverted: bool,
    pub mode: MaskMode,
    pub statik: bool,
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub name: Tag,
    pub kind: LayerKind,
    /// AE layer index; referenced by `parent_id` of other layers.
    pub id: i32,
    /// -1 when unparented.
    pub parent_id: i32,
    pub in_frame: f32,
    pub out_frame: f32,
    pub start_frame: f32,
    pub time_stretch: f32,
    pub matte_type: MatteType,
    pub transform: TransformData,
    pub auto_orient: bool,
    pub hidden: bool,
    /// Shape contents (shape layers), front-to-back as exported.
    pub shapes: Vec<ShapeId>,
    /// Child layers (root and resolved precomps), front-to-back.
    pub children: Vec<LayerId>,
    pub masks: Vec<MaskData>,
    /// Precomp viewport or solid size.
    pub layer_size: Vec2,
    pub solid_color: Color,
    /// Asset reference: precomp layer list or image.
    pub ref_id: Option<String>,
    pub time_remap: Option<Value<f32>>,
    pub statik: bool,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            name: Tag::default(),
            kind: LayerKind::Null,
            id: -1,
            parent_id: -1,
            in_frame: 0.0,
            out_frame: 0.0,
            start_frame: 0.0,
            time_stretch: 1.0,
            matte_type: MatteType::None,
            transform: TransformData::default(),
            auto_orient: false,
            hidden: false,
            shapes: Vec::new(),
            children: Vec::new(),
            masks: Vec::new(),
            layer_size: Vec2::ZERO,
            solid_color: Color::default(),
            ref_id: None,
            time_remap: None,
            statik: true,
        }
    }
}

impl Layer {
    #[inline]
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent_id >= 0
    }

    #[inline]
    #[must_use]
    pub fn has_matte(&self) -> bool {
        self.matte_type != MatteType::None
    }

    #[inline]
    #[must_use]
    pub fn has_time_remap(&self) -> bool {
        self.time_remap
            .as_ref()
            .is_some_and(|remap| !remap.is_static())
    }
}
