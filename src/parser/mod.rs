//! Lottie document parsing.
//!
//! [`lexer`] supplies the lookahead token stream; this module maps the
//! Bodymovin schema subset onto the scene model. Unknown keys are
//! skipped silently; unsupported node kinds (text layers, merge paths)
//! are logged and dropped while the rest of the document loads.

pub mod lexer;

use std::sync::Arc;

use glam::Vec2;
use log::warn;
use rustc_hash::FxHashMap;

use crate::geometry::color::Color;
use crate::geometry::path::PathDirection;
use crate::model::layer::{Layer, LayerId, LayerKind, MaskData, MaskMode, MatteType};
use crate::model::property::{GradientRaw, Position, PositionKeyFrame, ShapeData, Value};
use crate::model::shape::{
    DashData, EllipseData, FillData, GradientData, GradientFillData, GradientStrokeData,
    GroupData, PathData, PolystarData, PolystarKind, RectData, RepeaterData, ShapeId, ShapeNode,
    StrokeData, TrimData, TrimKind,
};
use crate::model::transform::{RepeaterTransform, TransformData, TransformExtra};
use crate::model::{Asset, Composition, Interpolator, KeyFrame, Marker};
use crate::paint::Bitmap;
use crate::raster::{CapStyle, FillRule, JoinStyle};
use crate::utils::Tag;
use lexer::{Lexer, TokenType};

/// Parses a Lottie document. Returns `None` for malformed JSON and for
/// documents without a bodymovin header (`v`) or layer list.
#[must_use]
pub fn parse(data: Vec<u8>, dir_path: &str) -> Option<Composition> {
    let mut parser = DocParser {
        lexer: Lexer::new(data),
        dir_path: dir_path.to_owned(),
        comp: Composition::default(),
        interpolators: FxHashMap::default(),
        layers_to_resolve: Vec::new(),
    };
    parser.parse_composition()
}

struct DocParser {
    lexer: Lexer,
    dir_path: String,
    comp: Composition,
    interpolators: FxHashMap<String, Arc<Interpolator>>,
    /// Layers with a `refId` waiting for asset resolution.
    layers_to_resolve: Vec<LayerId>,
}

/// Outcome of one `{"ty": ...}` shape wrapper.
enum ParsedShape {
    Node(ShapeNode),
    /// A `tr` node: the owning group's transform.
    Transform(Box<TransformData>),
    /// Hidden or unsupported content.
    Skip,
}

impl DocParser {
    // ==================================================================
    // Document
    // ==================================================================

    fn parse_composition(mut self) -> Option<Composition> {
        if self.lexer.peek_type() != TokenType::Object {
            return None;
        }
        self.lexer.enter_object();
        let mut has_layers = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "v" => self.comp.version = self.lexer.get_string(),
                "w" => self.comp.size.x = self.lexer.get_int() as f32,
                "h" => self.comp.size.y = self.lexer.get_int() as f32,
                "ip" => self.comp.start_frame = self.lexer.get_double() as f32,
                "op" => self.comp.end_frame = self.lexer.get_double() as f32,
                "fr" => self.comp.frame_rate = self.lexer.get_double() as f32,
                "assets" => self.parse_assets(),
                "layers" => {
                    has_layers = true;
                    self.parse_layers();
                }
                "markers" => self.parse_markers(),
                _ => self.lexer.skip(),
            }
        }

        if self.comp.version.is_empty() || !has_layers || self.comp.root.is_none() {
            // Not a valid bodymovin header.
            return None;
        }
        if self.lexer.in_error() {
            return None;
        }

        self.resolve_layer_refs();
        self.process_repeaters();

        let root = self.comp.root.unwrap();
        self.comp.layers[root.0 as usize].in_frame = self.comp.start_frame;
        self.comp.layers[root.0 as usize].out_frame = self.comp.end_frame;
        self.comp.statik = self.comp.layer(root).statik;
        Some(self.comp)
    }

    fn parse_markers(&mut self) {
        self.lexer.enter_array();
        while self.lexer.next_array_value() {
            self.parse_marker();
        }
    }

    fn parse_marker(&mut self) {
        self.lexer.enter_object();
        let mut name = String::new();
        let mut start = 0.0;
        let mut duration = 0.0;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "cm" => name = self.lexer.get_string(),
                "tm" => start = self.lexer.get_double() as f32,
                "dr" => duration = self.lexer.get_double() as f32,
                _ => self.lexer.skip(),
            }
        }
        self.comp.markers.push(Marker {
            name,
            start_frame: start,
            end_frame: start + duration,
        });
    }

    // ==================================================================
    // Assets
    // ==================================================================

    fn parse_assets(&mut self) {
        self.lexer.enter_array();
        while self.lexer.next_array_value() {
            if let Some((id, asset)) = self.parse_asset() {
                self.comp.assets.insert(id, asset);
            }
        }
    }

    fn parse_asset(&mut self) -> Option<(String, Asset)> {
        self.lexer.enter_object();
        let mut id = String::new();
        let mut width = 0u32;
        let mut height = 0u32;
        let mut filename = String::new();
        let mut relative_path = String::new();
        let mut embedded = false;
        let mut is_image = false;
        let mut precomp_layers: Option<Vec<LayerId>> = None;
        let mut precomp_static = true;

        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "w" => width = self.lexer.get_int().max(0) as u32,
                "h" => height = self.lexer.get_int().max(0) as u32,
                "p" => {
                    is_image = true;
                    filename = self.lexer.get_string();
                }
                "u" => relative_path = self.lexer.get_string(),
                "e" => embedded = self.lexer.get_int() != 0,
                "id" => {
                    id = if self.lexer.peek_type() == TokenType::String {
                        self.lexer.get_string()
                    } else {
                        self.lexer.get_int().to_string()
                    };
                }
                "layers" => {
                    self.lexer.enter_array();
                    let mut layers = Vec::new();
                    while self.lexer.next_array_value() {
                        if let Some(layer_id) = self.parse_layer() {
                            precomp_static &= self.comp.layer(layer_id).statik;
                            layers.push(layer_id);
                        }
                    }
                    precomp_layers = Some(layers);
                }
                _ => self.lexer.skip(),
            }
        }

        if let Some(layers) = precomp_layers {
            return Some((
                id,
                Asset::Precomp {
                    layers,
                    statik: precomp_static,
                },
            ));
        }
        if is_image {
            let bitmap = if embedded {
                filename
                    .starts_with("data:")
                    .then(|| decode_data_uri(&filename))
                    .flatten()
            } else {
                let path = format!("{}{}{}", self.dir_path, relative_path, filename);
                load_image_file(&path)
            };
            return Some((
                id,
                Asset::Image {
                    width,
                    height,
                    bitmap: bitmap.map(Arc::new),
                },
            ));
        }
        None
    }

    // ==================================================================
    // Layers
    // ==================================================================

    fn parse_layers(&mut self) {
        let mut root = Layer {
            kind: LayerKind::Precomp,
            name: Tag::new("__"),
            ..Layer::default()
        };
        let mut statik = true;
        self.lexer.enter_array();
        let mut children = Vec::new();
        while self.lexer.next_array_value() {
            if let Some(layer_id) = self.parse_layer() {
                statik &= self.comp.layer(layer_id).statik;
                children.push(layer_id);
            }
        }
        root.children = children;
        root.statik = statik;
        let id = LayerId(self.comp.layers.len() as u32);
        self.comp.layers.push(root);
        self.comp.root = Some(id);
    }

    #[allow(clippy::too_many_lines)]
    fn parse_layer(&mut self) -> Option<LayerId> {
        self.lexer.enter_object();
        let mut layer = Layer::default();
        let mut ddd = false;
        let mut transform: Option<TransformData> = None;
        let mut has_ref = false;

        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "ty" => {
                    layer.kind = match self.lexer.get_int() {
                        0 => LayerKind::Precomp,
                        1 => LayerKind::Solid,
                        2 => LayerKind::Image,
                        4 => LayerKind::Shape,
                        5 => {
                            warn!("text layers are not supported, skipping layer");
                            LayerKind::Null
                        }
                        _ => LayerKind::Null,
                    };
                }
                "nm" => layer.name = Tag::new(&self.lexer.get_string()),
                "ind" => layer.id = self.lexer.get_int(),
                "ddd" => ddd = self.lexer.get_int() != 0,
                "parent" => layer.parent_id = self.lexer.get_int(),
                "refId" => {
                    layer.ref_id = Some(self.lexer.get_string());
                    has_ref = true;
                }
                "sr" => layer.time_stretch = self.lexer.get_double() as f32,
                "tm" => layer.time_remap = Some(self.parse_property::<f32>()),
                "ip" => layer.in_frame = (self.lexer.get_double() as f32).round(),
                "op" => layer.out_frame = (self.lexer.get_double() as f32).round(),
                "st" => layer.start_frame = self.lexer.get_double() as f32,
                "bm" => {
                    // Blend modes beyond normal are not composited.
                    let _ = self.lexer.get_int();
                }
                "ks" => {
                    self.lexer.enter_object();
                    transform = Some(self.parse_transform_body(ddd));
                }
                "shapes" => self.parse_shapes_attr(&mut layer),
                "w" | "sw" => layer.layer_size.x = self.lexer.get_int() as f32,
                "h" | "sh" => layer.layer_size.y = self.lexer.get_int() as f32,
                "sc" => layer.solid_color = Color::from_hex(&self.lexer.get_string()),
                "tt" => {
                    layer.matte_type = match self.lexer.get_int() {
                        1 => MatteType::Alpha,
                        2 => MatteType::AlphaInv,
                        3 => MatteType::Luma,
                        4 => MatteType::LumaInv,
                        _ => MatteType::None,
                    };
                }
                "hasMask" => {
                    let _ = self.lexer.get_bool();
                }
                "masksProperties" => self.parse_mask_property(&mut layer),
                "ao" => layer.auto_orient = self.lexer.get_int() != 0,
                "hd" => layer.hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }

        // A layer without transform data is not valid.
        layer.transform = transform?;

        // Guard against corrupted self-parenting.
        if layer.has_parent() && layer.id == layer.parent_id {
            return None;
        }

        if layer.hidden {
            // A hidden layer only matters as a parent transform; strip it
            // down to a null layer.
            layer.statik = layer.transform.is_static();
            layer.kind = LayerKind::Null;
            layer.shapes.clear();
            layer.children.clear();
            let id = LayerId(self.comp.layers.len() as u32);
            self.comp.layers.push(layer);
            return Some(id);
        }

        let mut statik = layer.transform.is_static();
        for shape in &layer.shapes {
            statik &= self.comp.shape(*shape).is_static();
        }
        for mask in &layer.masks {
            statik &= mask.statik;
        }
        layer.statik = statik;

        let id = LayerId(self.comp.layers.len() as u32);
        self.comp.layers.push(layer);
        if has_ref {
            self.layers_to_resolve.push(id);
        }
        Some(id)
    }

    fn parse_mask_property(&mut self, layer: &mut Layer) {
        self.lexer.enter_array();
        while self.lexer.next_array_value() {
            let mask = self.parse_mask_object();
            layer.masks.push(mask);
        }
    }

    fn parse_mask_object(&mut self) -> MaskData {
        self.lexer.enter_object();
        let mut mask = MaskData {
            shape: Value::default(),
            opacity: Value::Static(100.0),
            inverted: false,
            mode: MaskMode::Add,
            statik: true,
        };
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "inv" => mask.inverted = self.lexer.get_bool(),
                "mode" => {
                    let s = self.lexer.get_string();
                    mask.mode = match s.as_bytes().first() {
                        Some(b'a') => MaskMode::Add,
                        Some(b's') => MaskMode::Subtract,
                        Some(b'i') => MaskMode::Intersect,
                        Some(b'f') => MaskMode::Difference,
                        _ => MaskMode::None,
                    };
                }
                "pt" => mask.shape = self.parse_shape_property(),
                "o" => mask.opacity = self.parse_property::<f32>(),
                _ => self.lexer.skip(),
            }
        }
        mask.statik = mask.shape.is_static() && mask.opacity.is_static();
        mask
    }

    // ==================================================================
    // Shapes
    // ==================================================================

    fn parse_shapes_attr(&mut self, layer: &mut Layer) {
        self.lexer.enter_array();
        let mut children = Vec::new();
        let mut stray_transform = None;
        while self.lexer.next_array_value() {
            self.parse_shape_object_into(&mut children, &mut stray_transform);
        }
        layer.shapes = children;
    }

    /// Reads one `{"ty": ...}` wrapper and appends the parsed node. A
    /// `tr` node lands in `transform_slot` instead of the child list.
    fn parse_shape_object_into(
        &mut self,
        parent: &mut Vec<ShapeId>,
        transform_slot: &mut Option<TransformData>,
    ) {
        self.lexer.enter_object();
        while let Some(key) = self.lexer.next_object_key() {
            if key.as_str() == "ty" {
                match self.parse_shape_by_type() {
                    ParsedShape::Node(node) => {
                        let id = ShapeId(self.comp.shapes.len() as u32);
                        self.comp.shapes.push(node);
                        parent.push(id);
                    }
                    ParsedShape::Transform(t) => *transform_slot = Some(*t),
                    ParsedShape::Skip => {}
                }
            } else {
                self.lexer.skip();
            }
        }
    }

    fn parse_shape_by_type(&mut self) -> ParsedShape {
        let ty = self.lexer.get_string();
        let node = match ty.as_str() {
            "gr" => self.parse_group(),
            "rc" => self.parse_rect(),
            "el" => self.parse_ellipse(),
            "sh" => self.parse_path_shape(),
            "sr" => self.parse_polystar(),
            "fl" => self.parse_fill(),
            "st" => self.parse_stroke(),
            "gf" => self.parse_gradient_fill(),
            "gs" => self.parse_gradient_stroke(),
            "tm" => self.parse_trim(),
            "rp" => self.parse_repeater(),
            "tr" => {
                // Transform keys are siblings of "ty" in the same object.
                return ParsedShape::Transform(Box::new(self.parse_transform_body(false)));
            }
            "mm" => {
                warn!("merge path is not supported yet");
                return ParsedShape::Skip;
            }
            _ => return ParsedShape::Skip,
        };
        match node {
            Some(node) => ParsedShape::Node(node),
            None => ParsedShape::Skip,
        }
    }

    fn parse_group(&mut self) -> Option<ShapeNode> {
        let mut group = GroupData::default();
        let mut children = Vec::new();
        let mut transform = None;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => group.name = Tag::new(&self.lexer.get_string()),
                "it" => {
                    self.lexer.enter_array();
                    while self.lexer.next_array_value() {
                        self.parse_shape_object_into(&mut children, &mut transform);
                    }
                }
                _ => self.lexer.skip(),
            }
        }
        group.transform = transform;
        let mut statik = group
            .transform
            .as_ref()
            .is_none_or(TransformData::is_static);
        for child in &children {
            statik &= self.comp.shape(*child).is_static();
        }
        group.children = children;
        group.statik = statik;
        Some(ShapeNode::Group(group))
    }

    /// Parses transform fields from inside an already-entered object.
    fn parse_transform_body(&mut self, ddd: bool) -> TransformData {
        let mut t = TransformData::default();
        let mut extra = if ddd {
            Some(Box::new(TransformExtra {
                three_d: true,
                ..TransformExtra::default()
            }))
        } else {
            None
        };

        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "a" => t.anchor = self.parse_property::<Vec2>(),
                "p" => {
                    // Either a plain property or separate-dimension
                    // x/y scalars.
                    self.lexer.enter_object();
                    let mut separate_x: Option<Value<f32>> = None;
                    let mut separate_y: Option<Value<f32>> = None;
                    let mut separate = false;
                    while let Some(rkey) = self.lexer.next_object_key() {
                        match rkey.as_str() {
                            "k" => t.position = self.parse_position_helper(),
                            "s" => separate = self.lexer.get_bool(),
                            "x" if separate => {
                                separate_x = Some(self.parse_property::<f32>());
                            }
                            "y" if separate => {
                                separate_y = Some(self.parse_property::<f32>());
                            }
                            _ => self.lexer.skip(),
                        }
                    }
                    if let (Some(x), Some(y)) = (separate_x, separate_y) {
                        extra
                            .get_or_insert_with(|| Box::new(TransformExtra::default()))
                            .separate = Some((x, y));
                    }
                }
                "r" => t.rotation = self.parse_property::<f32>(),
                "s" => t.scale = self.parse_property::<Vec2>(),
                "o" => t.opacity = self.parse_property::<f32>(),
                "rx" => {
                    extra
                        .get_or_insert_with(|| Box::new(TransformExtra::default()))
                        .rx = self.parse_property::<f32>();
                }
                "ry" => {
                    extra
                        .get_or_insert_with(|| Box::new(TransformExtra::default()))
                        .ry = self.parse_property::<f32>();
                }
                "rz" => {
                    extra
                        .get_or_insert_with(|| Box::new(TransformExtra::default()))
                        .rz = self.parse_property::<f32>();
                }
                _ => self.lexer.skip(),
            }
        }

        let mut statik = t.anchor.is_static()
            && t.position.is_static()
            && t.rotation.is_static()
            && t.scale.is_static()
            && t.opacity.is_static();
        if let Some(e) = &extra {
            statik = statik
                && e.rx.is_static()
                && e.ry.is_static()
                && e.rz.is_static()
                && e.separate
                    .as_ref()
                    .is_none_or(|(x, y)| x.is_static() && y.is_static());
        }
        t.extra = extra;
        t.statik = statik;
        t
    }

    fn parse_rect(&mut self) -> Option<ShapeNode> {
        let mut obj = RectData {
            name: Tag::default(),
            pos: Value::default(),
            size: Value::default(),
            round: Value::Static(0.0),
            direction: PathDirection::Cw,
            statik: true,
        };
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => obj.name = Tag::new(&self.lexer.get_string()),
                "p" => obj.pos = self.parse_property::<Vec2>(),
                "s" => obj.size = self.parse_property::<Vec2>(),
                "r" => obj.round = self.parse_property::<f32>(),
                "d" => obj.direction = direction(self.lexer.get_int()),
                "hd" => hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }
        obj.statik = obj.pos.is_static() && obj.size.is_static() && obj.round.is_static();
        if hidden {
            None
        } else {
            Some(ShapeNode::Rect(obj))
        }
    }

    fn parse_ellipse(&mut self) -> Option<ShapeNode> {
        let mut obj = EllipseData {
            name: Tag::default(),
            pos: Value::default(),
            size: Value::default(),
            direction: PathDirection::Cw,
            statik: true,
        };
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => obj.name = Tag::new(&self.lexer.get_string()),
                "p" => obj.pos = self.parse_property::<Vec2>(),
                "s" => obj.size = self.parse_property::<Vec2>(),
                "d" => obj.direction = direction(self.lexer.get_int()),
                "hd" => hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }
        obj.statik = obj.pos.is_static() && obj.size.is_static();
        if hidden {
            None
        } else {
            Some(ShapeNode::Ellipse(obj))
        }
    }

    fn parse_path_shape(&mut self) -> Option<ShapeNode> {
        let mut obj = PathData {
            name: Tag::default(),
            shape: Value::default(),
            direction: PathDirection::Cw,
            statik: true,
        };
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => obj.name = Tag::new(&self.lexer.get_string()),
                "ks" => obj.shape = self.parse_shape_property(),
                "d" => obj.direction = direction(self.lexer.get_int()),
                "hd" => hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }
        obj.statik = obj.shape.is_static();
        if hidden {
            None
        } else {
            Some(ShapeNode::Path(obj))
        }
    }

    fn parse_polystar(&mut self) -> Option<ShapeNode> {
        let mut obj = PolystarData {
            name: Tag::default(),
            kind: PolystarKind::Polygon,
            pos: Value::default(),
            point_count: Value::Static(0.0),
            inner_radius: Value::Static(0.0),
            outer_radius: Value::Static(0.0),
            inner_roundness: Value::Static(0.0),
            outer_roundness: Value::Static(0.0),
            rotation: Value::Static(0.0),
            direction: PathDirection::Cw,
            statik: true,
        };
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => obj.name = Tag::new(&self.lexer.get_string()),
                "p" => obj.pos = self.parse_property::<Vec2>(),
                "pt" => obj.point_count = self.parse_property::<f32>(),
                "ir" => obj.inner_radius = self.parse_property::<f32>(),
                "is" => obj.inner_roundness = self.parse_property::<f32>(),
                "or" => obj.outer_radius = self.parse_property::<f32>(),
                "os" => obj.outer_roundness = self.parse_property::<f32>(),
                "r" => obj.rotation = self.parse_property::<f32>(),
                "sy" => {
                    obj.kind = if self.lexer.get_int() == 1 {
                        PolystarKind::Star
                    } else {
                        PolystarKind::Polygon
                    };
                }
                "d" => obj.direction = direction(self.lexer.get_int()),
                "hd" => hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }
        obj.statik = obj.pos.is_static()
            && obj.point_count.is_static()
            && obj.inner_radius.is_static()
            && obj.inner_roundness.is_static()
            && obj.outer_radius.is_static()
            && obj.outer_roundness.is_static()
            && obj.rotation.is_static();
        if hidden {
            None
        } else {
            Some(ShapeNode::Polystar(obj))
        }
    }

    fn parse_fill(&mut self) -> Option<ShapeNode> {
        let mut obj = FillData {
            name: Tag::default(),
            color: Value::default(),
            opacity: Value::Static(100.0),
            fill_rule: FillRule::Winding,
            enabled: true,
            statik: true,
        };
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => obj.name = Tag::new(&self.lexer.get_string()),
                "c" => obj.color = self.parse_property::<Color>(),
                "o" => obj.opacity = self.parse_property::<f32>(),
                "fillEnabled" => obj.enabled = self.lexer.get_bool(),
                "r" => obj.fill_rule = get_fill_rule(self.lexer.get_int()),
                "hd" => hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }
        obj.statik = obj.color.is_static() && obj.opacity.is_static();
        if hidden {
            None
        } else {
            Some(ShapeNode::Fill(obj))
        }
    }

    fn parse_stroke(&mut self) -> Option<ShapeNode> {
        let mut obj = StrokeData {
            name: Tag::default(),
            color: Value::default(),
            opacity: Value::Static(100.0),
            width: Value::Static(0.0),
            cap: CapStyle::Flat,
            join: JoinStyle::Miter,
            miter_limit: 0.0,
            dash: DashData::default(),
            enabled: true,
            statik: true,
        };
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => obj.name = Tag::new(&self.lexer.get_string()),
                "c" => obj.color = self.parse_property::<Color>(),
                "o" => obj.opacity = self.parse_property::<f32>(),
                "w" => obj.width = self.parse_property::<f32>(),
                "fillEnabled" => obj.enabled = self.lexer.get_bool(),
                "lc" => obj.cap = line_cap(self.lexer.get_int()),
                "lj" => obj.join = line_join(self.lexer.get_int()),
                "ml" => obj.miter_limit = self.lexer.get_double() as f32,
                "d" => obj.dash = self.parse_dash_property(),
                "hd" => hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }
        obj.statik = obj.color.is_static()
            && obj.opacity.is_static()
            && obj.width.is_static()
            && obj.dash.is_static();
        if hidden {
            None
        } else {
            Some(ShapeNode::Stroke(obj))
        }
    }

    /// Shared gradient keys; returns `false` when the key was not a
    /// gradient property.
    fn parse_gradient_key(&mut self, obj: &mut GradientData, key: &str) -> bool {
        match key {
            "nm" => obj.name = Tag::new(&self.lexer.get_string()),
            "t" => obj.kind = self.lexer.get_int(),
            "o" => obj.opacity = self.parse_property::<f32>(),
            "s" => obj.start_point = self.parse_property::<Vec2>(),
            "e" => obj.end_point = self.parse_property::<Vec2>(),
            "h" => obj.highlight_length = self.parse_property::<f32>(),
            "a" => obj.highlight_angle = self.parse_property::<f32>(),
            "g" => {
                self.lexer.enter_object();
                while let Some(rkey) = self.lexer.next_object_key() {
                    match rkey.as_str() {
                        "k" => obj.stops = self.parse_property::<GradientRaw>(),
                        "p" => obj.color_points = self.lexer.get_int(),
                        _ => self.lexer.skip(),
                    }
                }
            }
            _ => return false,
        }
        obj.statik = obj.opacity.is_static()
            && obj.start_point.is_static()
            && obj.end_point.is_static()
            && obj.highlight_angle.is_static()
            && obj.highlight_length.is_static()
            && obj.stops.is_static();
        true
    }

    fn parse_gradient_fill(&mut self) -> Option<ShapeNode> {
        let mut gradient = GradientData::default();
        let mut fill_rule = FillRule::Winding;
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "r" => fill_rule = get_fill_rule(self.lexer.get_int()),
                "hd" => hidden = self.lexer.get_bool(),
                other => {
                    if !self.parse_gradient_key(&mut gradient, other) {
                        self.lexer.skip();
                    }
                }
            }
        }
        if hidden {
            None
        } else {
            Some(ShapeNode::GradientFill(GradientFillData {
                gradient,
                fill_rule,
            }))
        }
    }

    fn parse_gradient_stroke(&mut self) -> Option<ShapeNode> {
        let mut gradient = GradientData::default();
        let mut width = Value::Static(0.0);
        let mut cap = CapStyle::Flat;
        let mut join = JoinStyle::Miter;
        let mut miter_limit = 0.0;
        let mut dash = DashData::default();
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "w" => width = self.parse_property::<f32>(),
                "lc" => cap = line_cap(self.lexer.get_int()),
                "lj" => join = line_join(self.lexer.get_int()),
                "ml" => miter_limit = self.lexer.get_double() as f32,
                "d" => dash = self.parse_dash_property(),
                "hd" => hidden = self.lexer.get_bool(),
                other => {
                    if !self.parse_gradient_key(&mut gradient, other) {
                        self.lexer.skip();
                    }
                }
            }
        }
        let stroke_static = width.is_static() && dash.is_static();
        if hidden {
            None
        } else {
            Some(ShapeNode::GradientStroke(GradientStrokeData {
                gradient,
                width,
                cap,
                join,
                miter_limit,
                dash,
                stroke_static,
            }))
        }
    }

    fn parse_dash_property(&mut self) -> DashData {
        let mut dash = DashData::default();
        self.lexer.enter_array();
        while self.lexer.next_array_value() {
            self.lexer.enter_object();
            while let Some(key) = self.lexer.next_object_key() {
                if key.as_str() == "v" {
                    dash.elements.push(self.parse_property::<f32>());
                } else {
                    self.lexer.skip();
                }
            }
        }
        dash
    }

    fn parse_trim(&mut self) -> Option<ShapeNode> {
        let mut obj = TrimData {
            name: Tag::default(),
            start: Value::Static(0.0),
            end: Value::Static(0.0),
            offset: Value::Static(0.0),
            kind: TrimKind::Simultaneously,
            statik: true,
        };
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => obj.name = Tag::new(&self.lexer.get_string()),
                "s" => obj.start = self.parse_property::<f32>(),
                "e" => obj.end = self.parse_property::<f32>(),
                "o" => obj.offset = self.parse_property::<f32>(),
                "m" => {
                    obj.kind = if self.lexer.get_int() == 2 {
                        TrimKind::Individually
                    } else {
                        TrimKind::Simultaneously
                    };
                }
                "hd" => hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }
        obj.statik = obj.start.is_static() && obj.end.is_static() && obj.offset.is_static();
        if hidden {
            None
        } else {
            Some(ShapeNode::Trim(obj))
        }
    }

    fn parse_repeater(&mut self) -> Option<ShapeNode> {
        // Pre-allocate the private content group the post-pass fills.
        let content = ShapeId(self.comp.shapes.len() as u32);
        self.comp.shapes.push(ShapeNode::Group(GroupData::default()));

        let mut obj = RepeaterData {
            name: Tag::default(),
            content,
            copies: Value::Static(0.0),
            max_copies: 0.0,
            offset: Value::Static(0.0),
            transform: RepeaterTransform::default(),
            statik: true,
            processed: false,
        };
        let mut hidden = false;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "nm" => obj.name = Tag::new(&self.lexer.get_string()),
                "c" => {
                    obj.copies = self.parse_property::<f32>();
                    obj.max_copies = match &obj.copies {
                        Value::Static(v) => *v,
                        Value::Animated(frames) => frames
                            .iter()
                            .flat_map(|kf| [kf.start_value, kf.end_value])
                            .fold(0.0, f32::max),
                    };
                }
                "o" => obj.offset = self.parse_property::<f32>(),
                "tr" => obj.transform = self.parse_repeater_transform(),
                "hd" => hidden = self.lexer.get_bool(),
                _ => self.lexer.skip(),
            }
        }
        obj.statik =
            obj.copies.is_static() && obj.offset.is_static() && obj.transform.statik;
        if hidden {
            None
        } else {
            Some(ShapeNode::Repeater(obj))
        }
    }

    fn parse_repeater_transform(&mut self) -> RepeaterTransform {
        self.lexer.enter_object();
        let mut t = RepeaterTransform::default();
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "a" => t.anchor = self.parse_property::<Vec2>(),
                "p" => t.position = self.parse_position_property(),
                "r" => t.rotation = self.parse_property::<f32>(),
                "s" => t.scale = self.parse_property::<Vec2>(),
                "so" => t.start_opacity = self.parse_property::<f32>(),
                "eo" => t.end_opacity = self.parse_property::<f32>(),
                _ => self.lexer.skip(),
            }
        }
        t.statik = t.anchor.is_static()
            && t.position.is_static()
            && t.rotation.is_static()
            && t.scale.is_static()
            && t.start_opacity.is_static()
            && t.end_opacity.is_static();
        t
    }

    // ==================================================================
    // Properties
    // ==================================================================

    /// `{"k": ...}` wrapper around a plain property.
    fn parse_property<T: PropertyValue>(&mut self) -> Value<T> {
        self.lexer.enter_object();
        let mut value = Value::Static(T::default());
        while let Some(key) = self.lexer.next_object_key() {
            if key.as_str() == "k" {
                value = self.parse_property_helper::<T>();
            } else {
                self.lexer.skip();
            }
        }
        value
    }

    fn parse_property_helper<T: PropertyValue>(&mut self) -> Value<T> {
        match self.lexer.peek_type() {
            TokenType::Number => Value::Static(T::get(&mut self.lexer)),
            TokenType::Array => {
                self.lexer.enter_array();
                let mut frames: Vec<KeyFrame<T>> = Vec::new();
                let mut statik: Option<T> = None;
                while self.lexer.next_array_value() {
                    if self.lexer.peek_type() == TokenType::Object {
                        self.parse_keyframe(&mut frames);
                    } else {
                        // Multi-value static property: the array holds
                        // the components themselves.
                        statik = Some(T::get_remaining(&mut self.lexer));
                        break;
                    }
                }
                match (statik, frames.is_empty()) {
                    (Some(v), _) => Value::Static(v),
                    (None, false) => Value::Animated(frames),
                    (None, true) => Value::Static(T::default()),
                }
            }
            _ => {
                self.lexer.skip();
                Value::Static(T::default())
            }
        }
    }

    fn parse_keyframe<T: PropertyValue>(&mut self, frames: &mut Vec<KeyFrame<T>>) {
        self.lexer.enter_object();
        let mut kf = KeyFrame {
            start_frame: 0.0,
            end_frame: 0.0,
            start_value: T::default(),
            end_value: T::default(),
            interpolator: None,
        };
        let mut in_tangent = Vec2::ZERO;
        let mut out_tangent = Vec2::ZERO;
        let mut interp_key = String::new();
        let mut has_interp = false;
        let mut has_value = false;
        let mut no_end_value = true;
        let mut hold = false;

        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "i" => {
                    has_interp = true;
                    in_tangent = self.parse_interpolator_point();
                }
                "o" => out_tangent = self.parse_interpolator_point(),
                "t" => kf.start_frame = self.lexer.get_double() as f32,
                "s" => {
                    has_value = true;
                    kf.start_value = T::get(&mut self.lexer);
                }
                "e" => {
                    no_end_value = false;
                    kf.end_value = T::get(&mut self.lexer);
                }
                "n" => self.parse_interpolator_name(&mut interp_key),
                "h" => hold = self.lexer.get_int() != 0,
                _ => self.lexer.skip(),
            }
        }

        finish_keyframe(
            frames,
            kf,
            hold,
            has_interp,
            has_value,
            no_end_value,
            self.interpolator(in_tangent, out_tangent, &interp_key),
        );
    }

    fn parse_interpolator_name(&mut self, out: &mut String) {
        if self.lexer.peek_type() == TokenType::String {
            *out = self.lexer.get_string();
        } else if self.lexer.peek_type() == TokenType::Array {
            self.lexer.enter_array();
            while self.lexer.next_array_value() {
                let s = self.lexer.get_string();
                if out.is_empty() {
                    *out = s;
                }
            }
        } else {
            self.lexer.skip();
        }
    }

    fn parse_interpolator_point(&mut self) -> Vec2 {
        self.lexer.enter_object();
        let mut p = Vec2::ZERO;
        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "x" => p.x = f32::get(&mut self.lexer),
                "y" => p.y = f32::get(&mut self.lexer),
                _ => self.lexer.skip(),
            }
        }
        p
    }

    fn interpolator(&mut self, in_tangent: Vec2, out_tangent: Vec2, key: &str) -> Arc<Interpolator> {
        let key = if key.is_empty() {
            format!(
                "{:.2}_{:.2}_{:.2}_{:.2}",
                in_tangent.x, in_tangent.y, out_tangent.x, out_tangent.y
            )
        } else {
            key.to_owned()
        };
        self.interpolators
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Interpolator::new(
                    out_tangent.x,
                    out_tangent.y,
                    in_tangent.x,
                    in_tangent.y,
                ))
            })
            .clone()
    }

    /// Position property body (the `{"k": ...}` already entered at the
    /// `k` key): like the scalar helper but keyframes may carry `ti`/`to`
    /// spatial tangents.
    fn parse_position_helper(&mut self) -> Position {
        match self.lexer.peek_type() {
            TokenType::Number => Position::Static(Vec2::get(&mut self.lexer)),
            TokenType::Array => {
                self.lexer.enter_array();
                let mut frames: Vec<PositionKeyFrame> = Vec::new();
                let mut statik: Option<Vec2> = None;
                while self.lexer.next_array_value() {
                    if self.lexer.peek_type() == TokenType::Object {
                        self.parse_position_keyframe(&mut frames);
                    } else {
                        statik = Some(Vec2::get_remaining(&mut self.lexer));
                        break;
                    }
                }
                match (statik, frames.is_empty()) {
                    (Some(v), _) => Position::Static(v),
                    (None, false) => Position::Animated(frames),
                    (None, true) => Position::Static(Vec2::ZERO),
                }
            }
            _ => {
                self.lexer.skip();
                Position::Static(Vec2::ZERO)
            }
        }
    }

    fn parse_position_property(&mut self) -> Position {
        self.lexer.enter_object();
        let mut value = Position::default();
        while let Some(key) = self.lexer.next_object_key() {
            if key.as_str() == "k" {
                value = self.parse_position_helper();
            } else {
                self.lexer.skip();
            }
        }
        value
    }

    fn parse_position_keyframe(&mut self, frames: &mut Vec<PositionKeyFrame>) {
        self.lexer.enter_object();
        let mut kf = PositionKeyFrame {
            frame: KeyFrame {
                start_frame: 0.0,
                end_frame: 0.0,
                start_value: Vec2::ZERO,
                end_value: Vec2::ZERO,
                interpolator: None,
            },
            in_tangent: Vec2::ZERO,
            out_tangent: Vec2::ZERO,
            path_key_frame: false,
        };
        let mut in_tangent = Vec2::ZERO;
        let mut out_tangent = Vec2::ZERO;
        let mut interp_key = String::new();
        let mut has_interp = false;
        let mut has_value = false;
        let mut no_end_value = true;
        let mut hold = false;

        while let Some(key) = self.lexer.next_object_key() {
            match key.as_str() {
                "i" => {
                    has_interp = true;
                    in_tangent = self.parse_interpolator_point();
                }
                "o" => out_tangent = self.parse_interpolator_point(),
                "t" => kf.frame.start_frame = self.lexer.get_double() as f32,
                "s" => {
                    has_value = true;
                    kf.frame.start_value = Vec2::get(&mut self.lexer);
                }
                "e" => {
                    no_end_value = false;
                    kf.frame.end_value = Vec2::get(&mut self.lexer);
                }
                "ti" => {
                    kf.path_key_frame = true;
                    kf.in_tangent = Vec2::get(&mut self.lexer);
                }
                "to" => {
                    kf.path_key_frame = true;
                    kf.out_tangent = Vec2::get(&mut self.lexer);
                }
                "n" => self.parse_interpolator_name(&mut interp_key),
                "h" => hold = self.lexer.get_int() != 0,
                _ => self.lexer.skip(),
            }
        }

        let interp = self.interpolator(in_tangent, out_tangent, &interp_key);
        if let Some(prev) = frames.last_mut() {
            prev.frame.end_frame = kf.frame.start_frame;
            if has_value && no_end_value {
                prev.frame.end_value = kf.frame.start_value;
            }
        }
        if hold {
            kf.frame.end_value = kf.frame.start_value;
            kf.frame.end_frame = kf.frame.start_frame;
            frames.push(kf);
        } else if has_interp {
            kf.frame.interpolator = Some(interp);
            frames.push(kf);
        }
        // The terminating keyframe carries no interpolator and is
        // dropped after back-filling the previous end value.
    }

    /// Bezier shape property: static or keyframed shape data.
    fn parse_shape_property(&mut self) -> Value<ShapeData> {
        self.lexer.enter_object();
        let mut value = Value::Static(ShapeData::default());
        while let Some(key) = self.lexer.next_object_key() {
            if key.as_str() == "k" {
                if self.lexer.peek_type() == TokenType::Array {
                    self.lexer.enter_array();
                    let mut frames: Vec<KeyFrame<ShapeData>> = Vec::new();
                    while self.lexer.next_array_value() {
                        if self.lexer.peek_type() == TokenType::Object {
                            self.parse_keyframe(&mut frames);
                        } else {
                            self.lexer.skip();
                        }
                    }
                    if !frames.is_empty() {
                        value = Value::Animated(frames);
                    }
                } else {
                    value = Value::Static(ShapeData::get(&mut self.lexer));
                }
            } else {
                self.lexer.skip();
            }
        }
        value
    }

    // ==================================================================
    // Post passes
    // ==================================================================

    /// Assigns image bitmaps and splices precomp asset layer lists into
    /// the referencing layers, AND-ing the static flag.
    fn resolve_layer_refs(&mut self) {
        for layer_id in std::mem::take(&mut self.layers_to_resolve) {
            let Some(ref_id) = self.comp.layers[layer_id.0 as usize].ref_id.clone() else {
                continue;
            };
            match self.comp.assets.get(&ref_id) {
                Some(Asset::Precomp { layers, statik }) => {
                    let children = layers.clone();
                    let asset_static = *statik;
                    let layer = &mut self.comp.layers[layer_id.0 as usize];
                    layer.children = children;
                    layer.statik = layer.statik && asset_static;
                }
                Some(Asset::Image { .. }) => {
                    // Image layers read the asset at render-tree build.
                }
                None => {
                    warn!("asset not found: {ref_id}");
                }
            }
        }
    }

    /// Rewrites shape lists so every repeater owns its preceding
    /// siblings as private content. Already-processed repeaters (shared
    /// asset trees) are left alone.
    fn process_repeaters(&mut self) {
        let layer_count = self.comp.layers.len();
        for i in 0..layer_count {
            let shapes = std::mem::take(&mut self.comp.layers[i].shapes);
            let shapes = self.process_repeater_list(shapes);
            self.comp.layers[i].shapes = shapes;
        }
    }

    fn process_repeater_list(&mut self, mut list: Vec<ShapeId>) -> Vec<ShapeId> {
        // Scan back-to-front: the first repeater found (from the back)
        // steals everything before it in the list.
        let mut i = list.len();
        while i > 0 {
            i -= 1;
            let id = list[i];
            match &self.comp.shapes[id.0 as usize] {
                ShapeNode::Repeater(r) if !r.processed => {
                    let content = r.content;
                    if let ShapeNode::Repeater(r) = &mut self.comp.shapes[id.0 as usize] {
                        r.processed = true;
                    }
                    let stolen: Vec<ShapeId> = list.drain(..i).collect();
                    let stolen = self.process_repeater_list(stolen);
                    if let ShapeNode::Group(g) = &mut self.comp.shapes[content.0 as usize] {
                        g.children = stolen;
                    }
                    break;
                }
                ShapeNode::Group(g) => {
                    let children = g.children.clone();
                    let children = self.process_repeater_list(children);
                    if let ShapeNode::Group(g) = &mut self.comp.shapes[id.0 as usize] {
                        g.children = children;
                    }
                }
                _ => {}
            }
        }
        list
    }
}

fn finish_keyframe<T: PropertyValue>(
    frames: &mut Vec<KeyFrame<T>>,
    mut kf: KeyFrame<T>,
    hold: bool,
    has_interp: bool,
    has_value: bool,
    no_end_value: bool,
    interp: Arc<Interpolator>,
) {
    if let Some(prev) = frames.last_mut() {
        prev.end_frame = kf.start_frame;
        if has_value && no_end_value {
            prev.end_value = kf.start_value.clone();
        }
    }
    if hold {
        kf.end_value = kf.start_value.clone();
        kf.end_frame = kf.start_frame;
        frames.push(kf);
    } else if has_interp {
        kf.interpolator = Some(interp);
        frames.push(kf);
    }
}

// ======================================================================
// Value readers
// ======================================================================

/// Model value readable from the token stream. `get` reads a fresh
/// value; `get_remaining` reads from inside an already-entered array and
/// must consume it to the end.
pub trait PropertyValue: crate::model::Lerp + Default {
    fn get(lexer: &mut Lexer) -> Self;

    fn get_remaining(lexer: &mut Lexer) -> Self {
        Self::get(lexer)
    }
}

impl PropertyValue for f32 {
    fn get(lexer: &mut Lexer) -> Self {
        match lexer.peek_type() {
            TokenType::Array => {
                lexer.enter_array();
                Self::get_remaining(lexer)
            }
            _ => lexer.get_double() as f32,
        }
    }

    fn get_remaining(lexer: &mut Lexer) -> Self {
        let mut v = 0.0;
        let mut first = true;
        while lexer.next_array_value() {
            let value = lexer.get_double() as f32;
            if first {
                v = value;
                first = false;
            }
        }
        v
    }
}

fn read_components(lexer: &mut Lexer, out: &mut [f32]) {
    if lexer.peek_type() == TokenType::Array {
        lexer.enter_array();
    }
    let mut i = 0;
    while lexer.next_array_value() {
        let v = lexer.get_double() as f32;
        if i < out.len() {
            out[i] = v;
            i += 1;
        }
    }
}

impl PropertyValue for Vec2 {
    fn get(lexer: &mut Lexer) -> Self {
        let mut val = [0.0f32; 4];
        read_components(lexer, &mut val);
        Vec2::new(val[0], val[1])
    }
}

impl PropertyValue for Color {
    fn get(lexer: &mut Lexer) -> Self {
        let mut val = [0.0f32; 4];
        read_components(lexer, &mut val);
        Color::new(val[0], val[1], val[2])
    }
}

impl PropertyValue for GradientRaw {
    fn get(lexer: &mut Lexer) -> Self {
        if lexer.peek_type() == TokenType::Array {
            lexer.enter_array();
        }
        let mut out = Vec::new();
        while lexer.next_array_value() {
            out.push(lexer.get_double() as f32);
        }
        GradientRaw(out)
    }
}

impl PropertyValue for ShapeData {
    fn get(lexer: &mut Lexer) -> Self {
        let array_wrapper = lexer.peek_type() == TokenType::Array;
        if array_wrapper {
            lexer.enter_array();
        }
        let mut in_points: Vec<Vec2> = Vec::new();
        let mut out_points: Vec<Vec2> = Vec::new();
        let mut vertices: Vec<Vec2> = Vec::new();
        let mut closed = false;

        if lexer.peek_type() == TokenType::Object {
            lexer.enter_object();
            while let Some(key) = lexer.next_object_key() {
                match key.as_str() {
                    "i" => read_point_list(lexer, &mut in_points),
                    "o" => read_point_list(lexer, &mut out_points),
                    "v" => read_point_list(lexer, &mut vertices),
                    "c" => closed = lexer.get_bool(),
                    _ => lexer.skip(),
                }
            }
        }
        if array_wrapper {
            let _ = lexer.next_array_value();
        }

        if in_points.is_empty() || out_points.is_empty() || vertices.is_empty() {
            return ShapeData::default();
        }
        if in_points.len() != out_points.len() || in_points.len() != vertices.len() {
            warn!("shape data is corrupted, ignoring");
            return ShapeData::default();
        }

        // Convert the AE vertex/tangent form into a flat cubic list:
        // start, then (cp1, cp2, end) triples, closing back to the first
        // vertex when the contour is closed.
        let size = vertices.len();
        let mut points = Vec::with_capacity(3 * size + 4);
        points.push(vertices[0]);
        for i in 1..size {
            points.push(vertices[i - 1] + out_points[i - 1]);
            points.push(vertices[i] + in_points[i]);
            points.push(vertices[i]);
        }
        if closed {
            points.push(vertices[size - 1] + out_points[size - 1]);
            points.push(vertices[0] + in_points[0]);
            points.push(vertices[0]);
        }
        ShapeData { points, closed }
    }
}

fn read_point_list(lexer: &mut Lexer, out: &mut Vec<Vec2>) {
    if lexer.peek_type() != TokenType::Array {
        lexer.skip();
        return;
    }
    lexer.enter_array();
    while lexer.next_array_value() {
        out.push(Vec2::get(lexer));
    }
}

// ======================================================================
// Resource helpers
// ======================================================================

/// Decodes an embedded `data:…;base64,…` image into a premultiplied
/// bitmap.
fn decode_data_uri(uri: &str) -> Option<Bitmap> {
    use base64::Engine as _;
    use base64::engine::general_purpose;

    let comma = uri.find(',')?;
    let payload = &uri[comma + 1..];
    let bytes = general_purpose::STANDARD.decode(payload).ok()?;
    decode_image(&bytes)
}

fn load_image_file(path: &str) -> Option<Bitmap> {
    let bytes = std::fs::read(path).ok()?;
    decode_image(&bytes)
}

fn decode_image(bytes: &[u8]) -> Option<Bitmap> {
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img.to_rgba8(),
        Err(err) => {
            warn!("embedded image decode failed: {err}");
            return None;
        }
    };
    let (w, h) = img.dimensions();
    let mut bmp = Bitmap::new(w, h);
    {
        let mut surface = bmp.surface();
        for (y, row) in img.rows().enumerate() {
            for (x, px) in row.enumerate() {
                let [r, g, b, a] = px.0;
                let a32 = u32::from(a);
                let pm = |c: u8| (u32::from(c) * a32 + 127) / 255;
                let pixel = (a32 << 24) | (pm(r) << 16) | (pm(g) << 8) | pm(b);
                surface.set_pixel(x as i32, y as i32, pixel);
            }
        }
    }
    Some(bmp)
}

// ======================================================================
// Small enum decoders
// ======================================================================

fn direction(d: i32) -> PathDirection {
    if d == 3 {
        PathDirection::Ccw
    } else {
        PathDirection::Cw
    }
}

fn get_fill_rule(r: i32) -> FillRule {
    if r == 2 {
        FillRule::EvenOdd
    } else {
        FillRule::Winding
    }
}


fn line_cap(c: i32) -> CapStyle {
    match c {
        1 => CapStyle::Flat,
        2 => CapStyle::Round,
        _ => CapStyle::Square,
    }
}

fn line_join(j: i32) -> JoinStyle {
    match j {
        1 => JoinStyle::Miter,
        2 => JoinStyle::Round,
        _ => JoinStyle::Bevel,
    }
}


