//! Shape-layer content nodes.
//!
//! Contents live in the composition's shape arena as a tagged sum type;
//! groups (and repeaters) reference children by id. The declarative
//! order is front-to-back as exported.

use glam::Vec2;

use crate::geometry::color::Color;
use crate::geometry::path::PathDirection;
use crate::model::property::{GradientRaw, Position, ShapeData, Value};
use crate::model::transform::{RepeaterTransform, TransformData};
use crate::raster::{CapStyle, FillRule, JoinStyle};
use crate::utils::{Tag, fuzzy_compare};

/// Index into [`crate::model::Composition::shapes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u32);

#[derive(Debug, Clone)]
pub enum ShapeNode {
    Group(GroupData),
    Rect(RectData),
    Ellipse(EllipseData),
    Path(PathData),
    Polystar(PolystarData),
    Fill(FillData),
    GradientFill(GradientFillData),
    Stroke(StrokeData),
    GradientStroke(GradientStrokeData),
    Trim(TrimData),
    Repeater(RepeaterData),
}

impl ShapeNode {
    #[must_use]
    pub fn is_static(&self) -> bool {
        match self {
            ShapeNode::Group(d) => d.statik,
            ShapeNode::Rect(d) => d.statik,
            ShapeNode::Ellipse(d) => d.statik,
            ShapeNode::Path(d) => d.statik,
            ShapeNode::Polystar(d) => d.statik,
            ShapeNode::Fill(d) => d.statik,
            ShapeNode::GradientFill(d) => d.gradient.statik,
            ShapeNode::Stroke(d) => d.statik,
            ShapeNode::GradientStroke(d) => d.gradient.statik && d.stroke_static,
            ShapeNode::Trim(d) => d.statik,
            ShapeNode::Repeater(d) => d.statik,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupData {
    pub name: Tag,
    pub children: Vec<ShapeId>,
    pub transform: Option<TransformData>,
    pub statik: bool,
}

#[derive(Debug, Clone)]
pub struct RectData {
    pub name: Tag,
    pub pos: Value<Vec2>,
    pub size: Value<Vec2>,
    pub round: Value<f32>,
    pub direction: PathDirection,
    pub statik: bool,
}

#[derive(Debug, Clone)]
pub struct EllipseData {
    pub name: Tag,
    pub pos: Value<Vec2>,
    pub size: Value<Vec2>,
    pub direction: PathDirection,
    pub statik: bool,
}

#[derive(Debug, Clone)]
pub struct PathData {
    pub name: Tag,
    pub shape: Value<ShapeData>,
    pub direction: PathDirection,
    pub statik: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolystarKind {
    Star,
    Polygon,
}

#[derive(Debug, Clone)]
pub struct PolystarData {
    pub name: Tag,
    pub kind: PolystarKind,
    pub pos: Value<Vec2>,
    pub point_count: Value<f32>,
    pub inner_radius: Value<f32>,
    pub outer_radius: Value<f32>,
    pub inner_roundness: Value<f32>,
    pub outer_roundness: Value<f32>,
    pub rotation: Value<f32>,
    pub direction: PathDirection,
    pub statik: bool,
}

#[derive(Debug, Clone)]
pub struct FillData {
    pub name: Tag,
    pub color: Value<Color>,
    /// 0..100.
    pub opacity: Value<f32>,
    pub fill_rule: FillRule,
    pub enabled: bool,
    pub statik: bool,
}

/// Common gradient description shared by gradient fills and strokes.
#[derive(Debug, Clone)]
pub struct GradientData {
    pub name: Tag,
    /// 1 = linear, 2 = radial.
    pub kind: i32,
    pub start_point: Value<Vec2>,
    pub end_point: Value<Vec2>,
    pub highlight_length: Value<f32>,
    pub highlight_angle: Value<f32>,
    pub opacity: Value<f32>,
    pub stops: Value<GradientRaw>,
    /// Color stop count inside the raw array; -1 for legacy exports.
    pub color_points: i32,
    pub statik: bool,
}

impl Default for GradientData {
    fn default() -> Self {
        Self {
            name: Tag::default(),
            kind: 1,
            start_point: Value::default(),
            end_point: Value::default(),
            highlight_length: Value::Static(0.0),
            highlight_angle: Value::Static(0.0),
            opacity: Value::Static(100.0),
            stops: Value::default(),
            color_points: -1,
            statik: true,
        }
    }
}

impl GradientData {
    /// Resolves the raw stop array into position/color/opacity stops.
    /// Color stops and opacity stops live in the same array; opacity is
    /// merged into the color stops by linear interpolation.
    #[must_use]
    pub fn populate(&self, frame: f32) -> Vec<crate::paint::GradientStop> {
        use crate::paint::GradientStop;

        let raw = self.stops.eval(frame);
        let data = &raw.0;
        let color_points = if self.color_points < 0 {
            // Legacy bodymovin: the whole array is color stops.
            (data.len() / 4) as i32
        } else {
            self.color_points
        } as usize;
        if data.len() < color_points * 4 {
            return Vec::new();
        }

        let opacity = &data[color_points * 4..];
        let mut stops = Vec::with_capacity(color_points);
        let mut j = 0usize;
        for i in 0..color_points {
            let base = i * 4;
            let pos = data[base];
            let color = Color::new(data[base + 1], data[base + 2], data[base + 3]);
            if opacity.is_empty() {
                stops.push(GradientStop {
                    pos,
                    color,
                    opacity: 1.0,
                });
                continue;
            }
            if j >= opacity.len() {
                // Past the final opacity stop: extrapolate with the last
                // pair.
                let op = if opacity.len() >= 4 {
                    let (s1, o1, s2, o2) = (
                        opacity[opacity.len() - 4],
                        opacity[opacity.len() - 3],
                        opacity[opacity.len() - 2],
                        opacity[opacity.len() - 1],
                    );
                    if pos > s2 || (s2 - s1).abs() < f32::EPSILON {
                        o2
                    } else {
                        o1 + (pos - s1) / (s2 - s1) * (o2 - o1)
                    }
                } else if opacity.len() >= 2 {
                    opacity[1]
                } else {
                    1.0
                };
                stops.push(GradientStop {
                    pos,
                    color,
                    opacity: op,
                });
                continue;
            }
            // Walk opacity stops up to this color stop, emitting extra
            // stops for opacity positions before it.
            let mut emitted = false;
            while j + 1 < opacity.len() {
                let op_pos = opacity[j];
                let op_val = opacity[j + 1];
                if op_pos < pos {
                    stops.push(GradientStop {
                        pos: op_pos,
                        color,
                        opacity: op_val,
                    });
                    j += 2;
                    continue;
                }
                let op = if j == 0 {
                    op_val
                } else {
                    let prev_pos = opacity[j - 2];
                    let prev_val = opacity[j - 1];
                    let denom = op_pos - prev_pos;
                    if denom.abs() < f32::EPSILON {
                        op_val
                    } else {
                        prev_val + (pos - prev_pos) / denom * (op_val - prev_val)
                    }
                };
                stops.push(GradientStop {
                    pos,
                    color,
                    opacity: op,
                });
                j += 2;
                emitted = true;
                break;
            }
            if !emitted && j + 1 >= opacity.len() {
                let op = if opacity.len() >= 2 {
                    opacity[opacity.len() - 1]
                } else {
                    1.0
                };
                stops.push(GradientStop {
                    pos,
                    color,
                    opacity: op,
                });
            }
        }
        stops
    }

    /// Evaluates the gradient geometry into a paint gradient. The radial
    /// focal point sits `highlight length` toward the edge, rotated by
    /// `highlight angle`; a full-length highlight is clamped just short.
    #[must_use]
    pub fn evaluate(&self, frame: f32, alpha: f32) -> crate::paint::Gradient {
        use crate::paint::{Gradient, GradientKind};

        let start = self.start_point.eval(frame);
        let end = self.end_point.eval(frame);
        let kind = if self.kind == 1 {
            GradientKind::Linear { start, end }
        } else {
            let center = start;
            let center_radius = (end - start).length();
            let mut progress = self.highlight_length.eval(frame) / 100.0;
            if fuzzy_compare(progress, 1.0) {
                progress = 0.99;
            }
            let start_angle = (end.y - start.y).atan2(end.x - start.x).to_degrees();
            let highlight_angle = self.highlight_angle.eval(frame);
            let angle = (start_angle + highlight_angle).to_radians();
            let focal = Vec2::new(
                center.x + angle.cos() * progress * center_radius,
                center.y + angle.sin() * progress * center_radius,
            );
            GradientKind::Radial {
                center,
                center_radius,
                focal,
                focal_radius: 0.0,
            }
        };
        Gradient {
            kind,
            stops: self.populate(frame),
            alpha,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GradientFillData {
    pub gradient: GradientData,
    pub fill_rule: FillRule,
}

#[derive(Debug, Clone)]
pub struct StrokeData {
    pub name: Tag,
    pub color: Value<Color>,
    pub opacity: Value<f32>,
    pub width: Value<f32>,
    pub cap: CapStyle,
    pub join: JoinStyle,
    pub miter_limit: f32,
    pub dash: DashData,
    pub enabled: bool,
    pub statik: bool,
}

#[derive(Debug, Clone)]
pub struct GradientStrokeData {
    pub gradient: GradientData,
    pub width: Value<f32>,
    pub cap: CapStyle,
    pub join: JoinStyle,
    pub miter_limit: f32,
    pub dash: DashData,
    pub stroke_static: bool,
}

/// Alternating dash/gap properties; the exporter appends the offset last.
#[derive(Debug, Clone, Default)]
pub struct DashData {
    pub elements: Vec<Value<f32>>,
}

impl DashData {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.elements.iter().all(Value::is_static)
    }

    /// Evaluates the pattern. An even count is missing its trailing gap:
    /// the last dash value is duplicated and the offset stays last.
    #[must_use]
    pub fn eval(&self, frame: f32) -> Vec<f32> {
        let mut out: Vec<f32> = self.elements.iter().map(|e| e.eval(frame)).collect();
        let n = out.len();
        if n != 0 && n % 2 == 0 {
            out.push(out[n - 1]);
            out[n - 1] = out[n - 2];
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimKind {
    Simultaneously,
    Individually,
}

#[derive(Debug, Clone)]
pub struct TrimData {
    pub name: Tag,
    /// Percent.
    pub start: Value<f32>,
    pub end: Value<f32>,
    pub offset: Value<f32>,
    pub kind: TrimKind,
    pub statik: bool,
}

/// Effective trim window in [0,1] after offset folding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimSegment {
    pub start: f32,
    pub end: f32,
}

impl TrimData {
    /// Folds start/end/offset into an absolute segment the path measure
    /// understands. A reversed (start > end) result is a wrap-around
    /// window.
    #[must_use]
    pub fn segment(&self, frame: f32) -> TrimSegment {
        let start = self.start.eval(frame) / 100.0;
        let end = self.end.eval(frame) / 100.0;
        let offset = (self.offset.eval(frame) % 360.0) / 360.0;

        let noloop = |a: f32, b: f32| TrimSegment {
            start: a.min(b),
            end: a.max(b),
        };
        let wrap = |a: f32, b: f32| TrimSegment {
            start: a.max(b),
            end: a.min(b),
        };

        let diff = (start - end).abs();
        if fuzzy_compare(diff, 0.0) {
            return TrimSegment {
                start: 0.0,
                end: 0.0,
            };
        }
        if fuzzy_compare(diff, 1.0) {
            return TrimSegment {
                start: 0.0,
                end: 1.0,
            };
        }

        let start = start + offset;
        let end = end + offset;
        if offset > 0.0 {
            if start <= 1.0 && end <= 1.0 {
                noloop(start, end)
            } else if start > 1.0 && end > 1.0 {
                noloop(start - 1.0, end - 1.0)
            } else if start > 1.0 {
                wrap(start - 1.0, end)
            } else {
                wrap(start, end - 1.0)
            }
        } else if start >= 0.0 && end >= 0.0 {
            noloop(start, end)
        } else if start < 0.0 && end < 0.0 {
            noloop(1.0 + start, 1.0 + end)
        } else if start < 0.0 {
            wrap(1.0 + start, end)
        } else {
            wrap(start, 1.0 + end)
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepeaterData {
    pub name: Tag,
    /// Private group holding the repeated content (filled by the
    /// repeater post-pass).
    pub content: ShapeId,
    pub copies: Value<f32>,
    pub max_copies: f32,
    pub offset: Value<f32>,
    pub transform: RepeaterTransform,
    pub statik: bool,
    /// Guards the post-pass against reprocessing shared asset trees.
    pub processed: bool,
}
