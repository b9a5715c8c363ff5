//! Layer and group transforms.

use glam::{Affine2, Vec2};

use crate::model::property::{Position, Value};

/// Extra transform data most documents never carry.
#[derive(Debug, Clone, Default)]
pub struct TransformExtra {
    /// Position split into separate X/Y scalar properties.
    pub separate: Option<(Value<f32>, Value<f32>)>,
    /// 3D rotations, present when the layer is flagged `ddd`.
    pub rx: Value<f32>,
    pub ry: Value<f32>,
    pub rz: Value<f32>,
    pub three_d: bool,
}

#[derive(Debug, Clone)]
pub struct TransformData {
    pub anchor: Value<Vec2>,
    pub position: Position,
    /// Percent.
    pub scale: Value<Vec2>,
    /// Degrees.
    pub rotation: Value<f32>,
    /// 0..100.
    pub opacity: Value<f32>,
    pub extra: Option<Box<TransformExtra>>,
    pub statik: bool,
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            anchor: Value::Static(Vec2::ZERO),
            position: Position::default(),
            scale: Value::Static(Vec2::new(100.0, 100.0)),
            rotation: Value::Static(0.0),
            opacity: Value::Static(100.0),
            extra: None,
            statik: true,
        }
    }
}

impl TransformData {
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.statik
    }

    #[must_use]
    pub fn opacity(&self, frame: f32) -> f32 {
        self.opacity.eval(frame) / 100.0
    }

    /// The local matrix at `frame`. With `auto_orient` the layer turns
    /// along its motion path tangent.
    #[must_use]
    pub fn matrix(&self, frame: f32, auto_orient: bool) -> Affine2 {
        let position = match &self.extra {
            Some(e) if e.separate.is_some() => {
                let (sx, sy) = e.separate.as_ref().unwrap();
                Vec2::new(sx.eval(frame), sy.eval(frame))
            }
            _ => self.position.eval(frame),
        };
        let angle = if auto_orient {
            self.position.angle(frame)
        } else {
            0.0
        };
        let scale = self.scale.eval(frame) / 100.0;
        let anchor = self.anchor.eval(frame);

        match &self.extra {
            Some(e) if e.three_d => {
                // Planar projection of the 3D rotations: rz spins in
                // plane, rx/ry foreshorten their opposite axes.
                let rz = e.rz.eval(frame) + angle;
                let sx = e.ry.eval(frame).to_radians().cos();
                let sy = e.rx.eval(frame).to_radians().cos();
                Affine2::from_translation(position)
                    * Affine2::from_angle(rz.to_radians())
                    * Affine2::from_scale(Vec2::new(sx, sy))
                    * Affine2::from_scale(scale)
                    * Affine2::from_translation(-anchor)
            }
            _ => {
                let rotation = self.rotation.eval(frame) + angle;
                Affine2::from_translation(position)
                    * Affine2::from_angle(rotation.to_radians())
                    * Affine2::from_scale(scale)
                    * Affine2::from_translation(-anchor)
            }
        }
    }
}

/// Repeater per-copy transform: `so`/`eo` fade between the first and the
/// last copy, scale compounds per copy.
#[derive(Debug, Clone)]
pub struct RepeaterTransform {
    pub anchor: Value<Vec2>,
    pub position: Position,
    pub scale: Value<Vec2>,
    pub rotation: Value<f32>,
    pub start_opacity: Value<f32>,
    pub end_opacity: Value<f32>,
    pub statik: bool,
}

impl Default for RepeaterTransform {
    fn default() -> Self {
        Self {
            anchor: Value::Static(Vec2::ZERO),
            position: Position::default(),
            scale: Value::Static(Vec2::new(100.0, 100.0)),
            rotation: Value::Static(0.0),
            start_opacity: Value::Static(100.0),
            end_opacity: Value::Static(100.0),
            statik: true,
        }
    }
}

impl RepeaterTransform {
    /// Matrix for the copy at `multiplier` (copy index plus offset).
    #[must_use]
    pub fn matrix(&self, frame: f32, multiplier: f32) -> Affine2 {
        let scale = self.scale.eval(frame) / 100.0;
        let scale = Vec2::new(scale.x.powf(multiplier), scale.y.powf(multiplier));
        let anchor = self.anchor.eval(frame);
        Affine2::from_translation(self.position.eval(frame) * multiplier)
            * Affine2::from_translation(anchor)
            * Affine2::from_scale(scale)
            * Affine2::from_angle((self.rotation.eval(frame) * multiplier).to_radians())
            * Affine2::from_translation(-anchor)
    }

    #[must_use]
    pub fn start_opacity(&self, frame: f32) -> f32 {
        self.start_opacity.eval(frame) / 100.0
    }

    #[must_use]
    pub fn end_opacity(&self, frame: f32) -> f32 {
        self.end_opacity.eval(frame) / 100.0
    }
}
