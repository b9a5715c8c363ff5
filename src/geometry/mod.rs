pub mod bezier;
pub mod color;
pub mod dash;
pub mod measure;
pub mod path;
pub mod rect;

pub use bezier::CubicBez;
pub use color::Color;
pub use dash::Dasher;
pub use measure::PathMeasure;
pub use path::{Path, PathDirection, PathElement};
pub use rect::{IntRect, Rect};

use glam::{Affine2, Vec2};

/// Average absolute scale factor of an affine transform, used to scale
/// stroke widths and dash patterns into device space.
#[must_use]
pub fn matrix_scale(m: &Affine2) -> f32 {
    let x = m.transform_vector2(Vec2::new(1.0, 0.0)).length();
    let y = m.transform_vector2(Vec2::new(0.0, 1.0)).length();
    ((x * x + y * y) * 0.5).sqrt()
}
