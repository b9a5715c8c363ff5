//! Span-based compositor: premultiplied-BGRA surfaces, brushes,
//! gradient tables and the painter that blends RLE coverage into pixels.

pub mod blend;
pub mod brush;
pub mod gradient;
pub mod painter;
pub mod surface;

pub use blend::BlendMode;
pub use brush::Brush;
pub use gradient::{Gradient, GradientKind, GradientStop};
pub use painter::Painter;
pub use surface::{Bitmap, Surface};
