#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]

pub mod animation;
pub mod errors;
pub mod geometry;
pub mod model;
pub mod paint;
pub mod parser;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod utils;

pub use animation::{Animation, ModelCache};
pub use errors::{FlickerError, Result};
pub use geometry::color::Color;
pub use geometry::path::{Path, PathDirection};
pub use paint::surface::{Bitmap, Surface};
pub use pipeline::registry::{BAD_PICTURE_ID, LottieRenderer};
pub use pipeline::upload::TextureUploader;
pub use raster::rle::{Rle, Span};
