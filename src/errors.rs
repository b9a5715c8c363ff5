//! Error Types
//!
//! The main error type [`FlickerError`] covers every failure mode of the
//! renderer: document parsing, asset loading and decoding, render
//! scheduling, and pipeline teardown.
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, FlickerError>`. Errors are local and non-fatal
//! to the animation system; nothing panics through the public API.

use thiserror::Error;

/// The main error type for the flicker renderer.
#[derive(Error, Debug)]
pub enum FlickerError {
    // ========================================================================
    // Document Errors
    // ========================================================================
    /// Malformed JSON or an unexpected token; the parser is latched in its
    /// error state and the document yields no model.
    #[error("Not a Lottie file: {0}")]
    Parse(String),

    /// The animation file was missing or empty.
    #[error("Failed to load animation: {0}")]
    Load(String),

    /// A feature the renderer does not support (text layers, merge paths).
    /// The offending node is skipped and the surrounding animation
    /// continues.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    /// A referenced asset id is absent; the layer renders empty.
    #[error("Asset not found: {0}")]
    AssetMissing(String),

    // ========================================================================
    // Render & Pipeline Errors
    // ========================================================================
    /// A second concurrent `render_sync` on the same animation instance.
    #[error("Render already in progress for this animation")]
    ConcurrentRender,

    /// The worker has exited; commands are no longer processed.
    #[error("Render pipeline terminated")]
    Terminated,

    // ========================================================================
    // I/O & Decoding Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<image::ImageError> for FlickerError {
    fn from(err: image::ImageError) -> Self {
        FlickerError::ImageDecode(err.to_string())
    }
}

/// Alias for `Result<T, FlickerError>`.
pub type Result<T> = std::result::Result<T, FlickerError>;
