//! Host texture upload hook.
//!
//! The renderer never touches GPU APIs itself; the host supplies an
//! uploader that creates and updates its textures from finished frames.
//! Frame data is tightly packed premultiplied BGRA, 4 bytes per pixel,
//! `width * 4` bytes per row.

/// Opaque host texture handle published into registry descriptors.
pub type TextureHandle = u64;

pub trait TextureUploader {
    /// Creates a texture for a newly promoted animation frame and
    /// returns its handle.
    fn create(&mut self, pid: u32, width: u32, height: u32, data: &[u8]) -> TextureHandle;

    /// Updates an existing texture in place.
    fn update(&mut self, handle: TextureHandle, width: u32, height: u32, data: &[u8]);
}
