//! Public animation facade.
//!
//! An [`Animation`] pairs an immutable parsed composition with its
//! mutable render tree and exposes frame queries plus synchronous
//! rasterization. Instances are shared through `Arc`; a second
//! concurrent `render_sync` on the same instance is rejected.

use std::path::Path as FsPath;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::error;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::errors::{FlickerError, Result};
use crate::model::Composition;
use crate::paint::Surface;
use crate::parser;
use crate::render::RenderTree;

pub struct Animation {
    comp: Arc<Composition>,
    tree: Mutex<RenderTree>,
    render_in_progress: AtomicBool,
}

impl Animation {
    /// Loads a Lottie file from disk without going through a cache.
    pub fn from_file(path: &str) -> Result<Arc<Animation>> {
        let data = std::fs::read(path)
            .map_err(|_| FlickerError::Load(format!("failed to read {path}")))?;
        if data.is_empty() {
            return Err(FlickerError::Load(format!("{path} is empty")));
        }
        let dir = dir_of(path);
        Self::from_bytes(data, &dir)
    }

    /// Parses in-memory document bytes; `resource_path` resolves
    /// external image assets.
    pub fn from_data(data: &str, resource_path: &str) -> Result<Arc<Animation>> {
        Self::from_bytes(data.as_bytes().to_vec(), resource_path)
    }

    fn from_bytes(data: Vec<u8>, resource_path: &str) -> Result<Arc<Animation>> {
        match parser::parse(data, resource_path) {
            Some(comp) => Ok(Self::from_composition(Arc::new(comp))),
            None => Err(FlickerError::Parse("not a Lottie file".into())),
        }
    }

    #[must_use]
    pub fn from_composition(comp: Arc<Composition>) -> Arc<Animation> {
        Arc::new(Animation {
            tree: Mutex::new(RenderTree::new(comp.clone())),
            comp,
            render_in_progress: AtomicBool::new(false),
        })
    }

    #[inline]
    #[must_use]
    pub fn composition(&self) -> &Arc<Composition> {
        &self.comp
    }

    #[must_use]
    pub fn total_frame(&self) -> usize {
        self.comp.total_frame().max(0.0) as usize
    }

    #[must_use]
    pub fn frame_rate(&self) -> f32 {
        self.comp.frame_rate
    }

    /// Seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.comp.duration()
    }

    #[must_use]
    pub fn frame_at_pos(&self, pos: f64) -> usize {
        self.comp.frame_at_pos(pos)
    }

    /// Canvas size as authored.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (
            self.comp.size.x.max(0.0) as u32,
            self.comp.size.y.max(0.0) as u32,
        )
    }

    /// Renders `frame_no` into the surface, fitting the viewbox with
    /// min-scale + center alignment unless `keep_aspect_ratio` is off.
    /// The frame index is clamped to the composition's range. Exactly
    /// the surface pixels are written.
    ///
    /// A second concurrent call on the same instance fails fast and
    /// leaves the surface untouched.
    pub fn render_sync(
        &self,
        frame_no: usize,
        surface: Surface<'_>,
        keep_aspect_ratio: bool,
    ) -> Result<()> {
        if self
            .render_in_progress
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            error!("render already in progress for this animation");
            return Err(FlickerError::ConcurrentRender);
        }

        let frame = self.comp.start_frame + frame_no as f32;
        let frame = frame.clamp(self.comp.start_frame, self.comp.end_frame);

        let mut tree = self.tree.lock();
        tree.update(frame, surface.width(), surface.height(), keep_aspect_ratio);
        tree.render(surface);
        drop(tree);

        self.render_in_progress.store(false, Ordering::Release);
        Ok(())
    }
}

/// Directory part of a document path, trailing separator included, for
/// resolving relative image assets.
fn dir_of(path: &str) -> String {
    FsPath::new(path)
        .parent()
        .map(|p| {
            let mut s = p.to_string_lossy().into_owned();
            if !s.is_empty() && !s.ends_with('/') {
                s.push('/');
            }
            s
        })
        .unwrap_or_default()
}

/// Parsed-model cache keyed by path, an explicit service instead of a
/// process-wide singleton so tests stay hermetic.
#[derive(Default)]
pub struct ModelCache {
    models: Mutex<FxHashMap<String, Arc<Composition>>>,
}

impl ModelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads through the cache; a second load of the same path shares
    /// the parsed composition but gets its own render tree.
    pub fn load_from_file(&self, path: &str) -> Result<Arc<Animation>> {
        if let Some(comp) = self.models.lock().get(path) {
            return Ok(Animation::from_composition(comp.clone()));
        }
        let animation = Animation::from_file(path)?;
        self.models
            .lock()
            .insert(path.to_owned(), animation.composition().clone());
        Ok(animation)
    }

    /// Loads in-memory data through the cache under an explicit key.
    pub fn load_from_data(
        &self,
        data: &str,
        cache_key: &str,
        resource_path: &str,
    ) -> Result<Arc<Animation>> {
        if let Some(comp) = self.models.lock().get(cache_key) {
            return Ok(Animation::from_composition(comp.clone()));
        }
        let animation = Animation::from_data(data, resource_path)?;
        self.models
            .lock()
            .insert(cache_key.to_owned(), animation.composition().clone());
        Ok(animation)
    }
}
