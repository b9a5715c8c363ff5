//! Frontend registry.
//!
//! Maps animation configurations to stable picture ids and caches the
//! host texture handle per id. The registry talks to the worker only
//! through the command queue; the worker never touches the descriptor
//! map.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::pipeline::command::{Command, props_hash};
use crate::pipeline::player::DEFAULT_SIZE;
use crate::pipeline::upload::{TextureHandle, TextureUploader};
use crate::pipeline::worker::Worker;

/// Sentinel for "no animation".
pub const BAD_PICTURE_ID: u32 = u32::MAX;

/// Descriptor of one registered animation.
#[derive(Debug, Clone)]
pub struct AnimDesc {
    pub width: u32,
    pub height: u32,
    pub texture: Option<TextureHandle>,
    pub pid: u32,
}

/// The animation renderer frontend: owns the worker and the descriptor
/// registry.
pub struct LottieRenderer {
    worker: Worker,
    descriptors: Mutex<FxHashMap<u32, AnimDesc>>,
}

impl Default for LottieRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl LottieRenderer {
    /// Spawns the render worker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            worker: Worker::spawn(),
            descriptors: Mutex::new(FxHashMap::default()),
        }
    }

    /// Registers (or finds) the animation for this configuration and
    /// returns its stable pid. Registering enqueues the load; a repeat
    /// call with equal arguments is a lookup only.
    #[must_use]
    pub fn match_animation(
        &self,
        path: &str,
        width: u32,
        height: u32,
        looped: bool,
        rate: u32,
    ) -> u32 {
        if path.is_empty() {
            return BAD_PICTURE_ID;
        }

        let mut descriptors = self.descriptors.lock();
        let pid = props_hash(path, width, height, looped, rate);
        if descriptors.contains_key(&pid) {
            return pid;
        }

        let width = width.max(DEFAULT_SIZE);
        let height = height.max(DEFAULT_SIZE);
        descriptors.insert(
            pid,
            AnimDesc {
                width,
                height,
                texture: None,
                pid,
            },
        );
        self.worker.shared().commands.push(Command::AddConfig {
            path: path.to_owned(),
            width,
            height,
            looped,
            rate,
            pid,
        });
        pid
    }

    /// Requests at least one more frame for the animation.
    pub fn render(&self, pid: u32) {
        self.worker.shared().commands.push(Command::SetupRender(pid));
    }

    /// Enables or disables continuous playback.
    pub fn play(&self, pid: u32, play: bool) {
        self.worker
            .shared()
            .commands
            .push(Command::SetupPlay { pid, play });
    }

    /// Forgets the animation: descriptor now, worker state on its next
    /// command resolution.
    pub fn discard(&self, pid: u32) {
        self.worker.shared().commands.push(Command::DiscardPid(pid));
        self.descriptors.lock().remove(&pid);
    }

    /// The host texture handle for the animation, when one was
    /// published.
    #[must_use]
    pub fn image(&self, pid: u32) -> Option<TextureHandle> {
        self.descriptors.lock().get(&pid).and_then(|d| d.texture)
    }

    /// Foreground tick: drains the ready queue into host textures,
    /// publishes new handles into the descriptors and refreshes the
    /// worker's clock.
    pub fn upload_ready_frames(&self, uploader: &mut dyn TextureUploader, cur_time_ms: u32) {
        while let Some(frame) = self.worker.shared().ready.pop() {
            let mut descriptors = self.descriptors.lock();
            let Some(desc) = descriptors.get_mut(&frame.pid) else {
                continue;
            };
            match desc.texture {
                None => {
                    desc.texture =
                        Some(uploader.create(frame.pid, frame.width, frame.height, &frame.data));
                }
                Some(handle) => {
                    uploader.update(handle, frame.width, frame.height, &frame.data);
                }
            }
        }
        self.worker
            .shared()
            .cur_time_ms
            .store(cur_time_ms, std::sync::atomic::Ordering::Relaxed);
    }

    /// Observability for tests and diagnostics.
    #[must_use]
    pub fn dropped_commands(&self) -> usize {
        self.worker.shared().commands.dropped()
    }

    #[must_use]
    pub fn dropped_frames(&self) -> usize {
        self.worker.shared().ready.dropped()
    }

    #[must_use]
    pub fn descriptor(&self, pid: u32) -> Option<AnimDesc> {
        self.descriptors.lock().get(&pid).cloned()
    }
}
