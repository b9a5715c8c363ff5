//! Worker-owned playback state for one animation.
//!
//! A player entry advances its timeline against the foreground clock,
//! promotes one prerendered frame to "current" per elapsed frame period
//! and keeps a bounded ring of future frames rendered ahead of time.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::animation::{Animation, ModelCache};
use crate::paint::Surface;

/// Minimum canvas edge.
pub const DEFAULT_SIZE: u32 = 32;
/// Prerender ring floor.
pub const DEFAULT_PRERENDERED_FRAMES: usize = 2;

const BYTES_PER_PIXEL: usize = 4;

/// One pre-rendered frame waiting in the ring.
pub struct NextFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// A frame promoted for upload.
pub struct ReadyFrame {
    pub pid: u32,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub struct PlayerEntry {
    pub pid: u32,
    canvas_width: u32,
    canvas_height: u32,
    duration_ms: u32,
    last_ms: u32,
    frame_current: u16,
    frame_total: u16,
    pub looped: bool,
    pub play: bool,
    pub render_once: bool,
    max_prerendered: usize,
    animation: Arc<Animation>,
    prerendered: VecDeque<NextFrame>,
    current_frame: Option<ReadyFrame>,
}

impl PlayerEntry {
    /// Loads the animation and derives the frame period: a positive
    /// `rate` overrides the document frame rate.
    pub fn load(
        cache: &ModelCache,
        path: &str,
        width: u32,
        height: u32,
        looped: bool,
        play: bool,
        prerendered_frames: usize,
        rate: u32,
        pid: u32,
    ) -> Option<Self> {
        if path.is_empty() {
            return None;
        }
        let animation = match cache.load_from_file(path) {
            Ok(animation) => animation,
            Err(err) => {
                log::warn!("animation load failed from <{path}>: {err}");
                return None;
            }
        };

        let frame_total = animation.total_frame().min(usize::from(u16::MAX)) as u16;
        if frame_total == 0 {
            return None;
        }
        let one_frame_ms = animation.duration() * 1000.0 / f64::from(frame_total);
        let duration_ms = if rate > 0 {
            1000 / rate
        } else {
            one_frame_ms as u32
        }
        .max(1);

        Some(Self {
            pid,
            canvas_width: width.max(DEFAULT_SIZE),
            canvas_height: height.max(DEFAULT_SIZE),
            duration_ms,
            last_ms: 0,
            frame_current: 0,
            frame_total,
            looped,
            play,
            render_once: false,
            max_prerendered: prerendered_frames.max(DEFAULT_PRERENDERED_FRAMES),
            animation,
            prerendered: VecDeque::new(),
            current_frame: None,
        })
    }

    #[must_use]
    pub fn frame_current(&self) -> u16 {
        self.frame_current
    }

    #[must_use]
    pub fn frame_total(&self) -> u16 {
        self.frame_total
    }

    #[must_use]
    pub fn prerendered_len(&self) -> usize {
        self.prerendered.len()
    }

    #[must_use]
    pub fn ring_capacity(&self) -> usize {
        self.max_prerendered.max(DEFAULT_PRERENDERED_FRAMES)
    }

    /// One worker step: promote when the frame period elapsed, then fill
    /// the next empty prerender slot. Returns whether a frame was
    /// rendered.
    pub fn advance(&mut self, cur_time_ms: u32) -> bool {
        if !(self.play || self.render_once) {
            return false;
        }
        self.render_once = false;

        if !self.looped && self.frame_current > self.frame_total {
            return false;
        }

        let frame_diff = cur_time_ms.wrapping_sub(self.last_ms) / self.duration_ms;
        if frame_diff != 0 {
            // Move the oldest prerendered frame into the current slot.
            if let Some(next) = self.prerendered.pop_front() {
                self.current_frame = Some(ReadyFrame {
                    pid: self.pid,
                    data: next.data,
                    width: next.width,
                    height: next.height,
                });
            }
            self.frame_current = self.frame_current.wrapping_add(1);
            if self.looped && self.frame_total > 0 {
                self.frame_current %= self.frame_total;
            }
            self.last_ms = self.last_ms.wrapping_add(frame_diff * self.duration_ms);
        }

        if self.prerendered.len() < self.ring_capacity() {
            let mut next_index = u32::from(self.frame_current) + self.prerendered.len() as u32;
            if self.looped {
                next_index %= u32::from(self.frame_total);
            }
            if next_index < u32::from(self.frame_total) {
                let mut frame = NextFrame {
                    data: vec![
                        0;
                        self.canvas_width as usize
                            * self.canvas_height as usize
                            * BYTES_PER_PIXEL
                    ],
                    width: self.canvas_width,
                    height: self.canvas_height,
                };
                // The long blocking part; no queue lock is held here.
                let surface = Surface::new(
                    &mut frame.data,
                    self.canvas_width,
                    self.canvas_height,
                    self.canvas_width as usize * BYTES_PER_PIXEL,
                );
                let _ = self.animation.render_sync(next_index as usize, surface, true);
                self.prerendered.push_back(frame);
                return true;
            }
        }
        false
    }

    /// Takes the promoted frame, if any.
    #[must_use]
    pub fn grab_current_frame(&mut self) -> Option<ReadyFrame> {
        self.current_frame.take()
    }
}
