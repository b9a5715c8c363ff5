//! The background render worker.
//!
//! A single joinable thread owns every live animation. Each loop
//! iteration drains at most one command, then advances all animations:
//! timelines move against the foreground clock, promoted frames go to
//! the ready queue, and the next missing prerender slot is rendered.
//! Dropping the worker sets the terminate flag and joins; the loop
//! checks the flag per animation, so teardown is bounded by one idle
//! sleep.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::debug;
use rustc_hash::FxHashMap;

use crate::animation::ModelCache;
use crate::pipeline::command::Command;
use crate::pipeline::player::{DEFAULT_PRERENDERED_FRAMES, PlayerEntry};
use crate::pipeline::queues::{CommandQueue, ReadyQueue};

const IDLE_SLEEP: Duration = Duration::from_millis(100);

/// State shared between the frontend and the worker thread.
#[derive(Default)]
pub struct WorkerShared {
    pub commands: CommandQueue,
    pub ready: ReadyQueue,
    pub terminate: AtomicBool,
    /// Foreground clock in milliseconds, written on every upload tick.
    pub cur_time_ms: AtomicU32,
}

pub struct Worker {
    shared: Arc<WorkerShared>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    #[must_use]
    pub fn spawn() -> Self {
        let shared = Arc::new(WorkerShared::default());
        let thread_shared = shared.clone();
        let handle = std::thread::Builder::new()
            .name("flicker-render".into())
            .spawn(move || run(&thread_shared))
            .ok();
        Self { shared, handle }
    }

    #[inline]
    #[must_use]
    pub fn shared(&self) -> &Arc<WorkerShared> {
        &self.shared
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shared.terminate.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(shared: &WorkerShared) {
    let cache = ModelCache::new();
    let mut animations: FxHashMap<u32, PlayerEntry> = FxHashMap::default();

    while !shared.terminate.load(Ordering::Acquire) {
        if let Some(command) = shared.commands.pop() {
            resolve_command(&mut animations, &cache, command);
        }

        if animations.is_empty() {
            std::thread::sleep(IDLE_SLEEP);
            continue;
        }

        let max_ready = animations.len() * 2;
        let cur_time = shared.cur_time_ms.load(Ordering::Relaxed);
        for entry in animations.values_mut() {
            // Rendering takes real time; honor teardown between frames.
            if shared.terminate.load(Ordering::Acquire) {
                return;
            }
            entry.advance(cur_time);
            if let Some(frame) = entry.grab_current_frame() {
                shared.ready.push(frame, max_ready);
            }
        }
    }
}

/// Applies one command to the worker-owned animation map.
pub fn resolve_command(
    animations: &mut FxHashMap<u32, PlayerEntry>,
    cache: &ModelCache,
    command: Command,
) {
    match command {
        Command::AddConfig {
            path,
            width,
            height,
            looped,
            rate,
            pid,
        } => {
            if let Some(entry) = PlayerEntry::load(
                cache,
                &path,
                width,
                height,
                looped,
                true,
                DEFAULT_PRERENDERED_FRAMES,
                rate,
                pid,
            ) {
                debug!("tracking animation {pid:#010x} from <{path}>");
                animations.insert(pid, entry);
            }
        }
        Command::DiscardPid(pid) => {
            debug!("discarding animation {pid:#010x}");
            animations.retain(|_, entry| entry.pid != pid);
        }
        Command::SetupPid { props_hash, pid } => {
            if let Some(mut entry) = animations.remove(&props_hash) {
                entry.pid = pid;
                animations.insert(pid, entry);
            }
        }
        Command::SetupPlay { pid, play } => {
            if let Some(entry) = animations.values_mut().find(|e| e.pid == pid) {
                entry.play = play;
            }
        }
        Command::SetupRender(pid) => {
            if let Some(entry) = animations.values_mut().find(|e| e.pid == pid) {
                entry.render_once = true;
            }
        }
    }
}
