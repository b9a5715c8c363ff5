//! Asynchronous animation pipeline: a background worker pre-renders
//! frames into bounded per-animation rings and hands promoted frames to
//! the foreground through a bounded ready queue.

pub mod command;
pub mod player;
pub mod queues;
pub mod registry;
pub mod upload;
pub mod worker;

pub use command::{Command, props_hash};
pub use player::{NextFrame, PlayerEntry, ReadyFrame};
pub use queues::{CommandQueue, ReadyQueue};
pub use registry::{AnimDesc, BAD_PICTURE_ID, LottieRenderer};
pub use upload::{TextureHandle, TextureUploader};
pub use worker::{Worker, WorkerShared};
