//! Bounded pipeline queues.
//!
//! Both queues drop under pressure rather than block: the command queue
//! drops new entries past its limit, the ready queue drops its oldest
//! frames past the live-animation budget. Drops are counted so tests
//! (and diagnostics) can observe them.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::pipeline::command::Command;
use crate::pipeline::player::ReadyFrame;

/// Pending commands beyond this are dropped.
pub const COMMAND_QUEUE_LIMIT: usize = 100;

#[derive(Default)]
pub struct CommandQueue {
    inner: Mutex<VecDeque<Command>>,
    dropped: AtomicUsize,
}

impl CommandQueue {
    /// Enqueues unless the queue is flooded; floods drop silently but
    /// are counted.
    pub fn push(&self, command: Command) {
        let mut queue = self.inner.lock();
        if queue.len() > COMMAND_QUEUE_LIMIT {
            drop(queue);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        queue.push_back(command);
    }

    /// Takes one command; the lock is held only for the move.
    #[must_use]
    pub fn pop(&self) -> Option<Command> {
        self.inner.lock().pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
pub struct ReadyQueue {
    inner: Mutex<VecDeque<ReadyFrame>>,
    dropped: AtomicUsize,
}

impl ReadyQueue {
    /// Pushes a promoted frame, evicting the oldest beyond `max_len`.
    pub fn push(&self, frame: ReadyFrame, max_len: usize) {
        let mut evicted = 0;
        {
            let mut queue = self.inner.lock();
            queue.push_back(frame);
            while queue.len() > max_len.max(1) {
                queue.pop_front();
                evicted += 1;
            }
        }
        if evicted > 0 {
            self.dropped.fetch_add(evicted, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn pop(&self) -> Option<ReadyFrame> {
        self.inner.lock().pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pid: u32) -> ReadyFrame {
        ReadyFrame {
            pid,
            data: Vec::new(),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn command_flood_drops_and_counts() {
        let q = CommandQueue::default();
        for _ in 0..(COMMAND_QUEUE_LIMIT + 10) {
            q.push(Command::SetupRender(1));
        }
        assert!(q.len() <= COMMAND_QUEUE_LIMIT + 1);
        assert!(q.dropped() > 0);
    }

    #[test]
    fn ready_queue_evicts_oldest() {
        let q = ReadyQueue::default();
        q.push(frame(1), 2);
        q.push(frame(2), 2);
        q.push(frame(3), 2);
        assert_eq!(q.len(), 2);
        assert_eq!(q.dropped(), 1);
        // Oldest frame went away; promotion order is preserved.
        assert_eq!(q.pop().unwrap().pid, 2);
        assert_eq!(q.pop().unwrap().pid, 3);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let q = ReadyQueue::default();
        assert!(q.pop().is_none());
    }
}
