//! Display-frame scheduling.
//!
//! The engine never sleeps or spawns. While running it asks the host for the
//! next frame and gets back a [`FrameHandle`]; the host later hands that handle
//! to [`TimerEngine::on_frame`](super::TimerEngine::on_frame). At most one
//! handle is outstanding, and every transition out of running cancels it
//! before touching state.

use std::cell::RefCell;
use std::rc::Rc;

/// Token for one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host hook for "call me back on the next display frame".
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    pending: Vec<FrameHandle>,
    cancelled: u64,
}

/// A frame scheduler backed by a shared queue.
///
/// The engine holds one clone and the host's frame loop another; the loop
/// drains due handles with [`FrameQueue::take_due`] and feeds them back to the
/// engine.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every handle that is currently requested.
    pub fn take_due(&self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.inner.borrow_mut().pending)
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// How many requests have been cancelled so far.
    pub fn cancelled(&self) -> u64 {
        self.inner.borrow().cancelled
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let handle = FrameHandle(inner.next_id);
        inner.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.pending.len();
        inner.pending.retain(|h| *h != handle);
        if inner.pending.len() != before {
            inner.cancelled += 1;
        }
    }
}
