//! Single-slot latest-frame mailbox.
//!
//! The frame loop publishes with a non-blocking try-replace: if a consumer
//! currently holds the slot, the new frame is dropped rather than blocking
//! ingestion.  Consumers either clone the latest frame out or hold the slot
//! while rendering.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::video::Frame;

/// Holds at most the most recent decoded frame.
#[derive(Default)]
pub struct FrameMailbox {
    slot: Mutex<Option<Arc<Frame>>>,
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the slot contents without blocking.
    ///
    /// Returns `false` when the slot is held by a consumer; the frame is
    /// dropped in that case.  A poisoned slot is treated the same as a
    /// busy one.
    pub fn try_publish(&self, frame: Arc<Frame>) -> bool {
        match self.slot.try_lock() {
            Ok(mut guard) => {
                *guard = Some(frame);
                true
            }
            Err(_) => false,
        }
    }

    /// Clones out the most recent frame, if any.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.lock().clone()
    }

    /// Locks the slot for the guard's lifetime.
    ///
    /// While the guard is held, publishes are dropped instead of blocking
    /// the frame loop.
    pub fn hold(&self) -> MutexGuard<'_, Option<Arc<Frame>>> {
        self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<Frame>>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}
