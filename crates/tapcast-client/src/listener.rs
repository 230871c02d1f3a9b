//! Ordered listener registry for session events.
//!
//! Listeners subscribe per event kind and are invoked synchronously on the
//! dispatching task, in registration order.  A listener that blocks stalls
//! the frame loop; callbacks are expected to be short.

use std::sync::{Arc, Mutex};

use crate::video::Frame;

/// The three event kinds a session emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Streaming has started; the connection is established.
    Init,
    /// A frame tick: either a decoded frame or an empty heartbeat.
    Frame,
    /// The stream ended for any reason.
    Disconnect,
}

/// A session event delivered to listeners.
#[derive(Clone)]
pub enum SessionEvent {
    /// Streaming has started.
    Init,
    /// `Some` for a decoded frame, `None` for a heartbeat tick.
    Frame(Option<Arc<Frame>>),
    /// The stream ended.
    Disconnect,
}

impl SessionEvent {
    /// The kind this event dispatches under.
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::Init => EventKind::Init,
            SessionEvent::Frame(_) => EventKind::Frame,
            SessionEvent::Disconnect => EventKind::Disconnect,
        }
    }
}

/// Opaque handle returned by [`ListenerRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(u64);

type Callback = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct Inner {
    next_handle: u64,
    init: Vec<(ListenerHandle, Callback)>,
    frame: Vec<(ListenerHandle, Callback)>,
    disconnect: Vec<(ListenerHandle, Callback)>,
}

impl Inner {
    fn entries_mut(&mut self, kind: EventKind) -> &mut Vec<(ListenerHandle, Callback)> {
        match kind {
            EventKind::Init => &mut self.init,
            EventKind::Frame => &mut self.frame,
            EventKind::Disconnect => &mut self.disconnect,
        }
    }
}

/// Registry of per-kind listeners, dispatched in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    inner: Mutex<Inner>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for events of `kind`.
    ///
    /// The same callback may be registered for several kinds; each
    /// registration gets its own handle.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> ListenerHandle
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        inner.next_handle += 1;
        let handle = ListenerHandle(inner.next_handle);
        inner.entries_mut(kind).push((handle, Arc::new(callback)));
        handle
    }

    /// Removes the registration identified by `handle`.
    ///
    /// Returns `false` when the handle is unknown for `kind`; removing
    /// twice is harmless.
    pub fn unsubscribe(&self, kind: EventKind, handle: ListenerHandle) -> bool {
        let mut inner = self.lock();
        let entries = inner.entries_mut(kind);
        let before = entries.len();
        entries.retain(|(h, _)| *h != handle);
        entries.len() != before
    }

    /// Invokes every listener registered for the event's kind, in
    /// registration order, on the calling task.
    pub fn dispatch(&self, event: &SessionEvent) {
        // Snapshot under the lock, invoke outside it, so a callback may
        // subscribe or unsubscribe without deadlocking.
        let callbacks: Vec<Callback> = {
            let mut inner = self.lock();
            inner
                .entries_mut(event.kind())
                .iter()
                .map(|(_, cb)| Arc::clone(cb))
                .collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of listeners registered for `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.lock().entries_mut(kind).len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
