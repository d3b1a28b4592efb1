// Ordered listener registry for realtime messages.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::error;

use super::RealtimeMessage;

/// Error a listener may return; it is logged and delivery continues.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type Callback = Arc<dyn Fn(&RealtimeMessage) -> Result<(), ListenerError> + Send + Sync>;

type Registrations = Mutex<Vec<(u64, Callback)>>;

/// Registration-ordered set of message callbacks.
///
/// Dispatch iterates a snapshot taken when the message arrives, so a
/// callback may register or unregister listeners (itself included) without
/// any listener present at that moment being skipped or invoked twice.
/// Changes take effect from the next message.
#[derive(Clone, Default)]
pub(crate) struct ListenerSet {
    entries: Arc<Registrations>,
    next_id: Arc<AtomicU64>,
}

impl ListenerSet {
    pub(crate) fn add<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&RealtimeMessage) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push((id, Arc::new(callback)));
        ListenerHandle {
            id,
            entries: Arc::downgrade(&self.entries),
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Invoke every listener in registration order.
    pub(crate) fn dispatch(&self, message: &RealtimeMessage) {
        let snapshot: Vec<(u64, Callback)> = lock(&self.entries).clone();

        for (id, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback(message))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(listener = id, error = %e, "realtime listener failed"),
                Err(_) => error!(listener = id, "realtime listener panicked"),
            }
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.len())
            .finish()
    }
}

/// Capability to remove exactly one listener.
///
/// Dropping the handle does not unregister; call [`unregister`](Self::unregister).
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    id: u64,
    entries: Weak<Registrations>,
}

impl ListenerHandle {
    /// Remove the listener. Returns `false` if it was already gone.
    ///
    /// Idempotent, and safe to call from inside a listener.
    pub fn unregister(&self) -> bool {
        let Some(entries) = self.entries.upgrade() else {
            return false;
        };
        let mut entries = lock(&entries);
        let before = entries.len();
        entries.retain(|(id, _)| *id != self.id);
        entries.len() != before
    }
}

fn lock(entries: &Registrations) -> MutexGuard<'_, Vec<(u64, Callback)>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
