//! Registry of outstanding requests.
//!
//! Every request registers a [`CancellationToken`] before it is dispatched
//! and removes it when it settles. [`InflightRegistry::cancel_all`] drains
//! the registry in one step and fires every drained token, so each entry
//! leaves the registry exactly once: either through its guard or through
//! the bulk cancel, never both.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    entries: HashMap<u64, Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

/// Process-lifetime set of in-flight request tokens.
///
/// Cheap to clone; all clones share the same set. Construct one per
/// application and hand it to every client that should be canceled together.
#[derive(Debug, Clone, Default)]
pub struct InflightRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh token and return the guard that removes it on drop.
    pub fn register(&self) -> InflightGuard {
        let entry = Entry {
            token: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
        };

        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id = inner.next_id.wrapping_add(1);
        inner.entries.insert(id, entry.clone());
        drop(inner);

        InflightGuard {
            id,
            entry,
            registry: self.clone(),
        }
    }

    /// Cancel every outstanding request and clear the registry.
    ///
    /// Returns the number of requests that were canceled.
    pub fn cancel_all(&self, reason: &str) -> usize {
        let drained = std::mem::take(&mut self.lock().entries);
        let count = drained.len();

        for entry in drained.into_values() {
            let _ = entry.reason.set(reason.to_owned());
            entry.token.cancel();
        }

        if count > 0 {
            tracing::debug!(count, reason, "canceled in-flight requests");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn remove(&self, id: u64) {
        self.lock().entries.remove(&id);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped registration of one request.
///
/// Dropping the guard removes the token from the registry on every exit
/// path (success, error, cancellation, or the request future being dropped).
#[derive(Debug)]
pub struct InflightGuard {
    id: u64,
    entry: Entry,
    registry: InflightRegistry,
}

impl InflightGuard {
    /// Resolves once the registry cancels this request.
    pub async fn cancelled(&self) {
        self.entry.token.cancelled().await;
    }

    pub fn is_cancelled(&self) -> bool {
        self.entry.token.is_cancelled()
    }

    /// The reason passed to `cancel_all`, if any.
    pub fn reason(&self) -> String {
        self.entry
            .reason
            .get()
            .cloned()
            .unwrap_or_else(|| "canceled".into())
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
