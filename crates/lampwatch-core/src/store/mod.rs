// ── Observable client-side stores ──
//
// Each store caches the last known value of a few resource domains. Every
// domain lives in its own `watch` channel together with a loading flag and
// an error message, so a UI can render "value / spinner / banner" from a
// single subscription.
//
// Fetch discipline, shared by every store:
//   loading = true, error cleared, facade called;
//   Ok        -> value replaced;
//   Canceled  -> nothing changes (navigation, not failure);
//   other Err -> fallback value (where one exists) + error message;
//   loading = false on every exit path, held by `LoadingGuard`.

mod device;
pub mod fallback;
mod lamp;
mod monitor;
mod user;

use lampwatch_api::{Error, ErrorKind};
use tokio::sync::watch;
use tracing::debug;

pub use device::DeviceStore;
pub use lamp::{LampStore, Reminder};
pub use monitor::{MonitorStore, emotion_label, formatted_screen_time, posture_status};
pub use user::UserStore;

// ── Resource ─────────────────────────────────────────────────────────

/// Cached value of one domain plus its fetch bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource<T> {
    pub value: T,
    pub loading: bool,
    pub error: Option<String>,
}

// ── Slot ─────────────────────────────────────────────────────────────

/// One observable `Resource`.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    tx: watch::Sender<Resource<T>>,
}

impl<T: Clone> Slot<T> {
    pub(crate) fn new(value: T) -> Self {
        let (tx, _) = watch::channel(Resource {
            value,
            loading: false,
            error: None,
        });
        Self { tx }
    }

    pub(crate) fn get(&self) -> Resource<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn value(&self) -> T {
        self.tx.borrow().value.clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Resource<T>> {
        self.tx.subscribe()
    }

    /// Raise the loading flag and clear the error until the guard drops.
    pub(crate) fn begin(&self) -> LoadingGuard<'_, T> {
        self.tx.send_modify(|r| {
            r.loading = true;
            r.error = None;
        });
        LoadingGuard { slot: self }
    }

    pub(crate) fn replace(&self, value: T) {
        self.tx.send_modify(|r| r.value = value);
    }

    /// Install a synthetic value and record why.
    pub(crate) fn fall_back(&self, value: T, message: &str) {
        self.tx.send_modify(|r| {
            r.value = value;
            r.error = Some(message.to_owned());
        });
    }

    pub(crate) fn fail(&self, message: &str) {
        self.tx.send_modify(|r| r.error = Some(message.to_owned()));
    }

    /// Mutate the value in place; loading and error are left alone.
    pub(crate) fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(|r| f(&mut r.value));
    }
}

/// Clears the loading flag of its slot on drop.
pub(crate) struct LoadingGuard<'a, T> {
    slot: &'a Slot<T>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.slot.tx.send_modify(|r| r.loading = false);
    }
}

// ── Outcome ──────────────────────────────────────────────────────────

/// A facade result as the stores see it.
#[derive(Debug)]
pub(crate) enum Outcome<T> {
    Fresh(T),
    Failed,
    Canceled,
}

/// Classify a facade result.
///
/// The transport has already logged the failure at its own level, so
/// the store only traces which fetch it belonged to.
pub(crate) fn outcome<T>(result: Result<T, Error>, what: &str) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Fresh(value),
        Err(e) if e.kind() == ErrorKind::Canceled => {
            debug!(what, "fetch canceled, keeping cached value");
            Outcome::Canceled
        }
        Err(e) => {
            debug!(what, error = %e, "fetch failed");
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_loading_on_drop() {
        let slot = Slot::new(0_u32);
        slot.fail("stale");
        {
            let _guard = slot.begin();
            let r = slot.get();
            assert!(r.loading);
            assert_eq!(r.error, None);
        }
        assert!(!slot.get().loading);
    }

    #[test]
    fn update_leaves_bookkeeping_alone() {
        let slot = Slot::new(1_u32);
        slot.fail("boom");
        slot.update(|v| *v += 1);
        let r = slot.get();
        assert_eq!(r.value, 2);
        assert_eq!(r.error.as_deref(), Some("boom"));
    }

    #[test]
    fn canceled_is_not_a_failure() {
        let canceled: Result<(), Error> = Err(Error::Canceled {
            reason: "route-change".into(),
        });
        assert!(matches!(outcome(canceled, "x"), Outcome::Canceled));

        let broken: Result<(), Error> = Err(Error::ChannelNotConnected);
        assert!(matches!(outcome(broken, "x"), Outcome::Failed));
    }
}
