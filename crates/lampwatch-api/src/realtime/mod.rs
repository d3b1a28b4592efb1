//! Realtime push channel with bounded fixed-delay reconnect.
//!
//! A [`ChannelManager`] owns at most one live connection to the backend's
//! `/ws/realtime` endpoint. Inbound JSON text frames are parsed into
//! [`RealtimeMessage`]s and handed to every registered listener, in
//! registration order, on the connection's own task.
//!
//! Lifecycle:
//!
//! - [`connect`](ChannelManager::connect) is a no-op while `Connecting` or
//!   `Connected`, so the reconnect timer and a caller can race it safely.
//! - A failed open, remote close, or stream error moves to `Disconnected`
//!   and schedules a reconnect after a fixed delay. The attempt counter is
//!   bumped before each reconnect and reset on a successful open; once it
//!   reaches the limit the manager gives up until `connect` is called again.
//! - [`disconnect`](ChannelManager::disconnect) closes the connection and
//!   cancels any pending reconnect without scheduling a new one.
//!
//! # Example
//!
//! ```rust,ignore
//! use lampwatch_api::realtime::{ChannelManager, ReconnectPolicy, realtime_url};
//!
//! let url = realtime_url(&api_base, "/ws/realtime")?;
//! let channel = ChannelManager::websocket(url, ReconnectPolicy::default());
//! let handle = channel.add_listener(|msg| {
//!     if let Some(score) = msg.posture_score {
//!         println!("posture {score}");
//!     }
//!     Ok(())
//! });
//! channel.connect();
//! ```

mod connector;
mod listeners;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

pub use connector::{Connection, Connector, WsConnector};
use listeners::ListenerSet;
pub use listeners::{ListenerError, ListenerHandle};

use crate::error::Error;

/// Default path of the realtime endpoint.
pub const REALTIME_PATH: &str = "/ws/realtime";

// ── RealtimeMessage ──────────────────────────────────────────────────

/// A pushed telemetry sample.
///
/// Only the fields the stores consume are modelled; everything else is
/// kept in `extra`. A frame that is valid JSON but not an object does not
/// parse and is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimeMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posture_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion_confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── ChannelState / ReconnectPolicy ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

/// Fixed-delay, bounded reconnect.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Wait between a close and the next attempt. Default: 3s.
    pub delay: Duration,
    /// Attempts per unbroken failure streak. Default: 5.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(3000),
            max_attempts: 5,
        }
    }
}

/// Derive the channel URL from an HTTP base: `wss` iff the base is
/// `https`, same host and port, `path` replacing the base path.
pub fn realtime_url(base: &Url, path: &str) -> Result<Url, Error> {
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    let host = base
        .host_str()
        .ok_or_else(|| Error::WebSocketConnect(format!("base URL has no host: {base}")))?;
    let port = base.port().map(|p| format!(":{p}")).unwrap_or_default();
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{scheme}://{host}{port}/{path}"))?)
}

// ── ChannelManager ───────────────────────────────────────────────────

struct Shared {
    url: Url,
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    listeners: ListenerSet,
    state_tx: watch::Sender<ChannelState>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Generation of the current connection; bumped on every open and on
    /// `disconnect`, so a superseded session's close is ignored.
    session: u64,
    attempts: u32,
    exhausted: bool,
    outbound: Option<mpsc::UnboundedSender<String>>,
    session_cancel: Option<CancellationToken>,
    reconnect_cancel: Option<CancellationToken>,
}

/// Handle to the realtime channel. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ChannelManager {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ChannelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelManager")
            .field("url", &self.shared.url.as_str())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ChannelManager {
    pub fn new(url: Url, connector: Arc<dyn Connector>, policy: ReconnectPolicy) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                url,
                connector,
                policy,
                listeners: ListenerSet::default(),
                state_tx,
                inner: Mutex::new(Inner::default()),
            }),
        }
    }

    /// Manager backed by a real WebSocket.
    pub fn websocket(url: Url, policy: ReconnectPolicy) -> Self {
        Self::new(url, Arc::new(WsConnector), policy)
    }

    pub fn url(&self) -> &Url {
        &self.shared.url
    }

    pub fn state(&self) -> ChannelState {
        *self.shared.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.shared.state_tx.subscribe()
    }

    /// Reconnect attempts made in the current failure streak.
    pub fn reconnect_attempts(&self) -> u32 {
        self.lock().attempts
    }

    /// `Err(ReconnectExhausted)` once the manager has given up.
    pub fn health(&self) -> Result<(), Error> {
        let inner = self.lock();
        if inner.exhausted {
            Err(Error::ReconnectExhausted {
                attempts: inner.attempts,
            })
        } else {
            Ok(())
        }
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.len()
    }

    /// Register a callback for every parsed message.
    pub fn add_listener<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&RealtimeMessage) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.shared.listeners.add(callback)
    }

    /// Open the channel unless one is already opening or open.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) {
        let mut inner = self.lock();
        if self.is_active() {
            debug!(state = %self.state(), "realtime connect ignored");
            return;
        }
        if inner.exhausted {
            inner.exhausted = false;
            inner.attempts = 0;
        }
        self.open(&mut inner);
    }

    /// Close the channel and cancel any pending reconnect.
    pub fn disconnect(&self) {
        let mut inner = self.lock();
        inner.session = inner.session.wrapping_add(1);
        inner.outbound = None;
        if let Some(token) = inner.session_cancel.take() {
            token.cancel();
        }
        if let Some(token) = inner.reconnect_cancel.take() {
            token.cancel();
        }
        self.set_state(ChannelState::Disconnected);
        info!("realtime channel disconnected");
    }

    /// Serialize and transmit `payload`; dropped unless connected.
    pub fn send(&self, payload: &impl Serialize) -> Result<(), Error> {
        let text = serde_json::to_string(payload)?;
        let inner = self.lock();
        let sender = match (self.state(), inner.outbound.as_ref()) {
            (ChannelState::Connected, Some(sender)) => sender,
            _ => {
                error!("realtime channel not connected, dropping outbound message");
                return Err(Error::ChannelNotConnected);
            }
        };
        sender.send(text).map_err(|_| {
            error!("realtime channel closed, dropping outbound message");
            Error::ChannelNotConnected
        })
    }

    // ── Internals ────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_active(&self) -> bool {
        matches!(
            self.state(),
            ChannelState::Connecting | ChannelState::Connected
        )
    }

    fn set_state(&self, state: ChannelState) {
        self.shared.state_tx.send_replace(state);
    }

    /// Start a new session. Caller holds the lock and has checked state.
    fn open(&self, inner: &mut Inner) {
        // A pending reconnect timer belongs to the previous failure.
        if let Some(token) = inner.reconnect_cancel.take() {
            token.cancel();
        }
        inner.session = inner.session.wrapping_add(1);
        let session = inner.session;
        let cancel = CancellationToken::new();
        inner.session_cancel = Some(cancel.clone());
        self.set_state(ChannelState::Connecting);

        let this = self.clone();
        tokio::spawn(async move { this.run_session(session, cancel).await });
    }

    async fn run_session(self, session: u64, cancel: CancellationToken) {
        let connecting = self.shared.connector.connect(self.shared.url.clone());
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = connecting => result,
        };

        let connection = match result {
            Ok(connection) => connection,
            Err(e) => {
                warn!(error = %e, "realtime connect failed");
                self.on_closed(session);
                return;
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        if !self.on_open(session, tx) {
            return;
        }

        let Connection {
            mut sink,
            mut stream,
        } = connection;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    let _ = sink.close().await;
                    return;
                }
                Some(text) = rx.recv() => {
                    if let Err(e) = sink.send(text).await {
                        warn!(error = %e, "realtime send failed");
                        break;
                    }
                }
                frame = stream.next() => match frame {
                    Some(Ok(text)) => self.deliver(&text),
                    Some(Err(e)) => {
                        warn!(error = %e, "realtime channel error");
                        break;
                    }
                    None => {
                        info!("realtime channel closed by peer");
                        break;
                    }
                }
            }
        }

        self.on_closed(session);
    }

    fn on_open(&self, session: u64, outbound: mpsc::UnboundedSender<String>) -> bool {
        let mut inner = self.lock();
        if inner.session != session {
            return false;
        }
        inner.attempts = 0;
        inner.exhausted = false;
        inner.outbound = Some(outbound);
        self.set_state(ChannelState::Connected);
        info!(url = %self.shared.url, "realtime channel connected");
        true
    }

    fn on_closed(&self, session: u64) {
        let mut inner = self.lock();
        if inner.session != session {
            return;
        }
        inner.outbound = None;
        inner.session_cancel = None;
        self.set_state(ChannelState::Disconnected);
        self.schedule_reconnect(&mut inner);
    }

    fn schedule_reconnect(&self, inner: &mut Inner) {
        let max = self.shared.policy.max_attempts;
        if inner.attempts >= max {
            inner.exhausted = true;
            error!(
                attempts = inner.attempts,
                "realtime reconnect limit reached, giving up"
            );
            return;
        }

        inner.attempts += 1;
        let attempt = inner.attempts;
        let delay = self.shared.policy.delay;
        info!(attempt, max, delay_ms = delay.as_millis(), "scheduling realtime reconnect");

        let token = CancellationToken::new();
        inner.reconnect_cancel = Some(token.clone());

        let this = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => this.reconnect_now(),
            }
        });
    }

    fn reconnect_now(&self) {
        let mut inner = self.lock();
        inner.reconnect_cancel = None;
        if self.is_active() {
            return;
        }
        self.open(&mut inner);
    }

    fn deliver(&self, text: &str) {
        match serde_json::from_str::<RealtimeMessage>(text) {
            Ok(message) => self.shared.listeners.dispatch(&message),
            Err(e) => warn!(error = %e, "dropping malformed realtime message"),
        }
    }
}
