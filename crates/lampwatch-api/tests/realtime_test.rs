#![allow(clippy::unwrap_used)]
// Tests for `ChannelManager` over an in-memory connector.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::SinkExt;
use futures::channel::mpsc;
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;

use lampwatch_api::Error;
use lampwatch_api::realtime::{
    ChannelManager, ChannelState, Connection, Connector, ListenerHandle, ReconnectPolicy,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Server end of one in-memory connection.
struct ServerSide {
    push: mpsc::UnboundedSender<Result<String, Error>>,
    received: mpsc::UnboundedReceiver<String>,
}

#[derive(Clone)]
struct MockConnector {
    accept: bool,
    calls: Arc<AtomicUsize>,
    servers: Arc<Mutex<Vec<ServerSide>>>,
}

impl MockConnector {
    fn accepting() -> Self {
        Self {
            accept: true,
            calls: Arc::default(),
            servers: Arc::default(),
        }
    }

    fn refusing() -> Self {
        Self {
            accept: false,
            ..Self::accepting()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, text: &str) {
        let servers = self.servers.lock().unwrap();
        servers
            .last()
            .unwrap()
            .push
            .unbounded_send(Ok(text.to_owned()))
            .unwrap();
    }

    /// Drop the server end of the newest connection (remote close).
    fn close_latest(&self) {
        self.servers.lock().unwrap().pop();
    }
}

impl Connector for MockConnector {
    fn connect(&self, _url: Url) -> BoxFuture<'static, Result<Connection, Error>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.accept {
            return Box::pin(async { Err(Error::WebSocketConnect("connection refused".into())) });
        }

        let (push, inbound) = mpsc::unbounded();
        let (outbound, received) = mpsc::unbounded::<String>();
        self.servers
            .lock()
            .unwrap()
            .push(ServerSide { push, received });

        let sink = outbound.sink_map_err(|e| Error::WebSocketClosed(e.to_string()));
        Box::pin(async move { Ok(Connection::new(sink, inbound)) })
    }
}

fn manager(connector: &MockConnector) -> ChannelManager {
    ChannelManager::new(
        Url::parse("ws://lamp.local:5000/ws/realtime").unwrap(),
        Arc::new(connector.clone()),
        ReconnectPolicy::default(),
    )
}

async fn wait_for(channel: &ChannelManager, state: ChannelState) {
    let mut rx = channel.subscribe_state();
    tokio::time::timeout(Duration::from_secs(30), rx.wait_for(|s| *s == state))
        .await
        .unwrap()
        .unwrap();
}

/// Let spawned tasks drain their ready work.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// ── Connection lifecycle ────────────────────────────────────────────

#[tokio::test]
async fn test_connect_twice_creates_one_connection() {
    let connector = MockConnector::accepting();
    let channel = manager(&connector);

    channel.connect();
    assert_eq!(channel.state(), ChannelState::Connecting);
    channel.connect();

    wait_for(&channel, ChannelState::Connected).await;
    channel.connect();
    settle().await;

    assert_eq!(connector.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_gives_up_after_five_attempts() {
    let connector = MockConnector::refusing();
    let channel = manager(&connector);

    channel.connect();
    tokio::time::sleep(Duration::from_secs(120)).await;

    // One initial open plus five reconnects.
    assert_eq!(connector.calls(), 6);
    assert_eq!(channel.state(), ChannelState::Disconnected);
    assert!(matches!(
        channel.health(),
        Err(Error::ReconnectExhausted { attempts: 5 })
    ));

    // Nothing further happens on its own.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(connector.calls(), 6);

    // An external connect starts a fresh streak.
    channel.connect();
    settle().await;
    assert_eq!(connector.calls(), 7);
    assert!(channel.health().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_remote_close_reconnects_and_resets_counter() {
    let connector = MockConnector::accepting();
    let channel = manager(&connector);

    channel.connect();
    wait_for(&channel, ChannelState::Connected).await;

    connector.close_latest();
    wait_for(&channel, ChannelState::Disconnected).await;
    assert_eq!(channel.reconnect_attempts(), 1);

    wait_for(&channel, ChannelState::Connected).await;
    assert_eq!(connector.calls(), 2);
    assert_eq!(channel.reconnect_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_cancels_pending_reconnect() {
    let connector = MockConnector::refusing();
    let channel = manager(&connector);

    channel.connect();
    settle().await;
    assert_eq!(connector.calls(), 1);
    assert_eq!(channel.reconnect_attempts(), 1);

    channel.disconnect();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(connector.calls(), 1);
    assert_eq!(channel.state(), ChannelState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_manual_connect_supersedes_pending_reconnect() {
    let connector = MockConnector::refusing();
    let channel = manager(&connector);

    channel.connect();
    settle().await;
    assert_eq!(connector.calls(), 1);

    // The first retry is due at 3.0s; connect by hand just before it.
    tokio::time::sleep(Duration::from_millis(2900)).await;
    channel.connect();
    settle().await;
    assert_eq!(connector.calls(), 2);

    // The old timer must not fire; the next retry is due at 5.9s.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(connector.calls(), 2);

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert_eq!(connector.calls(), 3);
}

#[tokio::test]
async fn test_explicit_disconnect_does_not_reconnect() {
    let connector = MockConnector::accepting();
    let channel = ChannelManager::new(
        Url::parse("ws://lamp.local/ws/realtime").unwrap(),
        Arc::new(connector.clone()),
        ReconnectPolicy {
            delay: Duration::from_millis(10),
            max_attempts: 5,
        },
    );

    channel.connect();
    wait_for(&channel, ChannelState::Connected).await;
    channel.disconnect();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(connector.calls(), 1);
    assert_eq!(channel.state(), ChannelState::Disconnected);
}

// ── Messages ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_malformed_frames_are_dropped_and_connection_kept() {
    let connector = MockConnector::accepting();
    let channel = manager(&connector);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _handle = channel.add_listener(move |msg| {
        tx.send(msg.posture_score)?;
        Ok(())
    });

    channel.connect();
    wait_for(&channel, ChannelState::Connected).await;

    connector.push("{not json");
    connector.push("[1, 2, 3]");
    connector.push(r#"{"posture_score": 72}"#);

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, Some(72.0));
    assert!(rx.try_recv().is_err());
    assert_eq!(channel.state(), ChannelState::Connected);
}

#[tokio::test]
async fn test_unregister_during_dispatch_skips_nobody() {
    let connector = MockConnector::accepting();
    let channel = manager(&connector);
    let seen = Arc::new(Mutex::new(Vec::<(&str, u32)>::new()));
    let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();

    let record = |name: &'static str| {
        let seen = Arc::clone(&seen);
        move |msg: &lampwatch_api::realtime::RealtimeMessage| {
            let n = msg.extra["n"].as_u64().unwrap();
            seen.lock().unwrap().push((name, u32::try_from(n).unwrap()));
        }
    };

    let a_slot: Arc<Mutex<Option<ListenerHandle>>> = Arc::default();
    let b_slot: Arc<Mutex<Option<ListenerHandle>>> = Arc::default();

    let rec_a = record("a");
    let a = channel.add_listener(move |msg| {
        rec_a(msg);
        Ok(())
    });

    // B removes itself and A on the first message.
    let rec_b = record("b");
    let (a_ref, b_ref) = (Arc::clone(&a_slot), Arc::clone(&b_slot));
    let b = channel.add_listener(move |msg| {
        rec_b(msg);
        if let Some(h) = a_ref.lock().unwrap().as_ref() {
            h.unregister();
        }
        if let Some(h) = b_ref.lock().unwrap().as_ref() {
            h.unregister();
        }
        Ok(())
    });

    let rec_c = record("c");
    let _c = channel.add_listener(move |msg| {
        rec_c(msg);
        done_tx.send(())?;
        Ok(())
    });

    *a_slot.lock().unwrap() = Some(a);
    *b_slot.lock().unwrap() = Some(b);

    channel.connect();
    wait_for(&channel, ChannelState::Connected).await;

    connector.push(&json!({ "n": 1 }).to_string());
    done_rx.recv().await.unwrap();
    connector.push(&json!({ "n": 2 }).to_string());
    done_rx.recv().await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![("a", 1), ("b", 1), ("c", 1), ("c", 2)]
    );
    assert_eq!(channel.listener_count(), 1);
}

#[tokio::test]
async fn test_send_requires_connection() {
    let connector = MockConnector::accepting();
    let channel = manager(&connector);

    let err = channel.send(&json!({ "type": "ping" })).unwrap_err();
    assert!(matches!(err, Error::ChannelNotConnected));

    channel.connect();
    wait_for(&channel, ChannelState::Connected).await;
    channel.send(&json!({ "type": "ping" })).unwrap();

    let mut server = connector.servers.lock().unwrap().pop().unwrap();
    let frame = tokio::time::timeout(Duration::from_secs(5), async {
        use futures::StreamExt;
        server.received.next().await
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(frame, r#"{"type":"ping"}"#);
}
