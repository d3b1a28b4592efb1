#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Session wiring: realtime into the stores, shared cancellation, shutdown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::SinkExt;
use futures::channel::mpsc;
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lampwatch_api::Error;
use lampwatch_api::realtime::{ChannelState, Connection, Connector};
use lampwatch_core::{ClientConfig, CoreError, PollTask, Session};

// ── Helpers ─────────────────────────────────────────────────────────

/// Accepts every connection and keeps the push end of the newest one.
#[derive(Clone, Default)]
struct LoopbackConnector {
    push: Arc<Mutex<Option<mpsc::UnboundedSender<Result<String, Error>>>>>,
    urls: Arc<Mutex<Vec<Url>>>,
}

impl LoopbackConnector {
    fn push(&self, value: &serde_json::Value) {
        self.push
            .lock()
            .unwrap()
            .as_ref()
            .unwrap()
            .unbounded_send(Ok(value.to_string()))
            .unwrap();
    }
}

impl Connector for LoopbackConnector {
    fn connect(&self, url: Url) -> BoxFuture<'static, Result<Connection, Error>> {
        self.urls.lock().unwrap().push(url);
        let (push, inbound) = mpsc::unbounded();
        let (outbound, _received) = mpsc::unbounded::<String>();
        *self.push.lock().unwrap() = Some(push);

        let sink = outbound.sink_map_err(|e| Error::WebSocketClosed(e.to_string()));
        Box::pin(async move { Ok(Connection::new(sink, inbound)) })
    }
}

fn config(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::new(Url::parse(&format!("{}/api", server.uri())).unwrap());
    config.timeout = Duration::from_secs(5);
    config
}

async fn wait_state(session: &Session, state: ChannelState) {
    let mut rx = session.channel().unwrap().subscribe_state();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == state))
        .await
        .unwrap()
        .unwrap();
}

// ── Realtime ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_realtime_push_reaches_monitor_store() {
    let server = MockServer::start().await;
    let connector = LoopbackConnector::default();
    let session = Session::with_connector(config(&server), Arc::new(connector.clone())).unwrap();

    session.connect_realtime();
    wait_state(&session, ChannelState::Connected).await;

    let url = connector.urls.lock().unwrap()[0].clone();
    assert_eq!(url.scheme(), "ws");
    assert_eq!(url.path(), "/ws/realtime");

    let mut posture = session.monitor().subscribe_posture();
    connector.push(&json!({ "posture_score": 72, "emotion": "happy" }));

    tokio::time::timeout(
        Duration::from_secs(5),
        posture.wait_for(|p| p.value.current_score == Some(72.0)),
    )
    .await
    .unwrap()
    .unwrap();

    let emotion = session.monitor().emotion().value;
    assert_eq!(emotion.current_emotion.as_deref(), Some("happy"));
    assert_eq!(emotion.confidence, Some(0.8));
    assert!(!session.monitor().posture().loading);
}

#[tokio::test]
async fn test_realtime_can_be_disabled() {
    let server = MockServer::start().await;
    let mut config = config(&server);
    config.realtime.enabled = false;

    let session = Session::new(config).unwrap();
    session.connect_realtime();

    assert!(session.channel().is_none());
}

#[tokio::test]
async fn test_shutdown_closes_channel_and_timers() {
    let server = MockServer::start().await;
    let mut config = config(&server);
    config.dashboard_url = Some(Url::parse(&server.uri()).unwrap());
    let session = Session::with_connector(config, Arc::new(LoopbackConnector::default())).unwrap();

    session.connect_realtime();
    wait_state(&session, ChannelState::Connected).await;
    let dashboard = session.dashboard().unwrap();
    dashboard.start(PollTask::Chart);
    assert!(dashboard.is_active(PollTask::Chart));

    session.shutdown();

    wait_state(&session, ChannelState::Disconnected).await;
    assert!(dashboard.active().is_empty());
    assert_eq!(session.channel().unwrap().listener_count(), 0);
}

// ── Dashboard ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboard_requires_configuration() {
    let server = MockServer::start().await;
    let session = Session::new(config(&server)).unwrap();

    assert!(matches!(
        session.dashboard(),
        Err(CoreError::DashboardNotConfigured)
    ));
}

// ── Requests ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancel_pending_spans_both_servers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/device/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/get_pose_status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let mut config = config(&server);
    config.realtime.enabled = false;
    config.dashboard_url = Some(Url::parse(&server.uri()).unwrap());
    let session = Session::new(config).unwrap();

    let device = Arc::clone(session.device());
    let fetch = tokio::spawn(async move { device.fetch_status().await });
    let dashboard = session.dashboard().unwrap().clone();
    let poll = tokio::spawn(async move { dashboard.refresh_status().await });

    let inflight = session.api().inflight().clone();
    tokio::time::timeout(Duration::from_secs(5), async {
        while inflight.len() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(session.cancel_pending("navigation"), 2);
    fetch.await.unwrap();
    poll.await.unwrap();

    let status = session.device().status();
    assert_eq!(status.error, None);
    assert!(!status.loading);
    assert!(!status.value.online);
    assert_eq!(session.dashboard().unwrap().status().get().text, "已停止");
    assert_eq!(session.cancel_pending("again"), 0);
}

#[tokio::test]
async fn test_refresh_all_falls_back_when_server_is_down() {
    let server = MockServer::start().await;
    let mut config = config(&server);
    config.realtime.enabled = false;
    let session = Session::new(config).unwrap();

    // No mocks mounted: every route answers 404.
    session.refresh_all().await;

    assert!(session.device().is_online());
    assert_eq!(session.device().settings().value.brightness, 70);
    assert_eq!(session.monitor().posture().value.current_score, Some(85.0));
    assert_eq!(session.monitor().eye().value.eye_distance, Some(45.0));
    assert_eq!(session.monitor().emotion_label(), "开心");
    assert!(session.monitor().posture().error.is_some());
}
