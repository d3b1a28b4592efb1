#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Store behaviour against a mocked lamp API.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lampwatch_api::realtime::RealtimeMessage;
use lampwatch_api::{ApiClient, InflightRegistry, TransportConfig};
use lampwatch_core::store::fallback;
use lampwatch_api::models::{NotificationSettings, QuietHours};
use lampwatch_core::{
    DeviceSettingsPatch, DeviceStore, LampStore, MonitorStore, Reminder, TimeRange, UserStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::new(
        Url::parse(&format!("{}/api", server.uri())).unwrap(),
        &TransportConfig::default().with_timeout(Duration::from_secs(5)),
        InflightRegistry::new(),
    )
    .unwrap();
    (server, client)
}

/// Log sink shared with a scoped subscriber.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

async fn mount_error(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

// ── Device ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_device_status_failure_installs_fallback() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/device/status").await;
    let store = DeviceStore::new(api);

    let before = Utc::now();
    store.fetch_status().await;

    let status = store.status();
    assert!(status.value.online);
    assert_eq!(status.value.battery_level, Some(85));
    assert!(status.value.charging);
    assert!(status.value.last_seen.unwrap() >= before);
    assert_eq!(status.error.as_deref(), Some("获取设备状态失败，使用模拟数据"));
    assert!(!status.loading);
    assert!(store.is_online());
    assert_eq!(store.battery_percentage(), Some(85));
}

#[tokio::test]
async fn test_device_status_success_replaces_value_and_clears_error() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/device/status"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/device/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "online": false,
            "batteryLevel": 12,
            "charging": false,
            "lastSeen": "2025-05-01T08:00:00"
        })))
        .mount(&server)
        .await;
    let store = DeviceStore::new(api);

    store.fetch_status().await;
    assert!(store.status().error.is_some());

    store.fetch_status().await;
    let status = store.status();
    assert_eq!(status.error, None);
    assert!(!status.value.online);
    assert_eq!(status.value.battery_level, Some(12));
}

#[tokio::test]
async fn test_device_info_failure_has_no_fallback() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/device-info").await;
    let store = DeviceStore::new(api);

    assert_eq!(store.fetch_info().await, None);
    assert_eq!(store.info().error.as_deref(), Some(fallback::DEVICE_INFO_ERROR));
}

#[tokio::test]
async fn test_settings_fallback_values() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/device/settings").await;
    let store = DeviceStore::new(api);

    let settings = store.fetch_settings().await;
    assert_eq!(settings.brightness, 70);
    assert_eq!(settings.color_temperature, 5500);
    assert!(settings.auto_adjust);
}

#[tokio::test]
async fn test_update_settings_merges_after_server_accepts() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/device/settings"))
        .and(body_json(json!({ "brightness": 30 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    let store = DeviceStore::new(api);

    let patch = DeviceSettingsPatch {
        brightness: Some(30),
        ..DeviceSettingsPatch::default()
    };
    let settings = store.update_settings(&patch).await;

    assert_eq!(settings.brightness, 30);
    assert_eq!(settings.color_temperature, 4000);
    assert_eq!(store.settings().error, None);
}

#[tokio::test]
async fn test_update_settings_failure_leaves_local_state() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/device/settings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let store = DeviceStore::new(api);

    let patch = DeviceSettingsPatch {
        brightness: Some(5),
        ..DeviceSettingsPatch::default()
    };
    let settings = store.update_settings(&patch).await;

    assert_eq!(settings.brightness, 50);
    assert_eq!(store.settings().error.as_deref(), Some("更新设备设置失败"));
    assert!(!store.settings().loading);
}

#[tokio::test]
async fn test_canceled_fetch_keeps_value_and_records_nothing() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/device/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let registry = api.inflight().clone();
    let store = Arc::new(DeviceStore::new(api));

    let task = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.fetch_status().await }
    });
    while registry.is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(store.status().loading);

    assert_eq!(registry.cancel_all("route-change"), 1);
    let value = task.await.unwrap();

    let status = store.status();
    assert!(!value.online);
    assert_eq!(status.value, value);
    assert_eq!(status.error, None);
    assert!(!status.loading);
}

// ── Monitor ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_history_is_read_through() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/monitor/posture/history"))
        .and(query_param("timeRange", "week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "goodTime": 20.1,
            "mildTime": "6.0",
            "badTime": "3.9",
            "goodRate": 67,
            "problemTimeSlot": "周二下午",
            "improvementMessage": "继续保持"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let store = MonitorStore::new(api);

    let first = store.fetch_posture_history(TimeRange::Week).await.unwrap();
    let second = store.fetch_posture_history(TimeRange::Week).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.good_time, "20.1");
    assert!(!store.history().loading);
    // MockServer verifies `.expect(1)` on drop.
}

#[tokio::test]
async fn test_history_failure_caches_fallback() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/monitor/posture/history"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let store = MonitorStore::new(api);

    let month = store.fetch_posture_history(TimeRange::Month).await.unwrap();
    assert_eq!(month.good_time, "72.4");
    assert_eq!(month.problem_time_slot, "下午时段");
    assert_eq!(
        store.history().error.as_deref(),
        Some("获取本月坐姿数据失败，使用模拟数据")
    );

    // Served from cache; the error from the failed fetch is cleared.
    let again = store.fetch_posture_history(TimeRange::Month).await.unwrap();
    assert_eq!(again, month);
    assert_eq!(store.history().error, None);
}

#[tokio::test]
async fn test_distribution_fallback_per_range() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/monitor/posture/distribution").await;
    let store = MonitorStore::new(api);

    let buckets = store
        .fetch_posture_distribution(TimeRange::Day)
        .await
        .unwrap();
    assert_eq!(
        buckets,
        vec![2.0, 1.0, 0.0, 3.0, 4.0, 2.0, 1.0, 0.0, 5.0, 3.0, 1.0, 0.0]
    );
    assert_eq!(
        store.distribution().error.as_deref(),
        Some(fallback::DISTRIBUTION_ERROR)
    );
}

#[tokio::test]
async fn test_images_first_page_replaces_later_pages_append() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/monitor/posture/images"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "url": "/img/a.jpg", "score": 80 },
            { "id": "b", "url": "/img/b.jpg", "score": 40 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/monitor/posture/images"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let store = MonitorStore::new(api);

    store.fetch_posture_images(1, 2).await;
    let page_two = store.fetch_posture_images(2, 3).await;

    assert_eq!(page_two.len(), 3);
    assert_eq!(page_two[0].url, fallback::PLACEHOLDER_IMAGE);
    let ids: Vec<_> = store.images().value.into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec!["a", "b", "img_2_0", "img_2_1", "img_2_2"]);
    assert_eq!(store.images().error.as_deref(), Some(fallback::IMAGES_ERROR));

    store.fetch_posture_images(1, 2).await;
    assert_eq!(store.images().value.len(), 2);
}

#[tokio::test]
async fn test_improvement_falls_back_silently() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/monitor/posture/improvement").await;
    let store = MonitorStore::new(api);

    let advice = store.fetch_posture_improvement().await;

    assert_eq!(advice.problem_time_slot, "下午3-5点");
    let cached = store.improvement();
    assert_eq!(cached.value, Some(advice));
    assert_eq!(cached.error, None);
    assert!(!cached.loading);
}

#[tokio::test]
async fn test_eye_and_emotion_fallbacks() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/monitor/eye").await;
    mount_error(&server, "/api/monitor/emotion").await;
    let store = MonitorStore::new(api);

    let eye = store.fetch_eye().await;
    assert_eq!(eye.eye_distance, Some(45.0));
    assert_eq!(eye.screen_time, 7200);
    assert_eq!(store.formatted_screen_time(), "2小时0分钟");
    assert_eq!(store.eye().error.as_deref(), Some(fallback::EYE_ERROR));

    let emotion = store.fetch_emotion().await;
    assert_eq!(emotion.confidence, Some(0.92));
    assert_eq!(emotion.history.len(), 2);
    assert_eq!(emotion.history[0].duration, 1200);
    assert_eq!(store.emotion_label(), "开心");
}

#[tokio::test]
async fn test_realtime_posture_score_updates_only_score_and_time() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/monitor/posture"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "currentScore": 90,
            "warnCount": 4,
            "averageScore": 81,
            "lastDetected": "2025-05-01T08:00:00"
        })))
        .mount(&server)
        .await;
    let store = MonitorStore::new(api);
    store.fetch_posture().await;
    let eye_before = store.eye();

    let before = Utc::now();
    let msg: RealtimeMessage = serde_json::from_str(r#"{"posture_score": 72}"#).unwrap();
    store.update_from_realtime(&msg);

    let posture = store.posture();
    assert_eq!(posture.value.current_score, Some(72.0));
    assert!(posture.value.last_detected.unwrap() >= before);
    assert_eq!(posture.value.warn_count, 4);
    assert_eq!(posture.value.average_score, Some(81.0));
    assert!(!posture.loading);
    assert_eq!(posture.error, None);
    assert_eq!(store.eye(), eye_before);
    assert_eq!(store.posture_status(), "一般");
}

#[tokio::test]
async fn test_realtime_emotion_defaults_confidence() {
    let (_server, api) = setup().await;
    let store = MonitorStore::new(api);

    let msg: RealtimeMessage =
        serde_json::from_str(r#"{"emotion": "sad", "eye_distance": 38.5}"#).unwrap();
    store.update_from_realtime(&msg);

    let emotion = store.emotion().value;
    assert_eq!(emotion.current_emotion.as_deref(), Some("sad"));
    assert_eq!(emotion.confidence, Some(0.8));
    assert_eq!(store.eye().value.eye_distance, Some(38.5));
    assert_eq!(store.emotion_label(), "难过");
}

#[tokio::test]
async fn test_subscribers_see_loading_transitions() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/monitor/posture").await;
    let store = MonitorStore::new(api);
    let mut rx = store.subscribe_posture();

    store.fetch_posture().await;

    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert!(!seen.loading);
    assert_eq!(seen.value.current_score, Some(85.0));
    assert_eq!(seen.error.as_deref(), Some(fallback::POSTURE_ERROR));
}

// ── User ────────────────────────────────────────────────────────────

fn notifications(interval: u32) -> NotificationSettings {
    NotificationSettings {
        posture_reminder: true,
        eye_reminder: true,
        emotion_alert: false,
        daily_report: true,
        reminder_interval: interval,
        quiet_hours: QuietHours::default(),
    }
}

#[tokio::test]
async fn test_user_info_failure_keeps_nothing_and_records_error() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/user/info").await;
    let store = UserStore::new(api);

    assert_eq!(store.fetch_info().await, None);
    let info = store.info();
    assert_eq!(info.error.as_deref(), Some(fallback::USER_INFO_ERROR));
    assert!(!info.loading);
}

#[tokio::test]
async fn test_update_notifications_replaces_after_accept() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/user/notifications"))
        .and(body_json(json!({
            "postureReminder": true,
            "eyeReminder": true,
            "emotionAlert": false,
            "dailyReport": true,
            "reminderInterval": 45,
            "quietHours": {"enabled": false, "start": "22:00", "end": "07:00"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    let store = UserStore::new(api);

    assert!(store.update_notifications(notifications(45)).await);
    let current = store.notifications();
    assert_eq!(current.value, Some(notifications(45)));
    assert_eq!(current.error, None);
}

#[tokio::test]
async fn test_update_notifications_refused_leaves_previous() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/user/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;
    let store = UserStore::new(api);

    assert!(!store.update_notifications(notifications(30)).await);
    let current = store.notifications();
    assert_eq!(current.value, None);
    assert_eq!(
        current.error.as_deref(),
        Some(fallback::UPDATE_NOTIFICATIONS_ERROR)
    );
}

// ── Lamp ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reminder_success() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/lamp/reminder/vision"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    let store = LampStore::new(api);

    assert!(store.remind(Reminder::Vision).await);
    assert_eq!(store.status().error, None);
}

#[tokio::test]
async fn test_reminder_refused_records_error() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/lamp/reminder/posture"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;
    let store = LampStore::new(api);

    assert!(!store.remind(Reminder::Posture).await);
    assert_eq!(store.status().error.as_deref(), Some(fallback::REMINDER_ERROR));
}

#[tokio::test]
async fn test_lamp_status_failure() {
    let (server, api) = setup().await;
    mount_error(&server, "/api/lamp/status").await;
    let store = LampStore::new(api);

    assert_eq!(store.fetch_status().await, None);
    assert_eq!(
        store.status().error.as_deref(),
        Some(fallback::LAMP_STATUS_ERROR)
    );
}

// ── Logging ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_timed_out_fetch_warns_once() {
    let server = MockServer::start().await;
    let api = ApiClient::new(
        Url::parse(&format!("{}/api", server.uri())).unwrap(),
        &TransportConfig::default().with_timeout(Duration::from_millis(100)),
        InflightRegistry::new(),
    )
    .unwrap();
    Mock::given(method("GET"))
        .and(path("/api/device/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "online": true }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let store = DeviceStore::new(api);

    let logs = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_env_filter("lampwatch_api=trace,lampwatch_core=trace")
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    store.fetch_status().await;

    assert_eq!(
        store.status().error.as_deref(),
        Some("获取设备状态失败，使用模拟数据")
    );
    let lines = logs.lines();
    let warnings: Vec<_> = lines.iter().filter(|l| l.contains("WARN")).collect();
    assert_eq!(warnings.len(), 1, "logs: {lines:#?}");
    assert!(warnings[0].contains("request timed out"), "logs: {lines:#?}");
    assert!(
        lines.iter().any(|l| l.contains("DEBUG") && l.contains("fetch failed")),
        "logs: {lines:#?}"
    );
}
