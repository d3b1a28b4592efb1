// Lamp API response types
//
// Models for the lamp backend's JSON API. The backend is inconsistent about
// field presence (and about whether timestamps carry an offset), so fields
// use `#[serde(default)]` liberally and unknown keys land in `extra`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

type Extra = serde_json::Map<String, serde_json::Value>;

// ── Query parameters ─────────────────────────────────────────────────

/// History window accepted by the `timeRange` query parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
}

impl TimeRange {
    /// Human label used in store error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "今日",
            Self::Week => "本周",
            Self::Month => "本月",
        }
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// Static device identity from `GET /device-info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub firmware: Option<String>,
    #[serde(default)]
    pub hardware: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Liveness and power state from `GET /device/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    #[serde(default)]
    pub online: bool,
    #[serde(default, with = "lenient_timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub battery_level: Option<u8>,
    #[serde(default)]
    pub charging: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Light settings from `GET /device/settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    pub brightness: u8,
    /// Kelvin.
    pub color_temperature: u32,
    pub auto_adjust: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            brightness: 50,
            color_temperature: 4000,
            auto_adjust: true,
            power: None,
            extra: Extra::new(),
        }
    }
}

impl DeviceSettings {
    /// Overlay the fields present in `patch`.
    pub fn merge(&mut self, patch: &DeviceSettingsPatch) {
        if let Some(b) = patch.brightness {
            self.brightness = b;
        }
        if let Some(k) = patch.color_temperature {
            self.color_temperature = k;
        }
        if let Some(a) = patch.auto_adjust {
            self.auto_adjust = a;
        }
        if let Some(p) = patch.power {
            self.power = Some(p);
        }
    }
}

/// Partial update body for `POST /device/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_adjust: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
}

impl DeviceSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Generic `{success, message, ...}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ── Posture ──────────────────────────────────────────────────────────

/// Current posture snapshot from `GET /monitor/posture`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureData {
    #[serde(default)]
    pub current_score: Option<f64>,
    #[serde(default)]
    pub warn_count: u32,
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(default, with = "lenient_timestamp")]
    pub last_detected: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Summary for one history window. The backend sends these as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureHistory {
    #[serde(default, deserialize_with = "string_or_number")]
    pub good_time: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mild_time: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub bad_time: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub good_rate: String,
    #[serde(default)]
    pub problem_time_slot: String,
    #[serde(default)]
    pub improvement_message: String,
}

/// Twelve bucket counts from `GET /monitor/posture/distribution`.
pub type PostureDistribution = Vec<f64>;

/// One captured frame from `GET /monitor/posture/images`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureImage {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub posture_type: Option<String>,
    #[serde(default)]
    pub is_good_posture: Option<bool>,
    #[serde(default)]
    pub note: Option<String>,
}

/// `GET /monitor/posture/improvement`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureImprovement {
    #[serde(default)]
    pub problem_time_slot: String,
    #[serde(default)]
    pub improvement_message: String,
}

// ── Eye ──────────────────────────────────────────────────────────────

/// Current eye-usage snapshot from `GET /monitor/eye`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeData {
    /// Centimetres.
    #[serde(default)]
    pub eye_distance: Option<f64>,
    /// Seconds.
    #[serde(default)]
    pub screen_time: u64,
    #[serde(default)]
    pub break_reminder: Option<String>,
    #[serde(default, with = "lenient_timestamp")]
    pub last_warning: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Stat-card numbers from `GET /monitor/eye/data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeDetail {
    #[serde(default)]
    pub blink_rate: Option<f64>,
    #[serde(default)]
    pub avg_distance: Option<f64>,
    #[serde(default)]
    pub screen_time: Option<u64>,
    #[serde(default)]
    pub warning_count: Option<u32>,
}

// ── Emotion ──────────────────────────────────────────────────────────

/// Current emotion snapshot from `GET /monitor/emotion`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionData {
    #[serde(default)]
    pub current_emotion: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub history: Vec<EmotionSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSample {
    #[serde(default, with = "lenient_timestamp")]
    pub time: Option<DateTime<Utc>>,
    pub emotion: String,
    /// Seconds.
    #[serde(default)]
    pub duration: u64,
}

/// Per-slot emotion percentages from `GET /monitor/emotion/distribution`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionTimeSlots {
    #[serde(default)]
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub emotions: BTreeMap<String, Vec<f64>>,
}

// ── Chart payloads ───────────────────────────────────────────────────

/// `{labels, data}` line series (trends).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<f64>,
}

/// `{labels, current}` radar snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Radar {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub current: Vec<f64>,
}

/// Day-by-hour matrix with values in `0..=1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub hours: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<f64>>,
}

// ── Lamp ─────────────────────────────────────────────────────────────

/// `GET /lamp/status`: serial-port state of the physical lamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LampStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Extra,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /lamp/reminder/*`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderResponse {
    #[serde(default)]
    pub success: bool,
}

// ── User ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body of `GET`/`POST /user/notifications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub posture_reminder: bool,
    pub eye_reminder: bool,
    pub emotion_alert: bool,
    pub daily_report: bool,
    /// Minutes; the server accepts 5..=240.
    pub reminder_interval: u32,
    #[serde(default)]
    pub quiet_hours: QuietHours,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub enabled: bool,
    pub start: String,
    pub end: String,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "22:00".into(),
            end: "07:00".into(),
        }
    }
}

// ── Serde helpers ────────────────────────────────────────────────────

/// Accept `"3.2"` or `3.2` and keep the textual form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// RFC 3339 timestamps, tolerating the backend's offset-less ISO strings
/// (read as UTC) and nulls.
pub(crate) mod lenient_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw).map(Some).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
    }
}
