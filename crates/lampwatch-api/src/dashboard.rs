// Dashboard server endpoints
//
// The analysis dashboard is a separate server instance reached through the
// same `ApiClient` type with a different base URL. Every response carries
// a `{status, message?, ...}` envelope; the payload sits next to `status`
// under `data`, `report`, or at the top level.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, error};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Series, lenient_timestamp};

// ── Envelope ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Partial,
    Error,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl Envelope {
    /// Reject anything other than `success` (and `partial` when allowed).
    fn check(self, allow_partial: bool) -> Result<Self, Error> {
        match self.status() {
            Some(EnvelopeStatus::Success) => Ok(self),
            Some(EnvelopeStatus::Partial) if allow_partial => Ok(self),
            _ => Err(Error::Envelope {
                status: self.status,
                message: self.message.unwrap_or_else(|| "未知错误".into()),
            }),
        }
    }

    fn status(&self) -> Option<EnvelopeStatus> {
        self.status.parse().ok()
    }

    /// Decode the payload stored under `key`.
    fn take<T: DeserializeOwned>(mut self, key: &str) -> Result<T, Error> {
        let value = self.rest.remove(key).unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).map_err(|e| Error::Deserialization {
            message: format!("envelope field `{key}`: {e}"),
            body: String::new(),
        })
    }

    /// Decode the whole envelope body (minus `status`/`message`).
    fn into_body<T: DeserializeOwned>(self) -> Result<T, Error> {
        serde_json::from_value(serde_json::Value::Object(self.rest)).map_err(|e| {
            Error::Deserialization {
                message: format!("envelope body: {e}"),
                body: String::new(),
            }
        })
    }
}

// ── Models ───────────────────────────────────────────────────────────

/// `daily` or `weekly`, as sent in `?type=`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportKind {
    Daily,
    Weekly,
}

/// One sample from `GET /api/dashboard/data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub posture: PostureShare,
    #[serde(default)]
    pub emotion: EmotionShare,
    #[serde(default)]
    pub focus: FocusShare,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostureShare {
    #[serde(default)]
    pub good_percentage: f64,
    #[serde(default)]
    pub poor_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionShare {
    #[serde(default)]
    pub positive_percentage: f64,
    #[serde(default)]
    pub neutral_percentage: f64,
    #[serde(default)]
    pub negative_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusShare {
    #[serde(default)]
    pub focus_percentage: f64,
}

/// Server-written summary from `GET /api/dashboard/report`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    #[serde(default)]
    pub posture_summary: String,
    #[serde(default)]
    pub emotion_summary: String,
    #[serde(default)]
    pub focus_summary: String,
    #[serde(default)]
    pub suggestions: String,
}

/// `GET /api/get_pose_status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseStatus {
    /// Set when the server answered `partial` (video up, analysis not).
    #[serde(skip)]
    pub partial: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub pose_data: Option<PoseReading>,
    #[serde(default)]
    pub emotion_data: Option<EmotionReading>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseReading {
    /// Head tilt in degrees.
    #[serde(default)]
    pub angle: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_bad_posture: bool,
    #[serde(default)]
    pub is_occluded: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionReading {
    /// Upper-case code such as `HAPPY` or `CONFUSED`.
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub emotion_code: Option<i32>,
}

/// `GET /api/generate_report?type=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default, with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub posture_data: ReportPosture,
    #[serde(default)]
    pub emotion_data: ReportEmotion,
    #[serde(default)]
    pub focus_data: ReportFocus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPosture {
    #[serde(default)]
    pub daily_average: f64,
    #[serde(default)]
    pub total_issues: f64,
    #[serde(default)]
    pub worst_day: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportEmotion {
    /// Localised label, e.g. `快乐`.
    #[serde(default)]
    pub main_emotion: String,
    /// Label to percentage.
    #[serde(default)]
    pub distribution: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFocus {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub best_hour: Option<String>,
}

// ── Endpoints ────────────────────────────────────────────────────────

impl ApiClient {
    async fn envelope_get(
        &self,
        path: &str,
        query: &[(&str, String)],
        allow_partial: bool,
    ) -> Result<Envelope, Error> {
        let envelope: Envelope = self.get_with(path, query).await?;
        envelope
            .check(allow_partial)
            .inspect_err(|e| error!(path, error = %e, "dashboard request rejected"))
    }

    async fn envelope_post(&self, path: &str) -> Result<Envelope, Error> {
        let envelope: Envelope = self.post_empty(path).await?;
        envelope
            .check(false)
            .inspect_err(|e| error!(path, error = %e, "dashboard request rejected"))
    }

    /// `GET /api/dashboard/data`
    pub async fn dashboard_data(&self) -> Result<DashboardData, Error> {
        self.envelope_get("/api/dashboard/data", &[], false)
            .await?
            .take("data")
    }

    /// `GET /api/dashboard/report?type=`
    pub async fn dashboard_report(&self, kind: ReportKind) -> Result<DashboardReport, Error> {
        self.envelope_get("/api/dashboard/report", &[("type", kind.to_string())], false)
            .await?
            .take("report")
    }

    /// `POST /api/start_posture_analysis`
    pub async fn start_analysis(&self) -> Result<(), Error> {
        debug!("starting posture analysis");
        self.envelope_post("/api/start_posture_analysis").await?;
        Ok(())
    }

    /// `POST /api/stop_posture_analysis`
    pub async fn stop_analysis(&self) -> Result<(), Error> {
        debug!("stopping posture analysis");
        self.envelope_post("/api/stop_posture_analysis").await?;
        Ok(())
    }

    /// `GET /api/get_pose_status`; a `partial` answer is accepted.
    pub async fn pose_status(&self) -> Result<PoseStatus, Error> {
        let envelope = self.envelope_get("/api/get_pose_status", &[], true).await?;
        let partial = envelope.status() == Some(EnvelopeStatus::Partial);
        let message = envelope.message.clone();
        let mut status: PoseStatus = envelope.into_body()?;
        status.partial = partial;
        status.message = message;
        Ok(status)
    }

    /// Poor-posture counts per day. `GET /api/get_posture_data?days=`
    pub async fn posture_series(&self, days: u32) -> Result<Series, Error> {
        self.envelope_get("/api/get_posture_data", &[("days", days.to_string())], false)
            .await?
            .take("data")
    }

    /// `GET /api/get_emotion_distribution?hours=`
    pub async fn emotion_series(&self, hours: u32) -> Result<Series, Error> {
        self.envelope_get(
            "/api/get_emotion_distribution",
            &[("hours", hours.to_string())],
            false,
        )
        .await?
        .take("data")
    }

    /// `GET /api/get_focus_data?hours=`
    pub async fn focus_series(&self, hours: u32) -> Result<Series, Error> {
        self.envelope_get("/api/get_focus_data", &[("hours", hours.to_string())], false)
            .await?
            .take("data")
    }

    /// Persist the current analysis sample server-side.
    ///
    /// `POST /api/record_analysis_data`
    pub async fn record_analysis(&self) -> Result<(), Error> {
        self.envelope_post("/api/record_analysis_data").await?;
        Ok(())
    }

    /// `GET /api/generate_report?type=`
    pub async fn generate_report(&self, kind: ReportKind) -> Result<AnalysisReport, Error> {
        self.envelope_get("/api/generate_report", &[("type", kind.to_string())], false)
            .await?
            .take("report")
    }
}
