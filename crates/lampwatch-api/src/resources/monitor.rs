// Monitoring endpoints
//
// Posture, eye-usage, and emotion telemetry under `/monitor`. History and
// distribution calls take a `timeRange` of day/week/month; images are
// paginated with `page` (1-based) and `limit`.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    EmotionData, EmotionTimeSlots, EyeData, EyeDetail, Heatmap, PostureData,
    PostureDistribution, PostureHistory, PostureImage, PostureImprovement, Radar, Series,
    TimeRange,
};

impl ApiClient {
    // ── Posture ──────────────────────────────────────────────────────

    /// `GET /monitor/posture`
    pub async fn posture(&self) -> Result<PostureData, Error> {
        self.get("/monitor/posture").await
    }

    /// `GET /monitor/posture/history?timeRange=`
    pub async fn posture_history(&self, range: TimeRange) -> Result<PostureHistory, Error> {
        self.get_with("/monitor/posture/history", &[("timeRange", range.to_string())])
            .await
    }

    /// `GET /monitor/posture/distribution?timeRange=`
    pub async fn posture_distribution(
        &self,
        range: TimeRange,
    ) -> Result<PostureDistribution, Error> {
        self.get_with(
            "/monitor/posture/distribution",
            &[("timeRange", range.to_string())],
        )
        .await
    }

    /// `GET /monitor/posture/images?page=&limit=`
    pub async fn posture_images(&self, page: u32, limit: u32) -> Result<Vec<PostureImage>, Error> {
        self.get_with(
            "/monitor/posture/images",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// `GET /monitor/posture/improvement`
    pub async fn posture_improvement(&self) -> Result<PostureImprovement, Error> {
        self.get("/monitor/posture/improvement").await
    }

    // ── Eye ──────────────────────────────────────────────────────────

    /// `GET /monitor/eye`
    pub async fn eye(&self) -> Result<EyeData, Error> {
        self.get("/monitor/eye").await
    }

    /// `GET /monitor/eye/history?timeRange=`
    ///
    /// The payload shape differs per range, so it is returned untyped.
    pub async fn eye_history(&self, range: TimeRange) -> Result<serde_json::Value, Error> {
        self.get_with("/monitor/eye/history", &[("timeRange", range.to_string())])
            .await
    }

    /// `GET /monitor/eye/trends`
    pub async fn eye_trends(&self) -> Result<Series, Error> {
        self.get("/monitor/eye/trends").await
    }

    /// `GET /monitor/eye/environment`
    pub async fn eye_environment(&self) -> Result<Radar, Error> {
        self.get("/monitor/eye/environment").await
    }

    /// `GET /monitor/eye/heatmap`
    pub async fn eye_heatmap(&self) -> Result<Heatmap, Error> {
        self.get("/monitor/eye/heatmap").await
    }

    /// `GET /monitor/eye/data`
    pub async fn eye_data(&self) -> Result<EyeDetail, Error> {
        self.get("/monitor/eye/data").await
    }

    // ── Emotion ──────────────────────────────────────────────────────

    /// `GET /monitor/emotion`
    pub async fn emotion(&self) -> Result<EmotionData, Error> {
        self.get("/monitor/emotion").await
    }

    /// `GET /monitor/emotion/distribution`
    pub async fn emotion_distribution(&self) -> Result<EmotionTimeSlots, Error> {
        self.get("/monitor/emotion/distribution").await
    }

    /// `GET /monitor/emotion/trends`
    pub async fn emotion_trends(&self) -> Result<Series, Error> {
        self.get("/monitor/emotion/trends").await
    }

    /// `GET /monitor/emotion/radar`
    pub async fn emotion_radar(&self) -> Result<Radar, Error> {
        self.get("/monitor/emotion/radar").await
    }

    /// `GET /monitor/emotion/heatmap`
    pub async fn emotion_heatmap(&self) -> Result<Heatmap, Error> {
        self.get("/monitor/emotion/heatmap").await
    }
}
