use std::collections::BTreeMap;

use chrono::Utc;
use lampwatch_api::ApiClient;
use lampwatch_api::models::{
    EmotionData, EyeData, PostureData, PostureDistribution, PostureHistory, PostureImage,
    PostureImprovement, TimeRange,
};
use lampwatch_api::realtime::RealtimeMessage;
use tokio::sync::watch;
use tracing::{debug, trace};

use super::fallback;
use super::{Outcome, Resource, Slot, outcome};

/// Confidence assumed when a pushed emotion carries none.
const DEFAULT_EMOTION_CONFIDENCE: f64 = 0.8;

/// Posture, eye and emotion telemetry.
///
/// Besides the fetch actions, [`update_from_realtime`](Self::update_from_realtime)
/// merges pushed samples into the cached values.
#[derive(Debug)]
pub struct MonitorStore {
    api: ApiClient,
    posture: Slot<PostureData>,
    history: Slot<BTreeMap<TimeRange, PostureHistory>>,
    distribution: Slot<Option<PostureDistribution>>,
    images: Slot<Vec<PostureImage>>,
    improvement: Slot<Option<PostureImprovement>>,
    eye: Slot<EyeData>,
    emotion: Slot<EmotionData>,
}

impl MonitorStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            posture: Slot::new(PostureData::default()),
            history: Slot::new(BTreeMap::new()),
            distribution: Slot::new(None),
            images: Slot::new(Vec::new()),
            improvement: Slot::new(None),
            eye: Slot::new(EyeData::default()),
            emotion: Slot::new(EmotionData::default()),
        }
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn posture(&self) -> Resource<PostureData> {
        self.posture.get()
    }

    pub fn history(&self) -> Resource<BTreeMap<TimeRange, PostureHistory>> {
        self.history.get()
    }

    pub fn distribution(&self) -> Resource<Option<PostureDistribution>> {
        self.distribution.get()
    }

    pub fn images(&self) -> Resource<Vec<PostureImage>> {
        self.images.get()
    }

    pub fn improvement(&self) -> Resource<Option<PostureImprovement>> {
        self.improvement.get()
    }

    pub fn eye(&self) -> Resource<EyeData> {
        self.eye.get()
    }

    pub fn emotion(&self) -> Resource<EmotionData> {
        self.emotion.get()
    }

    pub fn subscribe_posture(&self) -> watch::Receiver<Resource<PostureData>> {
        self.posture.subscribe()
    }

    pub fn subscribe_history(
        &self,
    ) -> watch::Receiver<Resource<BTreeMap<TimeRange, PostureHistory>>> {
        self.history.subscribe()
    }

    pub fn subscribe_images(&self) -> watch::Receiver<Resource<Vec<PostureImage>>> {
        self.images.subscribe()
    }

    pub fn subscribe_eye(&self) -> watch::Receiver<Resource<EyeData>> {
        self.eye.subscribe()
    }

    pub fn subscribe_emotion(&self) -> watch::Receiver<Resource<EmotionData>> {
        self.emotion.subscribe()
    }

    // ── Derived ──────────────────────────────────────────────────────

    pub fn posture_status(&self) -> &'static str {
        posture_status(self.posture.get().value.current_score)
    }

    pub fn emotion_label(&self) -> String {
        emotion_label(self.emotion.get().value.current_emotion.as_deref())
    }

    pub fn formatted_screen_time(&self) -> String {
        formatted_screen_time(self.eye.get().value.screen_time)
    }

    // ── Posture ──────────────────────────────────────────────────────

    pub async fn fetch_posture(&self) -> PostureData {
        let _loading = self.posture.begin();
        match outcome(self.api.posture().await, "posture") {
            Outcome::Fresh(data) => self.posture.replace(data),
            Outcome::Failed => {
                self.posture
                    .fall_back(fallback::posture(Utc::now()), fallback::POSTURE_ERROR);
            }
            Outcome::Canceled => {}
        }
        self.posture.value()
    }

    /// Read-through history: a cached range is returned without touching
    /// the network. A failed fetch caches the fallback summary too, so
    /// the range is not retried until [`clear_history`](Self::clear_history).
    pub async fn fetch_posture_history(&self, range: TimeRange) -> Option<PostureHistory> {
        let _loading = self.history.begin();
        if let Some(cached) = self.history.get().value.get(&range) {
            trace!(%range, "posture history cache hit");
            return Some(cached.clone());
        }

        match outcome(self.api.posture_history(range).await, "posture history") {
            Outcome::Fresh(history) => {
                self.history.update(|h| {
                    h.insert(range, history.clone());
                });
                Some(history)
            }
            Outcome::Failed => {
                let mock = fallback::posture_history(range);
                self.history.update(|h| {
                    h.insert(range, mock.clone());
                });
                self.history.fail(&fallback::history_error(range));
                Some(mock)
            }
            Outcome::Canceled => None,
        }
    }

    /// Drop every cached history range.
    pub fn clear_history(&self) {
        debug!("clearing posture history cache");
        self.history.update(BTreeMap::clear);
    }

    pub async fn fetch_posture_distribution(&self, range: TimeRange) -> Option<PostureDistribution> {
        let _loading = self.distribution.begin();
        match outcome(
            self.api.posture_distribution(range).await,
            "posture distribution",
        ) {
            Outcome::Fresh(buckets) => self.distribution.replace(Some(buckets)),
            Outcome::Failed => self.distribution.fall_back(
                Some(fallback::posture_distribution(range)),
                fallback::DISTRIBUTION_ERROR,
            ),
            Outcome::Canceled => {}
        }
        self.distribution.value()
    }

    /// Page 1 replaces the image list, later pages append to it. Returns
    /// the page just loaded.
    pub async fn fetch_posture_images(&self, page: u32, limit: u32) -> Vec<PostureImage> {
        let _loading = self.images.begin();
        let batch = match outcome(self.api.posture_images(page, limit).await, "posture images") {
            Outcome::Fresh(batch) => batch,
            Outcome::Failed => {
                self.images.fail(fallback::IMAGES_ERROR);
                fallback::posture_images(page, limit, Utc::now())
            }
            Outcome::Canceled => return Vec::new(),
        };

        self.images.update(|images| {
            if page <= 1 {
                images.clone_from(&batch);
            } else {
                images.extend(batch.iter().cloned());
            }
        });
        batch
    }

    /// Improvement advice. Runs without the loading flag and falls back
    /// silently: no error text is recorded.
    pub async fn fetch_posture_improvement(&self) -> PostureImprovement {
        let value = match outcome(self.api.posture_improvement().await, "posture improvement") {
            Outcome::Fresh(value) => value,
            Outcome::Failed => fallback::posture_improvement(),
            Outcome::Canceled => return self.improvement.value().unwrap_or_default(),
        };
        self.improvement.replace(Some(value.clone()));
        value
    }

    // ── Eye / emotion ────────────────────────────────────────────────

    pub async fn fetch_eye(&self) -> EyeData {
        let _loading = self.eye.begin();
        match outcome(self.api.eye().await, "eye") {
            Outcome::Fresh(data) => self.eye.replace(data),
            Outcome::Failed => self
                .eye
                .fall_back(fallback::eye(Utc::now()), fallback::EYE_ERROR),
            Outcome::Canceled => {}
        }
        self.eye.value()
    }

    pub async fn fetch_emotion(&self) -> EmotionData {
        let _loading = self.emotion.begin();
        match outcome(self.api.emotion().await, "emotion") {
            Outcome::Fresh(data) => self.emotion.replace(data),
            Outcome::Failed => self
                .emotion
                .fall_back(fallback::emotion(Utc::now()), fallback::EMOTION_ERROR),
            Outcome::Canceled => {}
        }
        self.emotion.value()
    }

    // ── Realtime ─────────────────────────────────────────────────────

    /// Merge one pushed sample. Only the fields present in `msg` change;
    /// loading flags and error messages are never touched.
    pub fn update_from_realtime(&self, msg: &RealtimeMessage) {
        if let Some(score) = msg.posture_score {
            self.posture.update(|p| {
                p.current_score = Some(score);
                p.last_detected = Some(Utc::now());
            });
        }
        if let Some(distance) = msg.eye_distance {
            self.eye.update(|e| e.eye_distance = Some(distance));
        }
        if let Some(emotion) = &msg.emotion {
            let confidence = msg.emotion_confidence.unwrap_or(DEFAULT_EMOTION_CONFIDENCE);
            self.emotion.update(|e| {
                e.current_emotion = Some(emotion.clone());
                e.confidence = Some(confidence);
            });
        }
    }
}

// ── Display helpers ──────────────────────────────────────────────────

/// Posture verdict for a score: `未检测` when unknown, then `良好` (≥ 80),
/// `一般` (≥ 60) and `不良`.
pub fn posture_status(score: Option<f64>) -> &'static str {
    match score {
        None => "未检测",
        Some(s) if s >= 80.0 => "良好",
        Some(s) if s >= 60.0 => "一般",
        Some(_) => "不良",
    }
}

/// Localised name for an emotion key; unknown keys pass through.
pub fn emotion_label(emotion: Option<&str>) -> String {
    let Some(emotion) = emotion.filter(|e| !e.is_empty()) else {
        return "未检测".into();
    };
    match emotion {
        "happy" => "开心",
        "sad" => "难过",
        "angry" => "生气",
        "surprised" => "惊讶",
        "fear" => "恐惧",
        "disgust" => "厌恶",
        "neutral" => "平静",
        other => other,
    }
    .to_owned()
}

/// `2小时5分钟`, or just `5分钟` under an hour.
pub fn formatted_screen_time(seconds: u64) -> String {
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{hours}小时{}分钟", minutes % 60)
    } else {
        format!("{minutes}分钟")
    }
}
