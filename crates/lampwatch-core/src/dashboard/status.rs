// ── Shared analysis status ──
//
// One writer (`StatusCell`, owned by the poller) and any number of
// read-only `StatusView`s. The control panel and the monitoring panel each
// hold a view, so they can never disagree about whether analysis is running.

use chrono::{DateTime, Utc};
use lampwatch_api::dashboard::{EmotionReading, PoseReading, PoseStatus};
use serde::Serialize;
use tokio::sync::watch;

pub const RUNNING: &str = "运行中";
pub const STOPPED: &str = "已停止";
pub const START_FAILED: &str = "启动失败";
pub const FAILED: &str = "错误";
pub const CONNECTION_ERROR: &str = "连接错误";

/// What the panels show about the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    /// Human status line, e.g. `运行中` or `错误: 摄像头不可用`.
    pub text: String,
    pub running: bool,
    /// Server reported `partial`: video is up but analysis is not.
    pub partial: bool,
    pub pose: Option<PoseReading>,
    pub emotion: Option<EmotionReading>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self {
            text: STOPPED.into(),
            running: false,
            partial: false,
            pose: None,
            emotion: None,
            updated_at: None,
        }
    }
}

impl SystemStatus {
    /// Localised label for the pushed emotion code.
    pub fn emotion_label(&self) -> Option<&str> {
        self.emotion
            .as_ref()
            .and_then(|e| e.emotion.as_deref())
            .map(emotion_code_label)
    }
}

/// `HAPPY` → `快乐` and so on; unknown codes pass through.
pub fn emotion_code_label(code: &str) -> &str {
    match code {
        "HAPPY" => "快乐",
        "ANGRY" => "生气",
        "SAD" => "悲伤",
        "SURPRISED" => "惊讶",
        "NEUTRAL" => "平静",
        "CONFUSED" => "困惑",
        other => other,
    }
}

// ── StatusCell ───────────────────────────────────────────────────────

/// The single writer of [`SystemStatus`].
#[derive(Debug, Clone)]
pub struct StatusCell {
    tx: watch::Sender<SystemStatus>,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SystemStatus::default());
        Self { tx }
    }

    pub fn view(&self) -> StatusView {
        StatusView {
            rx: self.tx.subscribe(),
        }
    }

    pub fn get(&self) -> SystemStatus {
        self.tx.borrow().clone()
    }

    /// Set the status line; pose and emotion readings are kept.
    pub fn set(&self, text: impl Into<String>, running: bool) {
        let text = text.into();
        self.tx.send_modify(|s| {
            s.text = text;
            s.running = running;
            s.partial = false;
            s.updated_at = Some(Utc::now());
        });
    }

    /// Fold a polled pose status in. Readings absent from the poll keep
    /// their previous value.
    pub fn apply(&self, status: PoseStatus) {
        self.tx.send_modify(|s| {
            s.text = if status.is_running { RUNNING } else { STOPPED }.into();
            s.running = status.is_running;
            s.partial = status.partial;
            if status.pose_data.is_some() {
                s.pose = status.pose_data;
            }
            if status.emotion_data.is_some() {
                s.emotion = status.emotion_data;
            }
            s.updated_at = Some(Utc::now());
        });
    }
}

// ── StatusView ───────────────────────────────────────────────────────

/// Read-only handle on the shared status.
#[derive(Debug, Clone)]
pub struct StatusView {
    rx: watch::Receiver<SystemStatus>,
}

impl StatusView {
    pub fn get(&self) -> SystemStatus {
        self.rx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.rx.borrow().running
    }

    /// Wait for the next change. `false` once the cell is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
