// ── Dashboard poll loop ──
//
// Four independent timers against the dashboard server. Each kind has at
// most one live task: starting a kind aborts the previous task of that kind
// before spawning the new one. Every timer fires once immediately, then at
// its period.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Local;
use lampwatch_api::dashboard::{DashboardReport, ReportKind};
use lampwatch_api::models::Series;
use lampwatch_api::{ApiClient, Error};
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::report::{self, RenderedReport};
use super::status::{self, StatusCell, StatusView};
use super::window::LiveCharts;
use crate::config::PollIntervals;
use crate::error::CoreError;

/// Days of posture history in the chart refresh.
const POSTURE_DAYS: u32 = 7;
/// Hours of emotion history in the chart refresh.
const EMOTION_HOURS: u32 = 24;
/// Hours of focus history in the chart refresh.
const FOCUS_HOURS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PollTask {
    /// Dashboard snapshot into the live chart windows.
    Data,
    /// Pose status into the status cell.
    Status,
    /// History series for the trend charts.
    Chart,
    /// `record_analysis` heartbeat.
    Record,
}

/// Latest history series; each chart refreshes independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryCharts {
    pub posture: Option<Series>,
    pub emotion: Option<Series>,
    pub focus: Option<Series>,
}

// ── DashboardPoller ──────────────────────────────────────────────────

struct Shared {
    api: ApiClient,
    status: StatusCell,
    live: watch::Sender<LiveCharts>,
    history: watch::Sender<HistoryCharts>,
}

struct PollerInner {
    shared: Arc<Shared>,
    intervals: PollIntervals,
    tasks: Mutex<HashMap<PollTask, JoinHandle<()>>>,
}

impl Drop for PollerInner {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }
}

/// Polls the dashboard server and owns the shared analysis status.
///
/// Cheap to clone; clones drive the same timers. Dropping the last clone
/// aborts every timer.
#[derive(Clone)]
pub struct DashboardPoller {
    inner: Arc<PollerInner>,
}

impl std::fmt::Debug for DashboardPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardPoller")
            .field("base_url", &self.inner.shared.api.base_url().as_str())
            .field("active", &self.active())
            .finish_non_exhaustive()
    }
}

impl DashboardPoller {
    pub fn new(api: ApiClient, intervals: PollIntervals) -> Self {
        let (live, _) = watch::channel(LiveCharts::default());
        let (history, _) = watch::channel(HistoryCharts::default());
        Self {
            inner: Arc::new(PollerInner {
                shared: Arc::new(Shared {
                    api,
                    status: StatusCell::new(),
                    live,
                    history,
                }),
                intervals,
                tasks: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.shared.api
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn status(&self) -> StatusView {
        self.inner.shared.status.view()
    }

    pub fn live_charts(&self) -> LiveCharts {
        self.inner.shared.live.borrow().clone()
    }

    pub fn subscribe_live_charts(&self) -> watch::Receiver<LiveCharts> {
        self.inner.shared.live.subscribe()
    }

    pub fn history_charts(&self) -> HistoryCharts {
        self.inner.shared.history.borrow().clone()
    }

    pub fn subscribe_history_charts(&self) -> watch::Receiver<HistoryCharts> {
        self.inner.shared.history.subscribe()
    }

    /// Kinds with a live timer.
    pub fn active(&self) -> Vec<PollTask> {
        let tasks = self.tasks();
        PollTask::iter()
            .filter(|kind| tasks.get(kind).is_some_and(|h| !h.is_finished()))
            .collect()
    }

    pub fn is_active(&self, kind: PollTask) -> bool {
        self.tasks().get(&kind).is_some_and(|h| !h.is_finished())
    }

    // ── Timers ───────────────────────────────────────────────────────

    /// (Re)start the timer for `kind`. Must be called inside a Tokio runtime.
    pub fn start(&self, kind: PollTask) {
        let period = self.period(kind);
        let shared = Arc::clone(&self.inner.shared);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                shared.run(kind).await;
            }
        });

        if let Some(previous) = self.tasks().insert(kind, handle) {
            previous.abort();
            debug!(%kind, "restarted dashboard timer");
        } else {
            debug!(%kind, period_ms = period.as_millis(), "started dashboard timer");
        }
    }

    pub fn stop(&self, kind: PollTask) {
        if let Some(handle) = self.tasks().remove(&kind) {
            handle.abort();
            debug!(%kind, "stopped dashboard timer");
        }
    }

    /// Status, chart refresh and recording: what an opened dashboard runs.
    pub fn start_default(&self) {
        self.start(PollTask::Status);
        self.start(PollTask::Chart);
        self.start(PollTask::Record);
    }

    pub fn stop_all(&self) {
        let drained: Vec<_> = self.tasks().drain().collect();
        for (_, handle) in drained {
            handle.abort();
        }
        info!("dashboard timers stopped");
    }

    // ── Analysis control ─────────────────────────────────────────────

    /// Start the analysis pipeline and, on success, restart recording.
    pub async fn start_analysis(&self) -> Result<(), CoreError> {
        let cell = &self.inner.shared.status;
        match self.api().start_analysis().await {
            Ok(()) => {
                cell.set(status::RUNNING, true);
                info!("analysis started");
                self.start(PollTask::Record);
                Ok(())
            }
            Err(e @ Error::Envelope { .. }) => {
                cell.set(status::START_FAILED, false);
                Err(e.into())
            }
            Err(e) if e.is_canceled() => Err(e.into()),
            Err(e) => {
                cell.set(status::FAILED, false);
                Err(e.into())
            }
        }
    }

    /// Stop the analysis pipeline and, on success, stop recording. A failed
    /// stop leaves the status untouched.
    pub async fn stop_analysis(&self) -> Result<(), CoreError> {
        self.api().stop_analysis().await?;
        self.inner.shared.status.set(status::STOPPED, false);
        info!("analysis stopped");
        self.stop(PollTask::Record);
        Ok(())
    }

    /// Start analysis and live data collection together. Collection starts
    /// even when the analysis request fails, so the charts show whatever
    /// the server still reports.
    pub async fn start_monitoring(&self) -> Result<(), CoreError> {
        let started = self.start_analysis().await;
        self.start(PollTask::Data);
        started
    }

    pub async fn stop_monitoring(&self) -> Result<(), CoreError> {
        self.stop(PollTask::Data);
        self.stop_analysis().await
    }

    /// Poll pose status once, outside any timer.
    pub async fn refresh_status(&self) {
        self.inner.shared.run(PollTask::Status).await;
    }

    // ── Reports ──────────────────────────────────────────────────────

    pub async fn generate_report(&self, kind: ReportKind) -> Result<RenderedReport, CoreError> {
        let report = self.api().generate_report(kind).await?;
        Ok(report::render(kind, &report))
    }

    pub async fn dashboard_report(&self, kind: ReportKind) -> Result<DashboardReport, CoreError> {
        Ok(self.api().dashboard_report(kind).await?)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn tasks(&self) -> MutexGuard<'_, HashMap<PollTask, JoinHandle<()>>> {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn period(&self, kind: PollTask) -> Duration {
        let intervals = &self.inner.intervals;
        let period = match kind {
            PollTask::Data => intervals.data,
            PollTask::Status => intervals.status,
            PollTask::Chart => intervals.chart,
            PollTask::Record => intervals.record,
        };
        // `interval` panics on a zero period.
        period.max(Duration::from_millis(1))
    }
}

impl Shared {
    async fn run(&self, kind: PollTask) {
        match kind {
            PollTask::Data => self.collect().await,
            PollTask::Status => self.poll_status().await,
            PollTask::Chart => self.refresh_charts().await,
            PollTask::Record => self.record().await,
        }
    }

    async fn collect(&self) {
        let Ok(data) = self.api.dashboard_data().await else {
            return;
        };
        let label = Local::now().format("%H:%M:%S").to_string();
        self.live.send_modify(|charts| {
            charts.posture.push(
                label.clone(),
                [data.posture.good_percentage, data.posture.poor_percentage],
            );
            charts.emotion.push(
                label.clone(),
                [
                    data.emotion.positive_percentage,
                    data.emotion.neutral_percentage,
                    data.emotion.negative_percentage,
                ],
            );
            charts.focus.push(label, [data.focus.focus_percentage]);
        });
    }

    async fn poll_status(&self) {
        match self.api.pose_status().await {
            Ok(pose) => self.status.apply(pose),
            Err(e) if e.is_canceled() => {}
            Err(Error::Envelope { message, .. }) => {
                self.status.set(format!("{}: {message}", status::FAILED), false);
            }
            Err(_) => self.status.set(status::CONNECTION_ERROR, false),
        }
    }

    async fn refresh_charts(&self) {
        let (posture, emotion, focus) = tokio::join!(
            self.api.posture_series(POSTURE_DAYS),
            self.api.emotion_series(EMOTION_HOURS),
            self.api.focus_series(FOCUS_HOURS),
        );
        self.history.send_modify(|charts| {
            if let Ok(series) = posture {
                charts.posture = Some(series);
            }
            if let Ok(series) = emotion {
                charts.emotion = Some(series);
            }
            if let Ok(series) = focus {
                charts.focus = Some(series);
            }
        });
    }

    async fn record(&self) {
        match self.api.record_analysis().await {
            Ok(()) => debug!("analysis sample recorded"),
            Err(e) if e.is_canceled() => {}
            Err(e) => warn!(error = %e, "recording analysis sample failed"),
        }
    }
}
