// lampwatch-core: Observable state between lampwatch-api and its consumers.
//
// Stores that recover from fetch failures with fallback data, the dashboard
// poll loop and its shared status cell, and the `Session` that wires them
// to one set of API clients and the realtime channel.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, PollIntervals, RealtimeConfig};
pub use dashboard::{DashboardPoller, PollTask, StatusView, SystemStatus};
pub use error::CoreError;
pub use session::Session;
pub use store::{DeviceStore, LampStore, MonitorStore, Reminder, Resource, UserStore};

// Wire types consumers need alongside the stores.
pub use lampwatch_api::dashboard::ReportKind;
pub use lampwatch_api::models::{DeviceSettingsPatch, TimeRange};
