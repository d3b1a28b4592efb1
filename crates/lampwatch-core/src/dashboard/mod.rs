// ── Analysis dashboard ──
//
// Polling loop against the dashboard server, the sliding chart windows it
// feeds, the shared status cell, and report rendering.

mod poller;
pub mod report;
pub mod status;
mod window;

pub use poller::{DashboardPoller, HistoryCharts, PollTask};
pub use report::{RenderedReport, ReportSection};
pub use status::{StatusCell, StatusView, SystemStatus};
pub use window::{ChartSnapshot, ChartWindow, LiveCharts, NamedSeries, WINDOW_CAPACITY};
