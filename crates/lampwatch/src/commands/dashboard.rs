//! Follow the analysis dashboard: status polling, chart refresh, and
//! with `--monitor` the live data charts.

use std::time::Duration;

use lampwatch_core::dashboard::LiveCharts;
use lampwatch_core::{Session, SystemStatus};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cli::{DashboardArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::Ctx;

/// One printed update.
#[derive(Debug, Serialize)]
struct Frame {
    status: SystemStatus,
    posture: Option<[f64; 2]>,
    emotion: Option<[f64; 3]>,
    focus: Option<f64>,
}

impl Frame {
    fn capture(status: SystemStatus, charts: &LiveCharts) -> Self {
        Self {
            status,
            posture: charts.posture.latest().map(|(_, v)| v),
            emotion: charts.emotion.latest().map(|(_, v)| v),
            focus: charts.focus.latest().map(|(_, [v])| v),
        }
    }
}

fn frame_line(f: &Frame) -> String {
    let now = chrono::Local::now().format("%H:%M:%S");
    let mut line = format!("[{now}] {}", f.status.text);
    if let Some(emotion) = f.status.emotion_label() {
        line.push_str(&format!("  emotion {emotion}"));
    }
    if let Some([good, poor]) = f.posture {
        line.push_str(&format!("  posture {good:.0}/{poor:.0}%"));
    }
    if let Some([pos, neu, neg]) = f.emotion {
        line.push_str(&format!("  mood {pos:.0}/{neu:.0}/{neg:.0}%"));
    }
    if f.focus.is_some() {
        line.push_str(&format!("  focus {}%", or_dash(f.focus.map(|v| format!("{v:.0}")))));
    }
    line
}

async fn until(duration: Option<u64>) {
    match duration {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => std::future::pending().await,
    }
}

pub async fn handle(session: &Session, args: DashboardArgs, ctx: Ctx) -> Result<(), CliError> {
    let poller = session.dashboard()?;
    let mut status = poller.status();
    let mut charts = poller.subscribe_live_charts();

    poller.start_default();
    let started = if args.monitor {
        poller.start_monitoring().await
    } else {
        Ok(())
    };
    if let Err(e) = started {
        warn!(error = %e, "analysis did not start, collecting data anyway");
        output::warn_stale(Some(e.to_string().as_str()), ctx.quiet);
    }

    let format = match ctx.format {
        OutputFormat::Json => OutputFormat::JsonCompact,
        other => other,
    };
    let deadline = until(args.duration);
    tokio::pin!(deadline);

    let result = loop {
        tokio::select! {
            alive = status.changed() => {
                if !alive {
                    break Ok(());
                }
            }
            changed = charts.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
            () = &mut deadline => break Ok(()),
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break Ok(());
            }
        }
        let frame = Frame::capture(status.get(), &charts.borrow_and_update());
        match output::render_single(format, &frame, frame_line, |f| f.status.text.clone()) {
            Ok(out) => output::print_output(&out, ctx.quiet),
            Err(e) => break Err(e),
        }
    };

    poller.stop_all();
    let stopped = if args.monitor {
        poller.stop_analysis().await
    } else {
        Ok(())
    };
    if let Err(e) = stopped {
        warn!(error = %e, "failed to stop analysis");
    }
    result
}
