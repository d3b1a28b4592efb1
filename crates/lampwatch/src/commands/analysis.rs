//! Analysis pipeline control on the dashboard server.

use lampwatch_core::{Session, SystemStatus};

use crate::cli::{AnalysisArgs, AnalysisCommand};
use crate::error::CliError;
use crate::output::{self, detail_block, or_dash};

use super::Ctx;

fn status_detail(s: &SystemStatus) -> String {
    let pose = s.pose.as_ref();
    let mut rows = vec![
        ("Status", s.text.clone()),
        ("Posture", or_dash(pose.and_then(|p| p.status.as_deref()))),
        (
            "Head angle",
            or_dash(pose.and_then(|p| p.angle).map(|a| format!("{a:.1}°"))),
        ),
        ("Emotion", or_dash(s.emotion_label())),
        (
            "Updated",
            or_dash(s.updated_at.map(|t| t.format("%H:%M:%S"))),
        ),
    ];
    if s.partial {
        rows.push(("Note", "video running, analysis not started".into()));
    }
    detail_block(&rows)
}

pub async fn handle(session: &Session, args: AnalysisArgs, ctx: Ctx) -> Result<(), CliError> {
    let poller = session.dashboard()?;
    match args.command {
        AnalysisCommand::Start => poller.start_analysis().await?,
        AnalysisCommand::Stop => poller.stop_analysis().await?,
        AnalysisCommand::Status => poller.refresh_status().await,
    }
    let status = poller.status().get();
    let out = output::render_single(ctx.format, &status, status_detail, |s| s.text.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
