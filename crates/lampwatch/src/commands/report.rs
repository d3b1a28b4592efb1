use lampwatch_api::dashboard::DashboardReport;
use lampwatch_core::{ReportKind, Session};

use crate::cli::{ReportArg, ReportArgs};
use crate::error::CliError;
use crate::output::{self, detail_block};

use super::Ctx;

fn summary_detail(r: &DashboardReport) -> String {
    detail_block(&[
        ("Posture", r.posture_summary.clone()),
        ("Emotion", r.emotion_summary.clone()),
        ("Focus", r.focus_summary.clone()),
        ("Suggestions", r.suggestions.clone()),
    ])
}

pub async fn handle(session: &Session, args: ReportArgs, ctx: Ctx) -> Result<(), CliError> {
    let poller = session.dashboard()?;
    let kind = match args.kind {
        ReportArg::Daily => ReportKind::Daily,
        ReportArg::Weekly => ReportKind::Weekly,
    };

    let out = if args.summary {
        let summary = poller.dashboard_report(kind).await?;
        output::render_single(ctx.format, &summary, summary_detail, |r| {
            r.suggestions.clone()
        })?
    } else {
        let report = poller.generate_report(kind).await?;
        output::render_single(
            ctx.format,
            &report,
            |r| r.to_string().trim_end().to_owned(),
            |r| r.title.clone(),
        )?
    };
    output::print_output(&out, ctx.quiet);
    Ok(())
}
