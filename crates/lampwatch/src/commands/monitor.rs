//! Monitor command handlers: posture, eye and emotion telemetry.

use lampwatch_api::models::{
    EmotionData, EyeData, PostureData, PostureHistory, PostureImage, PostureImprovement,
};
use lampwatch_core::store::{emotion_label, formatted_screen_time, posture_status};
use lampwatch_core::{Session, TimeRange};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{MonitorArgs, MonitorCommand, RangeArg};
use crate::error::CliError;
use crate::output::{self, detail_block, or_dash};

use super::Ctx;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ImageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Taken")]
    taken: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "URL")]
    url: String,
}

fn image_row(img: &PostureImage) -> ImageRow {
    ImageRow {
        id: img.id.clone(),
        taken: or_dash(img.timestamp.map(|t| t.format("%m-%d %H:%M"))),
        score: or_dash(img.score),
        url: img.url.clone(),
    }
}

#[derive(Serialize)]
struct Bucket {
    slot: usize,
    count: f64,
}

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "Slot")]
    slot: usize,
    #[tabled(rename = "Poor posture")]
    count: f64,
}

// ── Detail views ────────────────────────────────────────────────────

fn posture_detail(p: &PostureData) -> String {
    detail_block(&[
        ("Score", or_dash(p.current_score)),
        ("Status", posture_status(p.current_score).into()),
        ("Average", or_dash(p.average_score)),
        ("Warnings", p.warn_count.to_string()),
        (
            "Detected",
            or_dash(p.last_detected.map(|t| t.format("%Y-%m-%d %H:%M:%S"))),
        ),
    ])
}

fn history_detail(h: &PostureHistory) -> String {
    detail_block(&[
        ("Good (h)", h.good_time.clone()),
        ("Mild (h)", h.mild_time.clone()),
        ("Poor (h)", h.bad_time.clone()),
        ("Good rate", format!("{}%", h.good_rate)),
        ("Problem slot", h.problem_time_slot.clone()),
        ("Advice", h.improvement_message.clone()),
    ])
}

fn improvement_detail(i: &PostureImprovement) -> String {
    detail_block(&[
        ("Problem slot", i.problem_time_slot.clone()),
        ("Advice", i.improvement_message.clone()),
    ])
}

fn eye_detail(e: &EyeData) -> String {
    detail_block(&[
        ("Distance", or_dash(e.eye_distance.map(|d| format!("{d}cm")))),
        ("Screen time", formatted_screen_time(e.screen_time)),
        ("Breaks", or_dash(e.break_reminder.as_deref())),
        (
            "Last warning",
            or_dash(e.last_warning.map(|t| t.format("%H:%M:%S"))),
        ),
    ])
}

fn emotion_detail(e: &EmotionData) -> String {
    let mut out = detail_block(&[
        ("Emotion", emotion_label(e.current_emotion.as_deref())),
        (
            "Confidence",
            or_dash(e.confidence.map(|c| format!("{:.0}%", c * 100.0))),
        ),
    ]);
    for sample in &e.history {
        out.push_str(&format!(
            "\n  {}  {}  {}s",
            or_dash(sample.time.map(|t| t.format("%H:%M"))),
            emotion_label(Some(sample.emotion.as_str())),
            sample.duration
        ));
    }
    out
}

fn time_range(arg: RangeArg) -> TimeRange {
    match arg {
        RangeArg::Day => TimeRange::Day,
        RangeArg::Week => TimeRange::Week,
        RangeArg::Month => TimeRange::Month,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: MonitorArgs, ctx: Ctx) -> Result<(), CliError> {
    let store = session.monitor();
    let out = match args.command {
        MonitorCommand::Posture => {
            let posture = store.fetch_posture().await;
            output::warn_stale(store.posture().error.as_deref(), ctx.quiet);
            output::render_single(ctx.format, &posture, posture_detail, |p| {
                or_dash(p.current_score)
            })?
        }

        MonitorCommand::History { range } => {
            let range = time_range(range);
            let Some(history) = store.fetch_posture_history(range).await else {
                return Ok(());
            };
            output::warn_stale(store.history().error.as_deref(), ctx.quiet);
            output::render_single(ctx.format, &history, history_detail, |h| {
                h.good_rate.clone()
            })?
        }

        MonitorCommand::Distribution { range } => {
            let buckets = store
                .fetch_posture_distribution(time_range(range))
                .await
                .unwrap_or_default();
            output::warn_stale(store.distribution().error.as_deref(), ctx.quiet);
            let buckets: Vec<Bucket> = buckets
                .into_iter()
                .enumerate()
                .map(|(i, count)| Bucket { slot: i + 1, count })
                .collect();
            output::render_list(
                ctx.format,
                &buckets,
                |b| BucketRow {
                    slot: b.slot,
                    count: b.count,
                },
                |b| b.count.to_string(),
            )?
        }

        MonitorCommand::Images { page, limit } => {
            let images = store.fetch_posture_images(page, limit).await;
            output::warn_stale(store.images().error.as_deref(), ctx.quiet);
            output::render_list(ctx.format, &images, image_row, |img| img.url.clone())?
        }

        MonitorCommand::Improvement => {
            let advice = store.fetch_posture_improvement().await;
            output::render_single(ctx.format, &advice, improvement_detail, |i| {
                i.improvement_message.clone()
            })?
        }

        MonitorCommand::Eye => {
            let eye = store.fetch_eye().await;
            output::warn_stale(store.eye().error.as_deref(), ctx.quiet);
            output::render_single(ctx.format, &eye, eye_detail, |e| or_dash(e.eye_distance))?
        }

        MonitorCommand::Emotion => {
            let emotion = store.fetch_emotion().await;
            output::warn_stale(store.emotion().error.as_deref(), ctx.quiet);
            output::render_single(ctx.format, &emotion, emotion_detail, |e| {
                e.current_emotion.clone().unwrap_or_default()
            })?
        }
    };
    output::print_output(&out, ctx.quiet);
    Ok(())
}
