//! Stream realtime telemetry to stdout until interrupted.

use lampwatch_api::realtime::{ChannelState, RealtimeMessage};
use lampwatch_core::store::{emotion_label, posture_status};
use lampwatch_core::{CoreError, Session};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::Ctx;

fn message_line(msg: &RealtimeMessage) -> String {
    let now = chrono::Local::now().format("%H:%M:%S");
    let mut parts = vec![format!("[{now}]")];
    if let Some(score) = msg.posture_score {
        parts.push(format!("posture {score} ({})", posture_status(Some(score))));
    }
    if let Some(distance) = msg.eye_distance {
        parts.push(format!("eye {distance}cm"));
    }
    if msg.emotion.is_some() {
        parts.push(format!(
            "emotion {} {}",
            emotion_label(msg.emotion.as_deref()),
            or_dash(msg.emotion_confidence.map(|c| format!("{:.0}%", c * 100.0)))
        ));
    }
    if parts.len() == 1 {
        parts.push(format!("{} other field(s)", msg.extra.len()));
    }
    parts.join("  ")
}

pub async fn handle(session: &Session, args: WatchArgs, ctx: Ctx) -> Result<(), CliError> {
    let Some(channel) = session.channel() else {
        return Err(CliError::Realtime {
            reason: "realtime is disabled in the configuration".into(),
        });
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<RealtimeMessage>();
    let forward = channel.add_listener(move |msg| {
        tx.send(msg.clone())
            .map_err(|_| "watch output closed".to_string().into())
    });
    let mut state = channel.subscribe_state();
    session.connect_realtime();
    info!(url = %channel.url(), "watching realtime channel");

    // One JSON document per line keeps the stream machine-readable.
    let format = match ctx.format {
        OutputFormat::Json => OutputFormat::JsonCompact,
        other => other,
    };

    let mut seen = 0usize;
    let result = loop {
        tokio::select! {
            Some(msg) = rx.recv() => {
                let rendered = output::render_single(format, &msg, message_line, |m| {
                    serde_json::to_string(m).unwrap_or_default()
                });
                let out = match rendered {
                    Ok(out) => out,
                    Err(e) => break Err(e),
                };
                output::print_output(&out, ctx.quiet);
                seen += 1;
                if args.count.is_some_and(|n| seen >= n) {
                    break Ok(());
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = *state.borrow_and_update();
                debug!(state = %current, "realtime state changed");
                if let (ChannelState::Disconnected, Err(e)) = (current, channel.health()) {
                    break Err(CliError::from(CoreError::from(e)));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break Ok(());
            }
        }
    };

    forward.unregister();
    channel.disconnect();
    result
}
