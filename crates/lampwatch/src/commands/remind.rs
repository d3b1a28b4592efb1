use lampwatch_core::store::fallback::REMINDER_ERROR;
use lampwatch_core::{Reminder, Session};

use crate::cli::{ReminderArg, RemindArgs};
use crate::error::CliError;

use super::Ctx;

pub async fn handle(session: &Session, args: RemindArgs, ctx: Ctx) -> Result<(), CliError> {
    let kind = match args.kind {
        ReminderArg::Vision => Reminder::Vision,
        ReminderArg::Posture => Reminder::Posture,
    };
    let lamp = session.lamp();
    if !lamp.remind(kind).await {
        return Err(CliError::Rejected {
            message: lamp.status().error.unwrap_or_else(|| REMINDER_ERROR.into()),
        });
    }
    if !ctx.quiet {
        eprintln!("{kind} reminder sent");
    }
    Ok(())
}
