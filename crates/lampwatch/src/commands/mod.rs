//! Command dispatch: bridges CLI args -> session stores -> output formatting.

pub mod analysis;
pub mod config_cmd;
pub mod dashboard;
pub mod device;
pub mod light;
pub mod monitor;
pub mod remind;
pub mod report;
pub mod watch;

use lampwatch_core::Session;

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Rendering settings shared by every handler.
#[derive(Debug, Clone, Copy)]
pub struct Ctx {
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, ctx: Ctx) -> Result<(), CliError> {
    match cmd {
        Command::Device(args) => device::handle(session, args, ctx).await,
        Command::Monitor(args) => monitor::handle(session, args, ctx).await,
        Command::Light(args) => light::handle(session, args, ctx).await,
        Command::Remind(args) => remind::handle(session, args, ctx).await,
        Command::Analysis(args) => analysis::handle(session, args, ctx).await,
        Command::Report(args) => report::handle(session, args, ctx).await,
        Command::Watch(args) => watch::handle(session, args, ctx).await,
        Command::Dashboard(args) => dashboard::handle(session, args, ctx).await,
        // Config and Completions never reach a server.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
