//! Config file inspection and scaffolding. Never touches the network.

use lampwatch_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::with_overrides;
use crate::error::CliError;
use crate::output::{self, detail_block, or_dash};

use super::Ctx;

fn config_detail(c: &Config) -> String {
    detail_block(&[
        ("API URL", c.api_url.clone()),
        ("Dashboard URL", or_dash(c.dashboard_url.as_deref())),
        ("Timeout", format!("{}ms", c.timeout_ms)),
        ("Insecure TLS", c.insecure.to_string()),
        ("Output", c.output.clone()),
        (
            "Realtime",
            if c.realtime.enabled {
                format!(
                    "{} (retry {}ms x{})",
                    c.realtime.path,
                    c.realtime.reconnect_delay_ms,
                    c.realtime.max_reconnect_attempts
                )
            } else {
                "disabled".into()
            },
        ),
        (
            "Poll (ms)",
            format!(
                "data {} / status {} / chart {} / record {}",
                c.dashboard.data_interval_ms,
                c.dashboard.status_interval_ms,
                c.dashboard.chart_interval_ms,
                c.dashboard.record_interval_ms
            ),
        ),
    ])
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts, ctx: Ctx) -> Result<(), CliError> {
    let path = lampwatch_config::config_path();
    match &args.command {
        ConfigCommand::Show => {
            let cfg = with_overrides(lampwatch_config::load_config()?, global);
            let out = output::render_single(ctx.format, &cfg, config_detail, |c| {
                c.api_url.clone()
            })?;
            output::print_output(&out, ctx.quiet);
        }

        ConfigCommand::Path => output::print_output(&path.display().to_string(), ctx.quiet),

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            lampwatch_config::save_config_to(&path, &Config::default())?;
            if !ctx.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
    }
    Ok(())
}
