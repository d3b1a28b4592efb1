//! Device command handlers.

use lampwatch_api::models::{DeviceInfo, DeviceSettings, DeviceStatus};
use lampwatch_core::{DeviceSettingsPatch, Session};

use crate::cli::{DeviceArgs, DeviceCommand, SettingsPatchArgs};
use crate::error::CliError;
use crate::output::{self, detail_block, or_dash};

use super::Ctx;

fn info_detail(d: &DeviceInfo) -> String {
    detail_block(&[
        ("ID", or_dash(d.id.as_deref())),
        ("Name", or_dash(d.name.as_deref())),
        ("Model", or_dash(d.model.as_deref())),
        ("Firmware", or_dash(d.firmware.as_deref())),
        ("Hardware", or_dash(d.hardware.as_deref())),
        ("MAC", or_dash(d.mac.as_deref())),
    ])
}

fn status_detail(s: &DeviceStatus) -> String {
    detail_block(&[
        ("Online", yes_no(s.online).into()),
        ("Battery", or_dash(s.battery_level.map(|b| format!("{b}%")))),
        ("Charging", yes_no(s.charging).into()),
        (
            "Last seen",
            or_dash(s.last_seen.map(|t| t.format("%Y-%m-%d %H:%M:%S"))),
        ),
    ])
}

fn settings_detail(s: &DeviceSettings) -> String {
    let mut rows = vec![
        ("Brightness", format!("{}%", s.brightness)),
        ("Colour temp", format!("{}K", s.color_temperature)),
        ("Auto adjust", yes_no(s.auto_adjust).into()),
    ];
    if let Some(power) = s.power {
        rows.push(("Power", if power { "on" } else { "off" }.into()));
    }
    detail_block(&rows)
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

impl From<SettingsPatchArgs> for DeviceSettingsPatch {
    fn from(args: SettingsPatchArgs) -> Self {
        Self {
            brightness: args.brightness,
            color_temperature: args.color_temperature,
            auto_adjust: args.auto_adjust,
            power: args.power,
        }
    }
}

pub async fn handle(session: &Session, args: DeviceArgs, ctx: Ctx) -> Result<(), CliError> {
    let store = session.device();
    match args.command {
        DeviceCommand::Info => {
            let Some(info) = store.fetch_info().await else {
                return Err(CliError::Unavailable {
                    message: store.info().error.unwrap_or_default(),
                });
            };
            let out = output::render_single(ctx.format, &info, info_detail, |d| {
                d.id.clone().unwrap_or_default()
            })?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        DeviceCommand::Status => {
            let status = store.fetch_status().await;
            output::warn_stale(store.status().error.as_deref(), ctx.quiet);
            let out = output::render_single(ctx.format, &status, status_detail, |s| {
                if s.online { "online" } else { "offline" }.into()
            })?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        DeviceCommand::Settings => {
            let settings = store.fetch_settings().await;
            output::warn_stale(store.settings().error.as_deref(), ctx.quiet);
            let out = output::render_single(ctx.format, &settings, settings_detail, |s| {
                s.brightness.to_string()
            })?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        DeviceCommand::Set(patch_args) => {
            let patch = DeviceSettingsPatch::from(patch_args);
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "settings".into(),
                    reason: "give at least one of --brightness, --color-temperature, \
                             --auto-adjust, --power"
                        .into(),
                });
            }
            let settings = store.update_settings(&patch).await;
            if let Some(message) = store.settings().error {
                return Err(CliError::Rejected { message });
            }
            let out = output::render_single(ctx.format, &settings, settings_detail, |s| {
                s.brightness.to_string()
            })?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }
    }
}
