//! Direct light control. These bypass the device store: the server
//! applies the change and the next settings fetch reflects it.

use lampwatch_api::models::Ack;
use lampwatch_core::{CoreError, Session};

use crate::cli::{LightArgs, LightCommand, PowerState};
use crate::error::CliError;
use crate::output::{self, detail_block, or_dash};

use super::Ctx;

fn ack_detail(ack: &Ack) -> String {
    detail_block(&[
        ("Applied", or_dash(ack.success.map(|ok| if ok { "yes" } else { "no" }))),
        ("Message", or_dash(ack.message.as_deref())),
    ])
}

pub async fn handle(session: &Session, args: LightArgs, ctx: Ctx) -> Result<(), CliError> {
    let api = session.api();
    let result = match args.command {
        LightCommand::Brightness { percent } => api.set_light_brightness(percent).await,
        LightCommand::Color { kelvin } => api.set_light_color(kelvin).await,
        LightCommand::Power { state } => {
            api.set_light_power(matches!(state, PowerState::On)).await
        }
    };
    let ack = result.map_err(CoreError::from)?;

    if ack.success == Some(false) {
        return Err(CliError::Rejected {
            message: ack.message.unwrap_or_else(|| "light command refused".into()),
        });
    }

    let out = output::render_single(ctx.format, &ack, ack_detail, |a| {
        a.message.clone().unwrap_or_else(|| "ok".into())
    })?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
