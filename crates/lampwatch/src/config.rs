//! Flag-aware wrappers over `lampwatch_config`.
//!
//! The config file and `LAMPWATCH_*` variables give the base settings;
//! global flags override them. Core receives a finished `ClientConfig`.

use clap::ValueEnum;
use lampwatch_config::Config;
use lampwatch_core::ClientConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Apply global flag overrides to the loaded file config.
pub fn with_overrides(mut cfg: Config, global: &GlobalOpts) -> Config {
    if let Some(url) = &global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(url) = &global.dashboard_url {
        cfg.dashboard_url = Some(url.clone());
    }
    if let Some(ms) = global.timeout {
        cfg.timeout_ms = ms;
    }
    if global.insecure {
        cfg.insecure = true;
    }
    cfg
}

/// Build the runtime client settings for a command.
pub fn client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = with_overrides(lampwatch_config::load_config()?, global);
    let client = cfg.to_client_config()?;
    tracing::debug!(
        api_url = %client.api_url,
        dashboard = client.dashboard_url.is_some(),
        timeout_ms = u64::try_from(client.timeout.as_millis()).unwrap_or(u64::MAX),
        "resolved client config"
    );
    Ok(client)
}

/// `--output`, else `output` from the config file, else table.
pub fn output_format(global: &GlobalOpts) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        let cfg = lampwatch_config::load_config_or_default();
        OutputFormat::from_str(&cfg.output, true).unwrap_or(OutputFormat::Table)
    })
}
