//! Configuration for the lampwatch CLI.
//!
//! A TOML file in the platform config directory, overridden by
//! `LAMPWATCH_*` environment variables, translated into a
//! `lampwatch_core::ClientConfig`. The CLI layers its own flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use lampwatch_api::realtime::{REALTIME_PATH, ReconnectPolicy};
use lampwatch_core::{ClientConfig, PollIntervals, RealtimeConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Prefix for environment overrides. Nested keys use `__`:
/// `LAMPWATCH_REALTIME__PATH` sets `realtime.path`.
pub const ENV_PREFIX: &str = "LAMPWATCH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Lamp API root, including the `/api` prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Dashboard server root. Analysis commands need it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Default output format for the CLI.
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub realtime: RealtimeSection,

    #[serde(default)]
    pub dashboard: DashboardSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            dashboard_url: None,
            timeout_ms: default_timeout_ms(),
            insecure: false,
            output: default_output(),
            realtime: RealtimeSection::default(),
            dashboard: DashboardSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RealtimeSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_realtime_path")]
    pub path: String,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

impl Default for RealtimeSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_realtime_path(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

/// Poll periods of the dashboard timers, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardSection {
    #[serde(default = "default_data_interval_ms")]
    pub data_interval_ms: u64,

    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,

    #[serde(default = "default_chart_interval_ms")]
    pub chart_interval_ms: u64,

    #[serde(default = "default_record_interval_ms")]
    pub record_interval_ms: u64,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            data_interval_ms: default_data_interval_ms(),
            status_interval_ms: default_status_interval_ms(),
            chart_interval_ms: default_chart_interval_ms(),
            record_interval_ms: default_record_interval_ms(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:5000/api".into()
}
fn default_timeout_ms() -> u64 {
    12_000
}
fn default_output() -> String {
    "table".into()
}
fn default_true() -> bool {
    true
}
fn default_realtime_path() -> String {
    REALTIME_PATH.into()
}
fn default_reconnect_delay_ms() -> u64 {
    3_000
}
fn default_max_reconnect_attempts() -> u32 {
    5
}
fn default_data_interval_ms() -> u64 {
    10_000
}
fn default_status_interval_ms() -> u64 {
    3_000
}
fn default_chart_interval_ms() -> u64 {
    60_000
}
fn default_record_interval_ms() -> u64 {
    15_000
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "lampwatch", "lampwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lampwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `LAMPWATCH_*` variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build the runtime client settings, validating URLs and periods.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        let api_url = parse_url("api_url", &self.api_url)?;
        let dashboard_url = self
            .dashboard_url
            .as_deref()
            .map(|raw| parse_url("dashboard_url", raw))
            .transpose()?;

        let mut client = ClientConfig::new(api_url);
        client.dashboard_url = dashboard_url;
        client.timeout = positive_millis("timeout_ms", self.timeout_ms)?;
        client.accept_invalid_certs = self.insecure;
        client.realtime = RealtimeConfig {
            enabled: self.realtime.enabled,
            path: self.realtime.path.clone(),
            reconnect: ReconnectPolicy {
                delay: Duration::from_millis(self.realtime.reconnect_delay_ms),
                max_attempts: self.realtime.max_reconnect_attempts,
            },
        };
        let d = &self.dashboard;
        client.poll = PollIntervals {
            data: positive_millis("dashboard.data_interval_ms", d.data_interval_ms)?,
            status: positive_millis("dashboard.status_interval_ms", d.status_interval_ms)?,
            chart: positive_millis("dashboard.chart_interval_ms", d.chart_interval_ms)?,
            record: positive_millis("dashboard.record_interval_ms", d.record_interval_ms)?,
        };
        Ok(client)
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL {raw:?}: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected an http or https URL, got {raw:?}"),
        });
    }
    Ok(url)
}

fn positive_millis(field: &str, ms: u64) -> Result<Duration, ConfigError> {
    if ms == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_millis(ms))
}
