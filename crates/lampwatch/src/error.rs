//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use lampwatch_config::ConfigError;
use lampwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the lamp server at {url}")]
    #[diagnostic(
        code(lampwatch::connection_failed),
        help(
            "Check that the lamp backend is running and reachable.\n\
             Set the address with --api-url or `api_url` in the config file."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_ms}ms ({path})")]
    #[diagnostic(
        code(lampwatch::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout { path: String, timeout_ms: u64 },

    #[error("Realtime channel unavailable: {reason}")]
    #[diagnostic(code(lampwatch::realtime))]
    Realtime { reason: String },

    // ── Server ───────────────────────────────────────────────────────
    #[error("Not found on the server: {path}")]
    #[diagnostic(code(lampwatch::not_found))]
    NotFound { path: String },

    #[error("Rejected by the server: {message}")]
    #[diagnostic(code(lampwatch::rejected))]
    Rejected { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(lampwatch::api_error))]
    ApiError { message: String },

    /// A store recorded `message` and had no value to show.
    #[error("{message}")]
    #[diagnostic(code(lampwatch::unavailable))]
    Unavailable { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No dashboard server configured")]
    #[diagnostic(
        code(lampwatch::no_dashboard),
        help(
            "Pass --dashboard-url, set LAMPWATCH_DASHBOARD_URL, or add\n\
             `dashboard_url` to {path}"
        )
    )]
    NoDashboard { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lampwatch::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(lampwatch::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(lampwatch::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Realtime { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NoDashboard { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { path, timeout_ms } => CliError::Timeout { path, timeout_ms },
            CoreError::Realtime { reason } => CliError::Realtime { reason },
            CoreError::NotFound { path } => CliError::NotFound { path },
            CoreError::Rejected { message } => CliError::Rejected { message },
            CoreError::Api { message, .. }
            | CoreError::Internal(message)
            | CoreError::Canceled { reason: message } => CliError::ApiError { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::DashboardNotConfigured => CliError::NoDashboard {
                path: lampwatch_config::config_path().display().to_string(),
            },
        }
    }
}
