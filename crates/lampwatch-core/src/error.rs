// ── Core error types ──
//
// User-facing errors from lampwatch-core. Consumers never see HTTP status
// codes or JSON parse failures directly; `From<lampwatch_api::Error>`
// translates transport-layer errors into these variants.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the lamp server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_ms}ms ({path})")]
    Timeout { path: String, timeout_ms: u64 },

    #[error("Request canceled: {reason}")]
    Canceled { reason: String },

    #[error("Realtime channel unavailable: {reason}")]
    Realtime { reason: String },

    // ── Server errors ────────────────────────────────────────────────
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Operation rejected by server: {message}")]
    Rejected { message: String },

    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Dashboard server is not configured")]
    DashboardNotConfigured,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` for outcomes a caller should treat as "nothing happened".
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lampwatch_api::Error> for CoreError {
    fn from(err: lampwatch_api::Error) -> Self {
        use lampwatch_api::Error as Api;

        match err {
            Api::Canceled { reason } => CoreError::Canceled { reason },
            Api::Timeout { path, timeout_ms } => CoreError::Timeout { path, timeout_ms },
            Api::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Status { status: 404, path, .. } => CoreError::NotFound { path },
            Api::Status { status, path, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status} from {path}")
                } else {
                    format!("HTTP {status} from {path}: {body}")
                },
                status: Some(status),
            },
            Api::Envelope { message, .. } => CoreError::Rejected { message },
            Api::WebSocketConnect(reason) | Api::WebSocketClosed(reason) => {
                CoreError::Realtime { reason }
            }
            Api::ChannelNotConnected => CoreError::Realtime {
                reason: "not connected".into(),
            },
            Api::ReconnectExhausted { attempts } => CoreError::Realtime {
                reason: format!("gave up after {attempts} reconnect attempts"),
            },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            Api::Serialization(e) => CoreError::Internal(format!("Serialization error: {e}")),
        }
    }
}
