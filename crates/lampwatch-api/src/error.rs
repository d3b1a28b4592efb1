use thiserror::Error;

/// Top-level error type for the `lampwatch-api` crate.
///
/// Every failure is classified once, at the transport boundary, so callers
/// never have to inspect several fields to learn whether a request was
/// canceled or timed out: match on the variant or ask [`Error::kind`].
/// `lampwatch-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Classified outcomes ─────────────────────────────────────────
    /// The request was abandoned through its cancellation token
    /// (bulk `cancel_all`, or a caller-supplied token).
    #[error("Request canceled: {reason}")]
    Canceled { reason: String },

    /// The request did not settle within the configured timeout.
    #[error("Request to {path} timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u64 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status from the server.
    #[error("HTTP {status} from {path}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    // ── Dashboard envelope ──────────────────────────────────────────
    /// The dashboard server answered `{status: "error", message}`.
    #[error("Server reported {status}: {message}")]
    Envelope { status: String, message: String },

    // ── Realtime channel ────────────────────────────────────────────
    /// Opening the realtime channel failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// The realtime stream ended or failed after it was established.
    #[error("WebSocket closed: {0}")]
    WebSocketClosed(String),

    /// `send` was called while the channel was not connected.
    #[error("Realtime channel is not connected")]
    ChannelNotConnected,

    /// The reconnect budget for the current failure streak is spent.
    #[error("Realtime reconnect gave up after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Outbound payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification used for logging and caller branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Silent outcome; callers should treat it as "nothing happened".
    Canceled,
    /// Non-fatal, logged at warning level.
    Timeout,
    /// Everything else; logged at error level and surfaced.
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Canceled { .. } => ErrorKind::Canceled,
            Self::Timeout { .. } => ErrorKind::Timeout,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }
}
