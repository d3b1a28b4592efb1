// ── Runtime client configuration ──
//
// Describes *where* the lamp and dashboard servers live and how often to
// poll them. Never touches disk: the CLI (via lampwatch-config) builds a
// `ClientConfig` and hands it to `Session`.

use std::time::Duration;

use lampwatch_api::TransportConfig;
use lampwatch_api::realtime::{REALTIME_PATH, ReconnectPolicy};
use lampwatch_api::transport::DEFAULT_TIMEOUT;
use url::Url;

/// Everything a [`Session`](crate::Session) needs to talk to the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Lamp API root, e.g. `http://lamp.local:5000/api`.
    pub api_url: Url,
    /// Dashboard server root. `None` disables the poller and analysis
    /// controls.
    pub dashboard_url: Option<Url>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Accept self-signed certificates.
    pub accept_invalid_certs: bool,
    pub realtime: RealtimeConfig,
    pub poll: PollIntervals,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            dashboard_url: None,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
            realtime: RealtimeConfig::default(),
            poll: PollIntervals::default(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

/// Realtime channel settings.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Set to `false` to run on REST alone.
    pub enabled: bool,
    /// Endpoint path on the API host.
    pub path: String,
    pub reconnect: ReconnectPolicy,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: REALTIME_PATH.into(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Dashboard poll timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    /// Dashboard snapshot into the chart windows. Default: 10s.
    pub data: Duration,
    /// Pose status into the status cell. Default: 3s.
    pub status: Duration,
    /// Series snapshots for the history charts. Default: 60s.
    pub chart: Duration,
    /// `record_analysis` heartbeat. Default: 15s.
    pub record: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            data: Duration::from_secs(10),
            status: Duration::from_secs(3),
            chart: Duration::from_secs(60),
            record: Duration::from_secs(15),
        }
    }
}
