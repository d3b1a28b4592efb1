// ── Session ──
//
// One application lifetime: the API clients (sharing one in-flight
// registry), the stores, the realtime channel feeding `MonitorStore`, and
// the dashboard poller. Constructed once and passed around; nothing here
// is global.

use std::sync::Arc;

use lampwatch_api::realtime::{ChannelManager, Connector, ListenerHandle, realtime_url};
use lampwatch_api::{ApiClient, InflightRegistry};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::dashboard::DashboardPoller;
use crate::error::CoreError;
use crate::store::{DeviceStore, LampStore, MonitorStore, UserStore};

pub struct Session {
    config: ClientConfig,
    inflight: InflightRegistry,
    api: ApiClient,
    device: Arc<DeviceStore>,
    monitor: Arc<MonitorStore>,
    user: Arc<UserStore>,
    lamp: Arc<LampStore>,
    realtime: Option<Realtime>,
    dashboard: Option<DashboardPoller>,
}

struct Realtime {
    channel: ChannelManager,
    listener: ListenerHandle,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_url", &self.config.api_url.as_str())
            .field("realtime", &self.realtime.as_ref().map(|r| &r.channel))
            .field("dashboard", &self.dashboard)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session over a real WebSocket channel.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        Self::build(config, None)
    }

    /// Build a session whose realtime channel opens through `connector`.
    pub fn with_connector(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, CoreError> {
        Self::build(config, Some(connector))
    }

    fn build(config: ClientConfig, connector: Option<Arc<dyn Connector>>) -> Result<Self, CoreError> {
        let inflight = InflightRegistry::new();
        let transport = config.transport();
        let api = ApiClient::new(config.api_url.clone(), &transport, inflight.clone())?;

        let device = Arc::new(DeviceStore::new(api.clone()));
        let monitor = Arc::new(MonitorStore::new(api.clone()));
        let user = Arc::new(UserStore::new(api.clone()));
        let lamp = Arc::new(LampStore::new(api.clone()));

        let realtime = if config.realtime.enabled {
            let url = realtime_url(&config.api_url, &config.realtime.path)?;
            let policy = config.realtime.reconnect.clone();
            let channel = match connector {
                Some(connector) => ChannelManager::new(url, connector, policy),
                None => ChannelManager::websocket(url, policy),
            };
            let sink = Arc::clone(&monitor);
            let listener = channel.add_listener(move |msg| {
                sink.update_from_realtime(msg);
                Ok(())
            });
            Some(Realtime { channel, listener })
        } else {
            None
        };

        let dashboard = match &config.dashboard_url {
            Some(url) => {
                let client = ApiClient::new(url.clone(), &transport, inflight.clone())?;
                Some(DashboardPoller::new(client, config.poll))
            }
            None => None,
        };

        debug!(
            api_url = %config.api_url,
            realtime = realtime.is_some(),
            dashboard = dashboard.is_some(),
            "session created"
        );

        Ok(Self {
            config,
            inflight,
            api,
            device,
            monitor,
            user,
            lamp,
            realtime,
            dashboard,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn device(&self) -> &Arc<DeviceStore> {
        &self.device
    }

    pub fn monitor(&self) -> &Arc<MonitorStore> {
        &self.monitor
    }

    pub fn user(&self) -> &Arc<UserStore> {
        &self.user
    }

    pub fn lamp(&self) -> &Arc<LampStore> {
        &self.lamp
    }

    pub fn channel(&self) -> Option<&ChannelManager> {
        self.realtime.as_ref().map(|r| &r.channel)
    }

    pub fn dashboard(&self) -> Result<&DashboardPoller, CoreError> {
        self.dashboard.as_ref().ok_or(CoreError::DashboardNotConfigured)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open the realtime channel, if one is configured.
    pub fn connect_realtime(&self) {
        if let Some(realtime) = &self.realtime {
            realtime.channel.connect();
        }
    }

    /// Abandon every outstanding request (e.g. on navigation). Stores see
    /// the outcome as canceled and keep their values.
    pub fn cancel_pending(&self, reason: &str) -> usize {
        let canceled = self.inflight.cancel_all(reason);
        if canceled > 0 {
            info!(canceled, reason, "canceled pending requests");
        }
        canceled
    }

    /// Load every store once, concurrently.
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.device.fetch_status(),
            self.device.fetch_settings(),
            self.monitor.fetch_posture(),
            self.monitor.fetch_eye(),
            self.monitor.fetch_emotion(),
        );
    }

    /// Stop timers, close the channel and abandon pending requests.
    pub fn shutdown(&self) {
        if let Some(poller) = &self.dashboard {
            poller.stop_all();
        }
        if let Some(realtime) = &self.realtime {
            realtime.listener.unregister();
            realtime.channel.disconnect();
        }
        self.cancel_pending("shutdown");
        info!("session shut down");
    }
}
