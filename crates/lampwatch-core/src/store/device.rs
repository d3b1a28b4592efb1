use chrono::Utc;
use lampwatch_api::ApiClient;
use lampwatch_api::models::{DeviceInfo, DeviceSettings, DeviceSettingsPatch, DeviceStatus};
use tokio::sync::watch;
use tracing::{info, warn};

use super::fallback;
use super::{Outcome, Resource, Slot, outcome};

/// Device identity, power/battery status and light settings.
#[derive(Debug)]
pub struct DeviceStore {
    api: ApiClient,
    info: Slot<Option<DeviceInfo>>,
    status: Slot<DeviceStatus>,
    settings: Slot<DeviceSettings>,
}

impl DeviceStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            info: Slot::new(None),
            status: Slot::new(DeviceStatus::default()),
            settings: Slot::new(DeviceSettings::default()),
        }
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn info(&self) -> Resource<Option<DeviceInfo>> {
        self.info.get()
    }

    pub fn status(&self) -> Resource<DeviceStatus> {
        self.status.get()
    }

    pub fn settings(&self) -> Resource<DeviceSettings> {
        self.settings.get()
    }

    pub fn subscribe_info(&self) -> watch::Receiver<Resource<Option<DeviceInfo>>> {
        self.info.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<Resource<DeviceStatus>> {
        self.status.subscribe()
    }

    pub fn subscribe_settings(&self) -> watch::Receiver<Resource<DeviceSettings>> {
        self.settings.subscribe()
    }

    // ── Derived ──────────────────────────────────────────────────────

    pub fn is_online(&self) -> bool {
        self.status.get().value.online
    }

    pub fn battery_percentage(&self) -> Option<u8> {
        self.status.get().value.battery_level
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Device identity. There is no synthetic identity to fall back to.
    pub async fn fetch_info(&self) -> Option<DeviceInfo> {
        let _loading = self.info.begin();
        match outcome(self.api.device_info().await, "device info") {
            Outcome::Fresh(info) => self.info.replace(Some(info)),
            Outcome::Failed => self.info.fail(fallback::DEVICE_INFO_ERROR),
            Outcome::Canceled => {}
        }
        self.info.value()
    }

    pub async fn fetch_status(&self) -> DeviceStatus {
        let _loading = self.status.begin();
        match outcome(self.api.device_status().await, "device status") {
            Outcome::Fresh(status) => self.status.replace(status),
            Outcome::Failed => self.status.fall_back(
                fallback::device_status(Utc::now()),
                fallback::DEVICE_STATUS_ERROR,
            ),
            Outcome::Canceled => {}
        }
        self.status.value()
    }

    pub async fn fetch_settings(&self) -> DeviceSettings {
        let _loading = self.settings.begin();
        match outcome(self.api.device_settings().await, "device settings") {
            Outcome::Fresh(settings) => self.settings.replace(settings),
            Outcome::Failed => self.settings.fall_back(
                fallback::device_settings(),
                fallback::DEVICE_SETTINGS_ERROR,
            ),
            Outcome::Canceled => {}
        }
        self.settings.value()
    }

    /// Send `patch` and merge it locally once the server has accepted it.
    ///
    /// A rejected or failed write records an error and leaves the cached
    /// settings as they were; nothing is merged ahead of the reply, so
    /// there is nothing to roll back.
    pub async fn update_settings(&self, patch: &DeviceSettingsPatch) -> DeviceSettings {
        let _loading = self.settings.begin();
        match outcome(self.api.update_device_settings(patch).await, "update settings") {
            Outcome::Fresh(ack) if ack.success == Some(false) => {
                warn!(message = ?ack.message, "device settings update rejected");
                self.settings.fail(fallback::UPDATE_SETTINGS_ERROR);
            }
            Outcome::Fresh(_) => {
                self.settings.update(|s| s.merge(patch));
                info!(?patch, "device settings updated");
            }
            Outcome::Failed => self.settings.fail(fallback::UPDATE_SETTINGS_ERROR),
            Outcome::Canceled => {}
        }
        self.settings.value()
    }
}
