// Device endpoints: identity, liveness, and light settings.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Ack, DeviceInfo, DeviceSettings, DeviceSettingsPatch, DeviceStatus};

impl ApiClient {
    /// `GET /device-info`
    pub async fn device_info(&self) -> Result<DeviceInfo, Error> {
        self.get("/device-info").await
    }

    /// `GET /device/status`
    pub async fn device_status(&self) -> Result<DeviceStatus, Error> {
        self.get("/device/status").await
    }

    /// `GET /device/settings`
    pub async fn device_settings(&self) -> Result<DeviceSettings, Error> {
        self.get("/device/settings").await
    }

    /// Push a partial settings update.
    ///
    /// `POST /device/settings`
    pub async fn update_device_settings(&self, patch: &DeviceSettingsPatch) -> Result<Ack, Error> {
        debug!(?patch, "updating device settings");
        self.post("/device/settings", patch).await
    }
}
