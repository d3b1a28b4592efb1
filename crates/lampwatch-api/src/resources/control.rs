// Light control commands.

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Ack;

impl ApiClient {
    /// Set brightness, 0-100.
    ///
    /// `POST /control/light/brightness` with `{"brightness": N}`
    pub async fn set_light_brightness(&self, brightness: u8) -> Result<Ack, Error> {
        debug!(brightness, "setting light brightness");
        self.post("/control/light/brightness", &json!({ "brightness": brightness }))
            .await
    }

    /// Set colour temperature in kelvin (the server accepts 2700-6500).
    ///
    /// `POST /control/light/color` with `{"colorTemperature": K}`
    pub async fn set_light_color(&self, kelvin: u32) -> Result<Ack, Error> {
        debug!(kelvin, "setting light color temperature");
        self.post("/control/light/color", &json!({ "colorTemperature": kelvin }))
            .await
    }

    /// `POST /control/light/power` with `{"power": bool}`
    pub async fn set_light_power(&self, power: bool) -> Result<Ack, Error> {
        debug!(power, "setting light power");
        self.post("/control/light/power", &json!({ "power": power }))
            .await
    }
}
