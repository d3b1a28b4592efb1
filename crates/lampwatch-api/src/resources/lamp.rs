// Physical lamp endpoints (serial-port status and voiced reminders).

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{LampStatus, ReminderResponse};

impl ApiClient {
    /// `GET /lamp/status`
    pub async fn lamp_status(&self) -> Result<LampStatus, Error> {
        self.get("/lamp/status").await
    }

    /// Ask the lamp to remind the user to look into the distance.
    ///
    /// `POST /lamp/reminder/vision`
    pub async fn send_vision_reminder(&self) -> Result<ReminderResponse, Error> {
        debug!("triggering vision reminder");
        self.post_empty("/lamp/reminder/vision").await
    }

    /// Ask the lamp to remind the user to get up.
    ///
    /// `POST /lamp/reminder/posture`
    pub async fn send_posture_reminder(&self) -> Result<ReminderResponse, Error> {
        debug!("triggering posture reminder");
        self.post_empty("/lamp/reminder/posture").await
    }
}
