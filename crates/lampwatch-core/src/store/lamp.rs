use lampwatch_api::ApiClient;
use lampwatch_api::models::LampStatus;
use strum::{Display, EnumString};
use tokio::sync::watch;
use tracing::info;

use super::fallback;
use super::{Outcome, Resource, Slot, outcome};

/// Which voiced reminder to trigger on the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Reminder {
    Vision,
    Posture,
}

/// Physical lamp link status and reminders.
#[derive(Debug)]
pub struct LampStore {
    api: ApiClient,
    status: Slot<Option<LampStatus>>,
}

impl LampStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            status: Slot::new(None),
        }
    }

    pub fn status(&self) -> Resource<Option<LampStatus>> {
        self.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<Resource<Option<LampStatus>>> {
        self.status.subscribe()
    }

    pub async fn fetch_status(&self) -> Option<LampStatus> {
        let _loading = self.status.begin();
        match outcome(self.api.lamp_status().await, "lamp status") {
            Outcome::Fresh(status) => self.status.replace(Some(status)),
            Outcome::Failed => self.status.fail(fallback::LAMP_STATUS_ERROR),
            Outcome::Canceled => {}
        }
        self.status.value()
    }

    /// Trigger a reminder; `true` when the lamp reported success.
    pub async fn remind(&self, kind: Reminder) -> bool {
        let result = match kind {
            Reminder::Vision => self.api.send_vision_reminder().await,
            Reminder::Posture => self.api.send_posture_reminder().await,
        };
        match outcome(result, "lamp reminder") {
            Outcome::Fresh(reply) if reply.success => {
                info!(%kind, "reminder sent");
                true
            }
            Outcome::Fresh(_) | Outcome::Failed => {
                self.status.fail(fallback::REMINDER_ERROR);
                false
            }
            Outcome::Canceled => false,
        }
    }
}
