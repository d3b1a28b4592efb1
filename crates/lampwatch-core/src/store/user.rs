use lampwatch_api::ApiClient;
use lampwatch_api::models::{NotificationSettings, UserInfo};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use super::fallback;
use super::{Outcome, Resource, Slot, outcome};

/// Account profile and notification preferences. Neither has a synthetic
/// fallback: a failed fetch keeps the previous value and records an error.
#[derive(Debug)]
pub struct UserStore {
    api: ApiClient,
    info: Slot<Option<UserInfo>>,
    notifications: Slot<Option<NotificationSettings>>,
}

impl UserStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            info: Slot::new(None),
            notifications: Slot::new(None),
        }
    }

    pub fn info(&self) -> Resource<Option<UserInfo>> {
        self.info.get()
    }

    pub fn notifications(&self) -> Resource<Option<NotificationSettings>> {
        self.notifications.get()
    }

    pub fn subscribe_notifications(
        &self,
    ) -> watch::Receiver<Resource<Option<NotificationSettings>>> {
        self.notifications.subscribe()
    }

    pub async fn fetch_info(&self) -> Option<UserInfo> {
        let _loading = self.info.begin();
        match outcome(self.api.user_info().await, "user info") {
            Outcome::Fresh(info) => self.info.replace(Some(info)),
            Outcome::Failed => self.info.fail(fallback::USER_INFO_ERROR),
            Outcome::Canceled => {}
        }
        self.info.value()
    }

    /// Push profile changes; `true` when the server accepted them.
    pub async fn update_settings(&self, settings: &(impl Serialize + Sync)) -> bool {
        let _loading = self.info.begin();
        match outcome(self.api.update_user_settings(settings).await, "update user") {
            Outcome::Fresh(ack) if ack.success != Some(false) => true,
            Outcome::Fresh(_) | Outcome::Failed => {
                self.info.fail(fallback::UPDATE_USER_ERROR);
                false
            }
            Outcome::Canceled => false,
        }
    }

    pub async fn fetch_notifications(&self) -> Option<NotificationSettings> {
        let _loading = self.notifications.begin();
        match outcome(self.api.notification_settings().await, "notifications") {
            Outcome::Fresh(settings) => self.notifications.replace(Some(settings)),
            Outcome::Failed => self.notifications.fail(fallback::NOTIFICATIONS_ERROR),
            Outcome::Canceled => {}
        }
        self.notifications.value()
    }

    /// Replace the notification preferences once the server accepts them.
    pub async fn update_notifications(&self, settings: NotificationSettings) -> bool {
        let _loading = self.notifications.begin();
        match outcome(
            self.api.update_notification_settings(&settings).await,
            "update notifications",
        ) {
            Outcome::Fresh(ack) if ack.success != Some(false) => {
                info!(interval = settings.reminder_interval, "notification settings updated");
                self.notifications.replace(Some(settings));
                true
            }
            Outcome::Fresh(_) | Outcome::Failed => {
                self.notifications.fail(fallback::UPDATE_NOTIFICATIONS_ERROR);
                false
            }
            Outcome::Canceled => false,
        }
    }
}
