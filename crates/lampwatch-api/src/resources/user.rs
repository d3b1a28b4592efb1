use serde::Serialize;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Ack, NotificationSettings, UserInfo};

impl ApiClient {
    /// `GET /user/info`
    pub async fn user_info(&self) -> Result<UserInfo, Error> {
        self.get("/user/info").await
    }

    /// `POST /user/settings`
    pub async fn update_user_settings(
        &self,
        settings: &(impl Serialize + Sync),
    ) -> Result<Ack, Error> {
        self.post("/user/settings", settings).await
    }

    /// `GET /user/notifications`
    pub async fn notification_settings(&self) -> Result<NotificationSettings, Error> {
        self.get("/user/notifications").await
    }

    /// `POST /user/notifications`
    pub async fn update_notification_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<Ack, Error> {
        self.post("/user/notifications", settings).await
    }
}
