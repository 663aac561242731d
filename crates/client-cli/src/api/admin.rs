use reqwest::Method;
use shared::{AdminUser, ApiKeyStatus, KeyRotation, Message, Page, SystemStats};

use super::{ApiClient, ApiResult};

/// `/admin` endpoints (superusers only)
pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> ApiResult<SystemStats> {
        self.client.get("/admin/stats").await
    }

    pub async fn api_key_status(&self) -> ApiResult<ApiKeyStatus> {
        self.client.get("/admin/api-keys/status").await
    }

    /// Force rotation to the next upstream API key
    pub async fn rotate_api_key(&self) -> ApiResult<KeyRotation> {
        self.client.call(Method::POST, "/admin/api-keys/rotate").await
    }

    /// `key_index` is 1-based
    pub async fn reset_api_key(&self, key_index: u32) -> ApiResult<Message> {
        self.client
            .call(Method::POST, &format!("/admin/api-keys/{}/reset", key_index))
            .await
    }

    pub async fn users(&self, page: Page) -> ApiResult<Vec<AdminUser>> {
        self.client.get_query("/admin/users", &page).await
    }

    pub async fn toggle_user_active(&self, user_id: i64) -> ApiResult<Message> {
        self.client
            .call(Method::PUT, &format!("/admin/users/{}/toggle-active", user_id))
            .await
    }
}
