use reqwest::Method;
use shared::{LoginForm, NewAccount, TokenResponse, User};

use super::{ApiClient, ApiResult};

/// `/auth` endpoints
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Exchange username/email and password for a bearer token.
    /// POST /auth/login (form-encoded)
    pub async fn login(&self, form: &LoginForm) -> ApiResult<TokenResponse> {
        let request = self.client.request(Method::POST, "/auth/login").form(form);
        self.client.send_json(request).await
    }

    /// POST /auth/register
    pub async fn register(&self, account: &NewAccount) -> ApiResult<User> {
        self.client.post_json("/auth/register", account).await
    }

    /// GET /auth/me
    pub async fn me(&self) -> ApiResult<User> {
        self.client.get("/auth/me").await
    }
}
