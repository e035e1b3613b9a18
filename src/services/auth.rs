use crate::api::{ApiClient, AuthMode};
use crate::error::PortalResult;
use crate::model::{LoginRequest, RegisterRequest, Token, User};

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self { Self { api } }

    /// OAuth2 password flow: form-encoded `username`/`password` for a bearer token.
    pub async fn login(&self, req: &LoginRequest) -> PortalResult<Token> {
        self.api
            .post_form("auth/token", &[("username", req.username.as_str()), ("password", req.password.as_str())])
            .await
    }

    pub async fn register(&self, req: &RegisterRequest) -> PortalResult<User> {
        self.api.post_json("auth/register", req).await
    }

    /// Profile for the stored credential; `Unauthorized` without one.
    pub async fn current_user(&self) -> PortalResult<User> {
        self.api.get_json("auth/me", &[], AuthMode::Required).await
    }
}
