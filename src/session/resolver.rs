use async_trait::async_trait;

use crate::error::PortalResult;
use crate::model::User;
use crate::services::AuthService;

/// Exchanges the stored credential for the current user's profile.
/// Fails with `Unauthorized` when no valid credential is attached, `Network` when the
/// call cannot complete. No caching, no retry.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn fetch_current_user(&self) -> PortalResult<User>;
}

#[async_trait]
impl IdentityResolver for AuthService {
    async fn fetch_current_user(&self) -> PortalResult<User> { self.current_user().await }
}
