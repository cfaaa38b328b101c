//! Backend contract consumed by the session subsystem.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::wire::{LoginResponse, RefreshResponse, UserRoleResponse};

/// The narrow slice of the REST API the session lifecycle depends on.
///
/// Implementations map a `401` answer to
/// [`ErrorKind::Authentication`](crate::error::ErrorKind::Authentication),
/// other non-success answers to `ExternalService`, and transport failures
/// to `Network`.
#[async_trait]
pub trait AuthApi: Send + Sync + std::fmt::Debug + 'static {
    /// Exchange credentials for a bearer token and profile.
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse>;

    /// Exchange the ambient refresh credential for a new bearer token.
    ///
    /// No token is passed: the credential travels with the transport (cookie).
    async fn refresh(&self) -> AppResult<RefreshResponse>;

    /// Fetch the authoritative record for a user, including its role.
    async fn fetch_user(&self, user_id: &str, token: &str) -> AppResult<UserRoleResponse>;

    /// Tell the backend the session is over. Best effort.
    async fn logout(&self, token: &str) -> AppResult<()>;
}
