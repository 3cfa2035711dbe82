//! Identity provider trait.

use async_trait::async_trait;

use wastetrack_core::result::AppResult;
use wastetrack_entity::identity::{AuthSession, Identity};

/// The auth surface of the hosted backend.
///
/// Failures that concern the credentials themselves are reported as
/// `Authentication` (or `RateLimit`) errors built from
/// [`AuthFailure`](super::AuthFailure).
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Exchange email and password for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// Exchange a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> AppResult<AuthSession>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;

    /// The identity behind `access_token`, or `None` if the service no
    /// longer accepts the token.
    async fn get_user(&self, access_token: &str) -> AppResult<Option<Identity>>;
}
