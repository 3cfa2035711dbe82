//! Persisted auth session (access and refresh tokens).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use wastetrack_cache::StorageManager;
use wastetrack_core::result::AppResult;
use wastetrack_core::traits::storage::SessionStorage;
use wastetrack_entity::identity::AuthSession;

/// Keeps the tokens of the signed-in identity under a single storage key.
#[derive(Debug, Clone)]
pub struct TokenStore {
    storage: Arc<StorageManager>,
    key: String,
}

impl TokenStore {
    /// Create a store writing under `key`.
    pub fn new(storage: Arc<StorageManager>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The persisted session, if any.
    ///
    /// An unreadable entry is removed and reported as absent.
    pub async fn load(&self) -> AppResult<Option<AuthSession>> {
        let Some(raw) = self.storage.get(&self.key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable auth session");
                self.storage.delete(&self.key).await?;
                Ok(None)
            }
        }
    }

    /// Persist `session`, replacing the previous one.
    pub async fn save(&self, session: &AuthSession) -> AppResult<()> {
        self.storage.set_json(&self.key, session).await?;
        debug!(user_id = %session.identity.id, "Persisted auth session");
        Ok(())
    }

    /// Forget the persisted session.
    pub async fn clear(&self) -> AppResult<()> {
        self.storage.delete(&self.key).await
    }
}

/// Whether the access token of `session` is expired at `now`.
///
/// Sessions without an expiry never expire locally; the identity service
/// still has the final word.
pub fn is_expired(session: &AuthSession, now: DateTime<Utc>) -> bool {
    session
        .expires_at
        .is_some_and(|expires_at| expires_at <= now.timestamp())
}
