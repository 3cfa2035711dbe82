//! Profile resolution: cache, identity, mirror, table, metadata fallback.

use std::sync::Arc;

use tracing::{debug, info, warn};

use wastetrack_core::error::ErrorKind;
use wastetrack_core::result::AppResult;
use wastetrack_entity::identity::Identity;

use super::cache::SessionCache;
use super::resolved::ResolvedProfile;
use super::store::ProfileStore;
use crate::identity::tokens::{self, TokenStore};
use crate::identity::IdentityProvider;

/// Resolves the profile of the signed-in identity.
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    identity: Arc<dyn IdentityProvider>,
    tokens: Arc<TokenStore>,
    profiles: Arc<dyn ProfileStore>,
    cache: Arc<SessionCache>,
}

impl ProfileResolver {
    /// Create a resolver over the given collaborators.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        tokens: Arc<TokenStore>,
        profiles: Arc<dyn ProfileStore>,
        cache: Arc<SessionCache>,
    ) -> Self {
        Self {
            identity,
            tokens,
            profiles,
            cache,
        }
    }

    /// Resolve the current profile.
    ///
    /// Without `force_refresh` a fresh cached profile is returned without
    /// any I/O. `Ok(None)` means nobody is signed in; all cached state has
    /// been cleared by then. Errors come only from identity resolution:
    /// a failing profile lookup yields [`ResolvedProfile::Degraded`].
    pub async fn resolve(&self, force_refresh: bool) -> AppResult<Option<ResolvedProfile>> {
        if !force_refresh {
            if let Some((entry, age)) = self.cache.get() {
                debug!(user_id = %entry.profile.id, age_secs = age.as_secs(), "Profile cache hit");
                return Ok(Some(entry.into()));
            }
        }

        let Some(identity) = self.current_identity().await? else {
            self.forget().await;
            return Ok(None);
        };

        if !force_refresh {
            if let Some(entry) = self.cache.load_mirror(identity.id).await {
                debug!(user_id = %identity.id, "Profile restored from session mirror");
                return Ok(Some(entry.into()));
            }
        }

        Ok(Some(self.fetch(&identity).await))
    }

    /// The identity behind the persisted tokens, refreshing an expired
    /// access token first.
    async fn current_identity(&self) -> AppResult<Option<Identity>> {
        let Some(mut session) = self.tokens.load().await? else {
            return Ok(None);
        };

        if tokens::is_expired(&session, self.cache.clock().now()) {
            if session.refresh_token.is_empty() {
                debug!("Access token expired and no refresh token is stored");
                return Ok(None);
            }
            session = match self.identity.refresh_session(&session.refresh_token).await {
                Ok(renewed) => renewed,
                Err(e) if e.is(ErrorKind::Authentication) => {
                    info!(error = %e, "Refresh token rejected");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            self.tokens.save(&session).await?;
        }

        self.identity.get_user(&session.access_token).await
    }

    /// Read the profile row, degrading to identity metadata on failure.
    async fn fetch(&self, identity: &Identity) -> ResolvedProfile {
        let reason = match self.profiles.find_profile(identity.id).await {
            Ok(Some(profile)) => {
                debug!(user_id = %profile.id, role = %profile.role, "Profile loaded");
                self.cache.store(profile.clone(), None).await;
                return ResolvedProfile::Authoritative(profile);
            }
            Ok(None) => "profile row not found".to_string(),
            Err(e) => e.to_string(),
        };

        let profile = identity.fallback_profile();
        warn!(
            user_id = %identity.id,
            role = %profile.role,
            reason = %reason,
            "Profile lookup failed, using identity metadata"
        );
        self.cache.store(profile.clone(), Some(reason.clone())).await;
        ResolvedProfile::Degraded { profile, reason }
    }

    async fn forget(&self) {
        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Failed to clear session cache");
        }
        if let Err(e) = self.tokens.clear().await {
            warn!(error = %e, "Failed to clear auth session");
        }
    }
}
