//! Session lifecycle manager: sign-in, sign-out, resolution, profile updates.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use wastetrack_cache::StorageManager;
use wastetrack_core::config::SessionConfig;
use wastetrack_core::error::{AppError, ErrorKind};
use wastetrack_core::result::AppResult;
use wastetrack_core::traits::clock::Clock;
use wastetrack_entity::navigation::NavigationItem;
use wastetrack_entity::permission::{PermissionAction, RolePermission, module};
use wastetrack_entity::user::{ProfileUpdate, UserProfile};

use super::state::{Freshness, SessionState};
use crate::identity::{AuthFailure, IdentityProvider, TokenStore};
use crate::profile::{ProfileResolver, ProfileStore, ResolvedProfile, SessionCache};
use crate::rbac::{AccessPolicy, PermissionLoader, PermissionSource};

/// Owns the session of one operator.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    tokens: Arc<TokenStore>,
    cache: Arc<SessionCache>,
    resolver: ProfileResolver,
    profiles: Arc<dyn ProfileStore>,
    permissions: PermissionLoader,
    policy: AccessPolicy,
    state: watch::Sender<SessionState>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.borrow())
            .field("policy", &self.policy)
            .finish()
    }
}

impl SessionManager {
    /// Wire a manager from its collaborators.
    pub fn new(
        config: &SessionConfig,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        permissions: Arc<dyn PermissionSource>,
        storage: Arc<StorageManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = Arc::new(TokenStore::new(storage.clone(), config.auth_key.clone()));
        let cache = Arc::new(SessionCache::new(config, storage, clock));
        let resolver = ProfileResolver::new(
            identity.clone(),
            tokens.clone(),
            profiles.clone(),
            cache.clone(),
        );
        let (state, _) = watch::channel(SessionState::Anonymous);

        Self {
            identity,
            tokens,
            cache,
            resolver,
            profiles,
            permissions: PermissionLoader::new(permissions),
            policy: AccessPolicy::new(config),
            state,
        }
    }

    /// Current lifecycle state, with freshness evaluated now.
    pub fn state(&self) -> SessionState {
        let fresh = self.cache.peek().is_some_and(|entry| self.cache.is_fresh(&entry));
        self.state.send_if_modified(|state| match state {
            SessionState::Authenticated { freshness, .. } => {
                let next = if fresh { Freshness::Fresh } else { Freshness::Stale };
                let changed = *freshness != next;
                *freshness = next;
                changed
            }
            _ => false,
        });
        self.state.borrow().clone()
    }

    /// Receive every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The policy applied by [`Self::authorize`].
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Sign in with email and password and resolve the profile.
    ///
    /// Inactive accounts are signed out again and rejected.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<ResolvedProfile> {
        let email = email.trim();
        validate_credentials(email, password)?;

        self.set_state(SessionState::Resolving);
        match self.try_sign_in(email, password).await {
            Ok(resolved) => Ok(resolved),
            Err(e) => {
                self.set_state(SessionState::Anonymous);
                Err(e)
            }
        }
    }

    async fn try_sign_in(&self, email: &str, password: &str) -> AppResult<ResolvedProfile> {
        let session = self.identity.sign_in_with_password(email, password).await?;

        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Failed to clear previous session cache");
        }
        self.tokens.save(&session).await?;

        let resolved = self
            .resolver
            .resolve(true)
            .await?
            .ok_or_else(|| AppError::authentication("Identity rejected right after sign-in"))?;

        if !resolved.profile().active {
            warn!(user_id = %resolved.profile().id, "Sign-in refused for inactive account");
            if let Err(e) = self.sign_out().await {
                warn!(error = %e, "Failed to revoke session of inactive account");
            }
            return Err(AuthFailure::AccountDisabled.into());
        }

        info!(
            user_id = %resolved.profile().id,
            role = %resolved.profile().role,
            degraded = resolved.is_degraded(),
            "Signed in"
        );
        self.publish(&resolved);
        Ok(resolved)
    }

    /// Sign out.
    ///
    /// Local state (memory slot, mirror, tokens) is cleared before the
    /// identity service is called, so a failed remote call still leaves
    /// this process signed out.
    pub async fn sign_out(&self) -> AppResult<()> {
        let session = match self.tokens.load().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to read auth session during sign-out");
                None
            }
        };

        let local = self.clear_local().await;
        self.set_state(SessionState::Anonymous);

        if let Some(session) = session {
            self.identity.sign_out(&session.access_token).await?;
            info!(user_id = %session.identity.id, "Signed out");
        }
        local
    }

    /// The current user, from cache when fresh unless `force_refresh`.
    pub async fn current_user(&self, force_refresh: bool) -> AppResult<Option<ResolvedProfile>> {
        let cached = !force_refresh && self.cache.get().is_some();
        if !cached {
            self.set_state(SessionState::Resolving);
        }

        match self.resolver.resolve(force_refresh).await {
            Ok(Some(resolved)) => {
                self.publish(&resolved);
                Ok(Some(resolved))
            }
            Ok(None) => {
                self.set_state(SessionState::Anonymous);
                Ok(None)
            }
            Err(e) if e.is(ErrorKind::Authentication) => {
                if let Err(clear) = self.clear_local().await {
                    warn!(error = %clear, "Failed to clear session after identity rejection");
                }
                self.set_state(SessionState::Anonymous);
                Err(e)
            }
            Err(e) => {
                self.restore_state();
                Err(e)
            }
        }
    }

    /// Force a round-trip to the backend.
    pub async fn refresh(&self) -> AppResult<Option<ResolvedProfile>> {
        self.current_user(true).await
    }

    /// Permission rows of the current user's role. Empty when signed out.
    pub async fn permissions(&self) -> AppResult<Vec<RolePermission>> {
        Ok(match self.current_user(false).await? {
            Some(user) => self.permissions.load_permissions(user.profile().role).await,
            None => Vec::new(),
        })
    }

    /// Whether the current user may perform `action` on `module`.
    pub async fn can(&self, action: PermissionAction, module: &str) -> AppResult<bool> {
        let user = self.current_user(false).await?;
        let rows = self.rows_for(user.as_ref()).await;
        Ok(self.policy.can(user.as_ref(), &rows, action, module))
    }

    /// Fail with `Authorization` unless the current user may perform
    /// `action` on `module`.
    pub async fn authorize(&self, action: PermissionAction, module: &str) -> AppResult<()> {
        let user = self.current_user(false).await?;
        let rows = self.rows_for(user.as_ref()).await;
        self.policy.require(user.as_ref(), &rows, action, module)
    }

    /// The entries of `items` the current user may see.
    pub async fn navigation<'a>(
        &self,
        items: &'a [NavigationItem],
    ) -> AppResult<Vec<&'a NavigationItem>> {
        let user = self.current_user(false).await?;
        let rows = self.rows_for(user.as_ref()).await;
        Ok(self.policy.visible_navigation(user.as_ref(), &rows, items))
    }

    /// Patch a profile if `expected_version` is still current.
    ///
    /// Requires write access to the users module. The cached profile is
    /// dropped when it is the one being changed.
    pub async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfileUpdate,
        expected_version: i64,
    ) -> AppResult<UserProfile> {
        patch
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid profile update: {e}")))?;
        if patch.is_empty() {
            return Err(AppError::validation("Profile update changes nothing"));
        }
        self.authorize(PermissionAction::Write, module::USERS).await?;

        let updated = self
            .profiles
            .update_profile(id, patch, expected_version)
            .await?;
        info!(user_id = %id, version = updated.version, "Profile updated");
        self.invalidate_if_current(id).await;
        Ok(updated)
    }

    /// Activate or deactivate an account if `expected_version` is still current.
    pub async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        expected_version: i64,
    ) -> AppResult<UserProfile> {
        self.authorize(PermissionAction::Write, module::USERS).await?;
        let updated = self.profiles.set_active(id, active, expected_version).await?;
        info!(user_id = %id, active, "Account status changed");
        self.invalidate_if_current(id).await;
        Ok(updated)
    }

    async fn rows_for(&self, user: Option<&ResolvedProfile>) -> Vec<RolePermission> {
        match user {
            Some(user) => self.permissions.load_permissions(user.profile().role).await,
            None => Vec::new(),
        }
    }

    async fn invalidate_if_current(&self, id: Uuid) {
        if self.cache.peek().is_some_and(|entry| entry.profile.id == id) {
            if let Err(e) = self.cache.clear().await {
                warn!(user_id = %id, error = %e, "Failed to invalidate session cache");
            }
            self.state.send_if_modified(|state| match state {
                SessionState::Authenticated { freshness, .. } => {
                    *freshness = Freshness::Stale;
                    true
                }
                _ => false,
            });
        }
    }

    async fn clear_local(&self) -> AppResult<()> {
        let cache = self.cache.clear().await;
        let tokens = self.tokens.clear().await;
        cache.and(tokens)
    }

    fn publish(&self, resolved: &ResolvedProfile) {
        let profile = resolved.profile();
        self.set_state(SessionState::Authenticated {
            user_id: profile.id,
            role: profile.role,
            freshness: Freshness::Fresh,
            degraded: resolved.is_degraded(),
        });
    }

    /// After a failed resolution, fall back to whatever the cache still holds.
    fn restore_state(&self) {
        match self.cache.peek() {
            Some(entry) => {
                let degraded = entry.degraded.is_some();
                let freshness = if self.cache.is_fresh(&entry) {
                    Freshness::Fresh
                } else {
                    Freshness::Stale
                };
                self.set_state(SessionState::Authenticated {
                    user_id: entry.profile.id,
                    role: entry.profile.role,
                    freshness,
                    degraded,
                });
            }
            None => self.set_state(SessionState::Anonymous),
        }
    }

    fn set_state(&self, next: SessionState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}

fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }
    let valid_shape = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !valid_shape {
        return Err(AppError::validation(format!("'{email}' is not a valid email address")));
    }
    Ok(())
}
