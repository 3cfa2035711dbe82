//! In-memory fakes of the backend seams, for tests.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for downstream integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use wastetrack_cache::StorageManager;
use wastetrack_cache::memory::MemorySessionStorage;
use wastetrack_core::config::SessionConfig;
use wastetrack_core::error::AppError;
use wastetrack_core::result::AppResult;
use wastetrack_core::traits::clock::ManualClock;
use wastetrack_entity::identity::{AuthSession, Identity, IdentityMetadata};
use wastetrack_entity::permission::RolePermission;
use wastetrack_entity::user::{ProfileUpdate, UserProfile, UserRole};

use crate::identity::error::AuthErrorBody;
use crate::identity::{AuthFailure, IdentityProvider, TokenStore};
use crate::profile::{ProfileResolver, ProfileStore, SessionCache};
use crate::rbac::PermissionSource;
use crate::session::SessionManager;

/// Password accepted by [`FakeIdentity`].
pub const PASSWORD: &str = "correct-horse-battery";

/// A fresh in-memory storage manager.
pub fn memory_storage() -> Arc<StorageManager> {
    Arc::new(StorageManager::from_provider(Arc::new(
        MemorySessionStorage::new(),
    )))
}

/// An identity whose metadata carries `role`.
pub fn identity(role: &str) -> Identity {
    let id = Uuid::new_v4();
    Identity {
        id,
        email: format!("user-{}@hospital.example", &id.simple().to_string()[..8]),
        email_confirmed_at: Some(Utc::now()),
        metadata: IdentityMetadata {
            full_name: Some("Marta Ibáñez".into()),
            role: Some(role.into()),
            department: Some("Urgencias".into()),
        },
    }
}

/// Tokens for `identity` with no local expiry.
pub fn auth_session(identity: &Identity, access_token: &str) -> AuthSession {
    AuthSession {
        access_token: access_token.into(),
        refresh_token: format!("refresh-{access_token}"),
        expires_at: None,
        identity: identity.clone(),
    }
}

/// An active profile with a random id.
pub fn profile(role: UserRole) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        full_name: "Marta Ibáñez".into(),
        email: "marta@hospital.example".into(),
        role,
        department: Some("Urgencias".into()),
        active: true,
        version: 1,
        updated_at: None,
    }
}

/// Identity service holding a single account.
#[derive(Debug)]
pub struct FakeIdentity {
    account: Identity,
    issued: Mutex<HashSet<String>>,
    serial: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub get_user_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    /// Every call fails with a network error.
    pub unreachable: AtomicBool,
    /// Sign-out fails with a network error.
    pub fail_sign_out: AtomicBool,
}

impl FakeIdentity {
    pub fn new(account: Identity) -> Self {
        Self {
            account,
            issued: Mutex::new(HashSet::new()),
            serial: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            get_user_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            unreachable: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Invalidate every issued token.
    pub fn revoke_all(&self) {
        self.issued.lock().unwrap().clear();
    }

    fn issue(&self) -> AuthSession {
        let n = self.serial.fetch_add(1, Ordering::SeqCst);
        let session = auth_session(&self.account, &format!("access-{n}"));
        let mut issued = self.issued.lock().unwrap();
        issued.insert(session.access_token.clone());
        issued.insert(session.refresh_token.clone());
        session
    }

    fn check_reachable(&self) -> AppResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AuthFailure::Network("connection refused".into()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        if email == self.account.email && password == PASSWORD {
            Ok(self.issue())
        } else {
            Err(AuthFailure::InvalidCredentials.into())
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<AuthSession> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        if self.issued.lock().unwrap().remove(refresh_token) {
            Ok(self.issue())
        } else {
            let body = AuthErrorBody {
                error_code: Some("refresh_token_not_found".into()),
                msg: Some("Invalid Refresh Token: Refresh Token Not Found".into()),
                ..Default::default()
            };
            Err(AuthFailure::classify(400, &body).into())
        }
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthFailure::Network("connection reset".into()).into());
        }
        self.issued.lock().unwrap().remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> AppResult<Option<Identity>> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self
            .issued
            .lock()
            .unwrap()
            .contains(access_token)
            .then(|| self.account.clone()))
    }
}

/// Profile table in a map.
#[derive(Debug, Default)]
pub struct FakeProfiles {
    rows: Mutex<HashMap<Uuid, UserProfile>>,
    pub find_calls: AtomicUsize,
    /// Every call fails with a database error.
    pub fail: AtomicBool,
}

impl FakeProfiles {
    pub fn insert(&self, profile: UserProfile) {
        self.rows.lock().unwrap().insert(profile.id, profile);
    }

    pub fn remove(&self, id: Uuid) {
        self.rows.lock().unwrap().remove(&id);
    }

    pub fn get(&self, id: Uuid) -> Option<UserProfile> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    /// Edit a row in place without touching its version.
    pub fn update(&self, id: Uuid, edit: impl FnOnce(&mut UserProfile)) {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
            edit(row);
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::database("connection pool timed out"));
        }
        Ok(())
    }

    fn bump(
        &self,
        id: Uuid,
        expected_version: i64,
        edit: impl FnOnce(&mut UserProfile),
    ) -> AppResult<UserProfile> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        if row.version != expected_version {
            return Err(AppError::conflict(format!("User {id} was modified concurrently")));
        }
        edit(row);
        row.version += 1;
        row.updated_at = Some(Utc::now());
        Ok(row.clone())
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn find_profile(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.get(id))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfileUpdate,
        expected_version: i64,
    ) -> AppResult<UserProfile> {
        self.bump(id, expected_version, |row| {
            if let Some(name) = &patch.full_name {
                row.full_name = name.clone();
            }
            if let Some(role) = patch.role {
                row.role = role;
            }
            if let Some(department) = &patch.department {
                row.department = Some(department.clone());
            }
        })
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        expected_version: i64,
    ) -> AppResult<UserProfile> {
        self.bump(id, expected_version, |row| row.active = active)
    }
}

/// Permission table in a vector.
#[derive(Debug, Default)]
pub struct FakePermissions {
    rows: Mutex<Vec<RolePermission>>,
    pub calls: AtomicUsize,
    /// Every call fails with a database error.
    pub fail: AtomicBool,
}

impl FakePermissions {
    /// Insert or replace the row for `(role, module)`.
    pub fn grant(&self, row: RolePermission) {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| !(r.role == row.role && r.module == row.module));
        rows.push(row);
    }
}

#[async_trait]
impl PermissionSource for FakePermissions {
    async fn permissions_for(&self, role: UserRole) -> AppResult<Vec<RolePermission>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::database("relation \"permisos\" is unavailable"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.role == role)
            .cloned()
            .collect())
    }
}

/// A complete set of fakes around one registered account.
pub struct Fixture {
    pub account: Identity,
    pub config: SessionConfig,
    pub identity: Arc<FakeIdentity>,
    pub profiles: Arc<FakeProfiles>,
    pub permissions: Arc<FakePermissions>,
    pub storage: Arc<StorageManager>,
    pub clock: Arc<ManualClock>,
    pub tokens: Arc<TokenStore>,
    pub cache: Arc<SessionCache>,
    pub resolver: ProfileResolver,
}

impl Fixture {
    /// An account with a profile row of `role`, not signed in.
    pub fn new(role: UserRole) -> Self {
        Self::build(role.as_str(), role)
    }

    /// Like [`Self::new`], with tokens already persisted.
    pub async fn signed_in(role: UserRole) -> Self {
        let fx = Self::new(role);
        fx.persist_tokens().await;
        fx
    }

    /// A signed-in account whose metadata role is the raw string `role`
    /// and whose profile row says `generador`.
    pub async fn with_metadata_role(role: &str) -> Self {
        let fx = Self::build(role, UserRole::Generator);
        fx.persist_tokens().await;
        fx
    }

    fn build(metadata_role: &str, role: UserRole) -> Self {
        let account = identity(metadata_role);
        let profiles = Arc::new(FakeProfiles::default());
        profiles.insert(UserProfile {
            id: account.id,
            email: account.email.clone(),
            ..profile(role)
        });

        let config = SessionConfig::default();
        let identity = Arc::new(FakeIdentity::new(account.clone()));
        let storage = memory_storage();
        let clock = Arc::new(ManualClock::starting_now());
        let tokens = Arc::new(TokenStore::new(storage.clone(), config.auth_key.clone()));
        let cache = Arc::new(SessionCache::new(&config, storage.clone(), clock.clone()));
        let resolver = ProfileResolver::new(
            identity.clone(),
            tokens.clone(),
            profiles.clone(),
            cache.clone(),
        );

        Self {
            account,
            config,
            identity,
            profiles,
            permissions: Arc::new(FakePermissions::default()),
            storage,
            clock,
            tokens,
            cache,
            resolver,
        }
    }

    async fn persist_tokens(&self) {
        let session = self.identity.issue();
        self.tokens.save(&session).await.unwrap();
    }

    /// A session manager sharing this fixture's fakes, storage, and clock.
    pub fn manager(&self) -> SessionManager {
        self.manager_with(&self.config)
    }

    /// Like [`Self::manager`], with a different session configuration.
    pub fn manager_with(&self, config: &SessionConfig) -> SessionManager {
        SessionManager::new(
            config,
            self.identity.clone(),
            self.profiles.clone(),
            self.permissions.clone(),
            self.storage.clone(),
            self.clock.clone(),
        )
    }
}
