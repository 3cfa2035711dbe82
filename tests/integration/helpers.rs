//! Shared test helpers for integration tests.
//!
//! Every [`TestApp::session`] call builds a new session manager over the
//! same on-disk mirror, which is how two CLI invocations (or two dashboard
//! tabs) share a session.

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use wastetrack_auth::SessionManager;
use wastetrack_auth::testing::{self, FakeIdentity, FakePermissions, FakeProfiles, PASSWORD};
use wastetrack_cache::StorageManager;
use wastetrack_core::config::{SessionConfig, StorageProviderKind};
use wastetrack_core::traits::clock::ManualClock;
use wastetrack_entity::identity::Identity;
use wastetrack_entity::permission::{PermissionAction, RolePermission};
use wastetrack_entity::user::{UserProfile, UserRole};

/// Test application context
pub struct TestApp {
    /// Directory holding the file-backed mirror
    pub dir: TempDir,
    /// Session configuration pointing at `dir`
    pub config: SessionConfig,
    /// The registered account
    pub account: Identity,
    /// Identity service fake
    pub identity: Arc<FakeIdentity>,
    /// Profile table fake
    pub profiles: Arc<FakeProfiles>,
    /// Permission table fake
    pub permissions: Arc<FakePermissions>,
    /// Shared clock
    pub clock: Arc<ManualClock>,
    /// Storage over `dir`
    pub storage: Arc<StorageManager>,
}

impl TestApp {
    /// Create an app with one account whose profile row has `role`
    pub async fn new(role: UserRole) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = SessionConfig {
            storage: StorageProviderKind::File,
            storage_dir: dir.path().join("session").display().to_string(),
            ..SessionConfig::default()
        };
        let storage = Arc::new(
            StorageManager::new(&config)
                .await
                .expect("Failed to init session storage"),
        );

        let account = testing::identity(role.as_str());
        let profiles = Arc::new(FakeProfiles::default());
        profiles.insert(UserProfile {
            id: account.id,
            email: account.email.clone(),
            ..testing::profile(role)
        });

        Self {
            dir,
            config,
            identity: Arc::new(FakeIdentity::new(account.clone())),
            account,
            profiles,
            permissions: Arc::new(FakePermissions::default()),
            clock: Arc::new(ManualClock::starting_now()),
            storage,
        }
    }

    /// A new session manager over the shared mirror
    pub fn session(&self) -> SessionManager {
        self.session_with(&self.config)
    }

    /// Like [`Self::session`], with different policy switches
    pub fn session_with(&self, config: &SessionConfig) -> SessionManager {
        SessionManager::new(
            config,
            self.identity.clone(),
            self.profiles.clone(),
            self.permissions.clone(),
            self.storage.clone(),
            self.clock.clone(),
        )
    }

    /// Sign in through a new session manager and return it
    pub async fn signed_in(&self) -> SessionManager {
        let session = self.session();
        session
            .sign_in(&self.account.email, PASSWORD)
            .await
            .expect("Sign-in failed");
        session
    }

    /// Grant `actions` on `module` to `role`
    pub fn grant(&self, role: UserRole, module: &str, actions: &[PermissionAction]) {
        let row = actions
            .iter()
            .fold(RolePermission::new(role, module), |row, action| row.with(*action));
        self.permissions.grant(row);
    }

    /// Whether the mirror file for `key` exists
    pub fn mirror_exists(&self, key: &str) -> bool {
        self.dir.path().join("session").join(format!("{key}.json")).exists()
    }
}
