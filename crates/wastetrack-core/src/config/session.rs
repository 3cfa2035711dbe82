//! Session cache and authorization configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session cache, persisted mirror, and access-policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds a resolved profile stays fresh in the session cache.
    #[serde(default = "default_profile_ttl")]
    pub profile_ttl_seconds: u64,
    /// Backend for the persisted mirror.
    #[serde(default)]
    pub storage: StorageProviderKind,
    /// Directory holding the file-backed mirror.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// Storage key of the serialized profile mirror.
    #[serde(default = "default_profile_key")]
    pub profile_key: String,
    /// Storage key of the persisted auth session (tokens).
    #[serde(default = "default_auth_key")]
    pub auth_key: String,
    /// Whether a degraded (metadata-derived) profile may perform write/delete actions.
    #[serde(default)]
    pub allow_degraded_writes: bool,
    /// Whether the admin role passes module checks without a permission row.
    #[serde(default)]
    pub admin_bypass: bool,
}

impl SessionConfig {
    /// Profile freshness window as a [`Duration`].
    pub fn profile_ttl(&self) -> Duration {
        Duration::from_secs(self.profile_ttl_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile_ttl_seconds: default_profile_ttl(),
            storage: StorageProviderKind::default(),
            storage_dir: default_storage_dir(),
            profile_key: default_profile_key(),
            auth_key: default_auth_key(),
            allow_degraded_writes: false,
            admin_bypass: false,
        }
    }
}

/// Where the persisted session mirror lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageProviderKind {
    /// Process-scoped, dropped on exit.
    Memory,
    /// JSON files under `storage_dir`, shared by every process of the same user.
    #[default]
    File,
}

impl std::fmt::Display for StorageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageProviderKind::Memory => write!(f, "memory"),
            StorageProviderKind::File => write!(f, "file"),
        }
    }
}

fn default_profile_ttl() -> u64 {
    300
}

fn default_storage_dir() -> String {
    ".wastetrack/session".to_string()
}

fn default_profile_key() -> String {
    "user_profile".to_string()
}

fn default_auth_key() -> String {
    "auth_session".to_string()
}
