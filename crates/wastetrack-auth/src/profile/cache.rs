//! Time-boxed cache of the resolved profile.
//!
//! Two layers: an in-process slot and a persisted mirror in the configured
//! [`SessionStorage`]. Both apply the same TTL against the injected
//! [`Clock`]; the mirror additionally has to belong to the identity asking.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use wastetrack_cache::StorageManager;
use wastetrack_core::config::SessionConfig;
use wastetrack_core::result::AppResult;
use wastetrack_core::traits::clock::Clock;
use wastetrack_core::traits::storage::SessionStorage;
use wastetrack_entity::session::CachedSession;
use wastetrack_entity::user::UserProfile;

/// Session cache shared by the resolver and the session manager.
#[derive(Debug)]
pub struct SessionCache {
    slot: RwLock<Option<CachedSession>>,
    storage: Arc<StorageManager>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    key: String,
}

impl SessionCache {
    /// Create an empty cache.
    pub fn new(config: &SessionConfig, storage: Arc<StorageManager>, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            storage,
            clock,
            ttl: config.profile_ttl(),
            key: config.profile_key.clone(),
        }
    }

    /// Freshness window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The injected time source.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The in-memory entry with its age, if it is still fresh.
    pub fn get(&self) -> Option<(CachedSession, Duration)> {
        let now = self.clock.now();
        let slot = self.slot.read().unwrap_or_else(|p| p.into_inner());
        slot.as_ref()
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| (entry.clone(), entry.age(now)))
    }

    /// The in-memory entry regardless of age.
    pub fn peek(&self) -> Option<CachedSession> {
        self.slot.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Whether `entry` is fresh now.
    pub fn is_fresh(&self, entry: &CachedSession) -> bool {
        entry.is_fresh(self.clock.now(), self.ttl)
    }

    /// Store `entry` in memory and in the mirror.
    ///
    /// A failed mirror write is logged; the memory slot is still updated.
    pub async fn set(&self, entry: CachedSession) {
        if let Err(e) = self.storage.set_json(&self.key, &entry).await {
            warn!(user_id = %entry.profile.id, error = %e, "Failed to write session mirror");
        }
        *self.slot.write().unwrap_or_else(|p| p.into_inner()) = Some(entry);
    }

    /// Stamp `profile` with the current time and store it.
    pub async fn store(&self, profile: UserProfile, degraded: Option<String>) -> CachedSession {
        let entry = CachedSession {
            profile,
            cached_at: self.clock.now(),
            degraded,
        };
        self.set(entry.clone()).await;
        entry
    }

    /// Promote the persisted mirror into memory if it is fresh and belongs
    /// to `identity_id`.
    ///
    /// Unreadable mirrors are deleted. Storage errors count as a miss.
    pub async fn load_mirror(&self, identity_id: Uuid) -> Option<CachedSession> {
        let raw = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read session mirror");
                return None;
            }
        };

        let entry: CachedSession = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session mirror");
                if let Err(e) = self.storage.delete(&self.key).await {
                    warn!(error = %e, "Failed to delete session mirror");
                }
                return None;
            }
        };

        if entry.profile.id != identity_id {
            debug!(
                cached = %entry.profile.id,
                current = %identity_id,
                "Session mirror belongs to another identity"
            );
            return None;
        }
        if !self.is_fresh(&entry) {
            debug!(user_id = %identity_id, "Session mirror expired");
            return None;
        }

        *self.slot.write().unwrap_or_else(|p| p.into_inner()) = Some(entry.clone());
        Some(entry)
    }

    /// Drop the in-memory entry only.
    pub fn clear_memory(&self) {
        self.slot.write().unwrap_or_else(|p| p.into_inner()).take();
    }

    /// Drop the in-memory entry and delete the mirror.
    pub async fn clear(&self) -> AppResult<()> {
        self.clear_memory();
        self.storage.delete(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use chrono::Duration as ChronoDuration;
    use wastetrack_core::traits::clock::ManualClock;
    use wastetrack_entity::user::UserRole;

    fn cache_with(storage: Arc<StorageManager>) -> (SessionCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = SessionCache::new(&SessionConfig::default(), storage, clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_fresh_then_expired() {
        let (cache, clock) = cache_with(testing::memory_storage());
        let profile = testing::profile(UserRole::Supervisor);

        cache.store(profile.clone(), None).await;
        clock.advance(ChronoDuration::seconds(299));
        let (entry, age) = cache.get().unwrap();
        assert_eq!(entry.profile, profile);
        assert_eq!(age, Duration::from_secs(299));

        clock.advance(ChronoDuration::seconds(1));
        assert!(cache.get().is_none());
        assert!(cache.peek().is_some());
    }

    #[tokio::test]
    async fn test_mirror_is_revalidated() {
        let storage = testing::memory_storage();
        let profile = testing::profile(UserRole::Transporter);

        let (writer, _) = cache_with(storage.clone());
        writer.store(profile.clone(), None).await;

        let (reader, clock) = cache_with(storage.clone());
        clock.set(writer.peek().unwrap().cached_at);
        assert!(reader.load_mirror(uuid::Uuid::new_v4()).await.is_none());

        clock.advance(ChronoDuration::minutes(5));
        assert!(reader.load_mirror(profile.id).await.is_none());

        clock.advance(ChronoDuration::minutes(-1));
        let entry = reader.load_mirror(profile.id).await.unwrap();
        assert_eq!(entry.profile, profile);
        assert!(reader.get().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_mirror_is_deleted() {
        let storage = testing::memory_storage();
        storage.set("user_profile", "[]").await.unwrap();

        let (cache, _) = cache_with(storage.clone());
        assert!(cache.load_mirror(uuid::Uuid::new_v4()).await.is_none());
        assert!(!storage.exists("user_profile").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_removes_both_layers() {
        let storage = testing::memory_storage();
        let (cache, _) = cache_with(storage.clone());
        cache.store(testing::profile(UserRole::Admin), None).await;
        assert!(storage.exists("user_profile").await.unwrap());

        cache.clear().await.unwrap();
        assert!(cache.peek().is_none());
        assert!(!storage.exists("user_profile").await.unwrap());
    }
}
