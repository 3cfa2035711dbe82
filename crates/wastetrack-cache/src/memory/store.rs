//! In-memory session storage implementation using the moka crate.

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use wastetrack_core::result::AppResult;
use wastetrack_core::traits::storage::SessionStorage;

/// Upper bound on stored keys; the mirror only ever holds a handful.
const MAX_ENTRIES: u64 = 64;

/// Process-scoped session storage using moka.
///
/// Entries never expire on their own; freshness is decided by the caller
/// from the timestamp stored inside the value.
#[derive(Debug, Clone)]
pub struct MemorySessionStorage {
    /// The underlying moka cache.
    cache: Cache<String, String>,
}

impl MemorySessionStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().max_capacity(MAX_ENTRIES).build(),
        }
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        debug!(key, "Removed session storage entry");
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn clear(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get() {
        let storage = MemorySessionStorage::new();
        storage.set("user_profile", "{\"a\":1}").await.unwrap();
        let val = storage.get("user_profile").await.unwrap();
        assert_eq!(val, Some("{\"a\":1}".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = MemorySessionStorage::new();
        storage.set("auth_session", "token").await.unwrap();
        storage.delete("auth_session").await.unwrap();
        assert_eq!(storage.get("auth_session").await.unwrap(), None);
        assert!(!storage.exists("auth_session").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let storage = MemorySessionStorage::new();
        storage.set("a", "1").await.unwrap();
        storage.set("b", "2").await.unwrap();
        storage.clear().await.unwrap();
        assert_eq!(storage.get("a").await.unwrap(), None);
        assert_eq!(storage.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let storage = MemorySessionStorage::new();
        let data = serde_json::json!({"rol": "admin", "activo": true});
        storage.set_json("json_key", &data).await.unwrap();
        let result: Option<serde_json::Value> = storage.get_json("json_key").await.unwrap();
        assert_eq!(result, Some(data));
    }
}
