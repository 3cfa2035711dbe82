//! Storage manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use wastetrack_core::config::session::{SessionConfig, StorageProviderKind};
use wastetrack_core::result::AppResult;
use wastetrack_core::traits::storage::SessionStorage;

/// Storage manager that wraps the configured session storage provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// The inner storage provider.
    inner: Arc<dyn SessionStorage>,
}

impl StorageManager {
    /// Create a new storage manager from configuration.
    pub async fn new(config: &SessionConfig) -> AppResult<Self> {
        let inner: Arc<dyn SessionStorage> = match config.storage {
            StorageProviderKind::File => {
                info!(dir = %config.storage_dir, "Initializing file session storage");
                Arc::new(crate::file::FileSessionStorage::open(&config.storage_dir).await?)
            }
            #[cfg(feature = "memory")]
            StorageProviderKind::Memory => {
                info!("Initializing in-memory session storage");
                Arc::new(crate::memory::MemorySessionStorage::new())
            }
            #[cfg(not(feature = "memory"))]
            StorageProviderKind::Memory => {
                return Err(wastetrack_core::AppError::configuration(
                    "In-memory session storage requires the 'memory' feature",
                ));
            }
        };

        Ok(Self { inner })
    }

    /// Create a storage manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn SessionStorage>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl SessionStorage for StorageManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn clear(&self) -> AppResult<()> {
        self.inner.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_provider_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            storage: StorageProviderKind::File,
            storage_dir: tmp.path().join("session").display().to_string(),
            ..SessionConfig::default()
        };

        let manager = StorageManager::new(&config).await.unwrap();
        manager.set("user_profile", "{}").await.unwrap();
        assert!(tmp.path().join("session/user_profile.json").exists());
    }

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let config = SessionConfig {
            storage: StorageProviderKind::Memory,
            ..SessionConfig::default()
        };

        let manager = StorageManager::new(&config).await.unwrap();
        manager.set("k", "v").await.unwrap();
        assert_eq!(manager.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
