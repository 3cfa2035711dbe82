//! File-backed session storage.

use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use wastetrack_core::error::{AppError, ErrorKind};
use wastetrack_core::result::AppResult;
use wastetrack_core::traits::storage::SessionStorage;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go through a temporary file and a rename so a reader never sees a
/// half-written value. Each write uses its own temporary file, so concurrent
/// writers of one key never collide; the last rename wins.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    /// Open (and create if needed) the storage directory.
    pub async fn open(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create session directory '{}'", dir.display()),
                e,
            )
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Map a key to a safe file stem.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read session entry '{key}'"),
                e,
            )),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.path_for(key);
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", sanitize_key(key), Uuid::new_v4().simple()));

        let written = match tokio::fs::write(&tmp, value).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write session entry '{key}'"),
                e,
            ));
        }
        debug!(key, path = %path.display(), "Wrote session entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete session entry '{key}'"),
                e,
            )),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }

    async fn clear(&self) -> AppResult<()> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut count = 0u64;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                tokio::fs::remove_file(&path).await?;
                count += 1;
            }
        }
        debug!(count, dir = %self.dir.display(), "Cleared session directory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_and_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::open(tmp.path()).await.unwrap();

        assert_eq!(storage.get("user_profile").await.unwrap(), None);
        storage.set("user_profile", "{}").await.unwrap();
        assert_eq!(storage.get("user_profile").await.unwrap().as_deref(), Some("{}"));

        storage.delete("user_profile").await.unwrap();
        storage.delete("user_profile").await.unwrap();
        assert!(!storage.exists("user_profile").await.unwrap());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        FileSessionStorage::open(tmp.path())
            .await
            .unwrap()
            .set("auth_session", "token")
            .await
            .unwrap();

        let reopened = FileSessionStorage::open(tmp.path()).await.unwrap();
        assert_eq!(reopened.get("auth_session").await.unwrap().as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::open(tmp.path()).await.unwrap();
        storage.set("../outside", "x").await.unwrap();
        assert!(tmp.path().join("___outside.json").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writers_of_one_key() {
        let tmp = tempfile::tempdir().unwrap();
        let a = FileSessionStorage::open(tmp.path()).await.unwrap();
        let b = FileSessionStorage::open(tmp.path()).await.unwrap();
        let big_a = "a".repeat(1 << 20);
        let big_b = "b".repeat(1 << 20);

        for _ in 0..20 {
            let (ra, rb) = tokio::join!(
                tokio::spawn({
                    let (a, v) = (a.clone(), big_a.clone());
                    async move { a.set("auth_session", &v).await }
                }),
                tokio::spawn({
                    let (b, v) = (b.clone(), big_b.clone());
                    async move { b.set("auth_session", &v).await }
                }),
            );
            ra.unwrap().unwrap();
            rb.unwrap().unwrap();

            let stored = a.get("auth_session").await.unwrap().unwrap();
            assert!(stored == big_a || stored == big_b);
        }

        let leftovers = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().is_some_and(|x| x == "tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::open(tmp.path()).await.unwrap();
        storage.set("a", "1").await.unwrap();
        storage.set("b", "2").await.unwrap();
        storage.clear().await.unwrap();
        assert_eq!(storage.get("a").await.unwrap(), None);
        assert_eq!(storage.get("b").await.unwrap(), None);
    }
}
