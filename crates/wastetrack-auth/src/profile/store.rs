//! Profile table seam.

use async_trait::async_trait;
use uuid::Uuid;

use wastetrack_core::result::AppResult;
use wastetrack_database::repositories::UserRepository;
use wastetrack_entity::user::{ProfileUpdate, UserProfile};

/// Reads and conditional writes against the profile table.
#[async_trait]
pub trait ProfileStore: Send + Sync + std::fmt::Debug + 'static {
    /// The profile row keyed by identity id.
    async fn find_profile(&self, id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Patch a profile if its version still equals `expected_version`.
    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfileUpdate,
        expected_version: i64,
    ) -> AppResult<UserProfile>;

    /// Toggle the active flag under the same version check.
    async fn set_active(&self, id: Uuid, active: bool, expected_version: i64)
    -> AppResult<UserProfile>;
}

#[async_trait]
impl ProfileStore for UserRepository {
    async fn find_profile(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        self.find_by_id(id).await
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfileUpdate,
        expected_version: i64,
    ) -> AppResult<UserProfile> {
        UserRepository::update_profile(self, id, patch, expected_version).await
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        expected_version: i64,
    ) -> AppResult<UserProfile> {
        UserRepository::set_active(self, id, active, expected_version).await
    }
}
