//! Permission row loading.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use wastetrack_core::result::AppResult;
use wastetrack_database::repositories::PermissionRepository;
use wastetrack_entity::permission::RolePermission;
use wastetrack_entity::user::UserRole;

/// Where permission rows come from.
#[async_trait]
pub trait PermissionSource: Send + Sync + std::fmt::Debug + 'static {
    /// Every row for `role`.
    async fn permissions_for(&self, role: UserRole) -> AppResult<Vec<RolePermission>>;
}

#[async_trait]
impl PermissionSource for PermissionRepository {
    async fn permissions_for(&self, role: UserRole) -> AppResult<Vec<RolePermission>> {
        self.find_by_role(role).await
    }
}

/// Loads a role's permission rows on every call. Nothing is cached.
#[derive(Debug, Clone)]
pub struct PermissionLoader {
    source: Arc<dyn PermissionSource>,
}

impl PermissionLoader {
    /// Create a loader over `source`.
    pub fn new(source: Arc<dyn PermissionSource>) -> Self {
        Self { source }
    }

    /// Rows for `role`, ordered by module.
    ///
    /// A failed read yields an empty list, which denies every module check.
    pub async fn load_permissions(&self, role: UserRole) -> Vec<RolePermission> {
        match self.source.permissions_for(role).await {
            Ok(mut rows) => {
                rows.retain(|row| row.role == role);
                rows.sort_by(|a, b| a.module.cmp(&b.module));
                debug!(role = %role, count = rows.len(), "Loaded permissions");
                rows
            }
            Err(e) => {
                warn!(role = %role, error = %e, "Failed to load permissions");
                Vec::new()
            }
        }
    }
}
