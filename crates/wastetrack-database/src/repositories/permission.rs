//! Role/permission repository implementation.

use sqlx::PgPool;

use wastetrack_core::error::{AppError, ErrorKind};
use wastetrack_core::result::AppResult;
use wastetrack_entity::permission::RolePermission;
use wastetrack_entity::user::UserRole;

/// Repository for the `permisos` reference table.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All rows for a role, ordered by module.
    pub async fn find_by_role(&self, role: UserRole) -> AppResult<Vec<RolePermission>> {
        sqlx::query_as::<_, RolePermission>(
            "SELECT id, rol, modulo, puede_leer, puede_escribir, puede_eliminar \
             FROM permisos WHERE rol = $1 ORDER BY rol ASC, modulo ASC",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load permissions for role", e)
        })
    }

    /// Every row, ordered by role then module.
    pub async fn find_all(&self) -> AppResult<Vec<RolePermission>> {
        sqlx::query_as::<_, RolePermission>(
            "SELECT id, rol, modulo, puede_leer, puede_escribir, puede_eliminar \
             FROM permisos ORDER BY rol ASC, modulo ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list permissions", e))
    }

    /// Insert a row, or replace the flags of the existing `(rol, modulo)` row.
    pub async fn upsert(&self, permission: &RolePermission) -> AppResult<RolePermission> {
        sqlx::query_as::<_, RolePermission>(
            "INSERT INTO permisos (rol, modulo, puede_leer, puede_escribir, puede_eliminar) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (rol, modulo) DO UPDATE SET \
                 puede_leer = EXCLUDED.puede_leer, \
                 puede_escribir = EXCLUDED.puede_escribir, \
                 puede_eliminar = EXCLUDED.puede_eliminar \
             RETURNING id, rol, modulo, puede_leer, puede_escribir, puede_eliminar",
        )
        .bind(permission.role)
        .bind(&permission.module)
        .bind(permission.can_read)
        .bind(permission.can_write)
        .bind(permission.can_delete)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save permission", e))
    }

    /// Remove the row for `(role, module)`. Returns `true` if a row was deleted.
    pub async fn delete(&self, role: UserRole, module: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM permisos WHERE rol = $1 AND modulo = $2")
            .bind(role)
            .bind(module)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete permission", e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
