//! User profile repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use wastetrack_core::error::{AppError, ErrorKind};
use wastetrack_core::result::AppResult;
use wastetrack_entity::user::{ProfileUpdate, UserProfile, UserRole};

/// Column list shared by every query returning a [`UserProfile`].
macro_rules! profile_columns {
    () => {
        "id, nombre, email, rol, departamento, activo, version, updated_at"
    };
}

/// Repository for reads and conditional updates on the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by identity id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(concat!(
            "SELECT ",
            profile_columns!(),
            " FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// List profiles, optionally filtered by role, ordered by name.
    pub async fn find_all(&self, role: Option<UserRole>) -> AppResult<Vec<UserProfile>> {
        let query = match role {
            Some(role) => sqlx::query_as::<_, UserProfile>(concat!(
                "SELECT ",
                profile_columns!(),
                " FROM users WHERE rol = $1 ORDER BY nombre ASC"
            ))
            .bind(role),
            None => sqlx::query_as::<_, UserProfile>(concat!(
                "SELECT ",
                profile_columns!(),
                " FROM users ORDER BY nombre ASC"
            )),
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// Patch name, role, and department if the stored version still matches.
    ///
    /// Fails with `Conflict` when another writer bumped the version first,
    /// and with `NotFound` when the row does not exist.
    pub async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfileUpdate,
        expected_version: i64,
    ) -> AppResult<UserProfile> {
        let updated = sqlx::query_as::<_, UserProfile>(concat!(
            "UPDATE users SET nombre = COALESCE($3, nombre), \
                              rol = COALESCE($4, rol), \
                              departamento = COALESCE($5, departamento), \
                              version = version + 1, \
                              updated_at = NOW() \
             WHERE id = $1 AND version = $2 RETURNING ",
            profile_columns!()
        ))
        .bind(id)
        .bind(expected_version)
        .bind(&patch.full_name)
        .bind(patch.role)
        .bind(&patch.department)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user", e))?;

        match updated {
            Some(profile) => Ok(profile),
            None => Err(self.missing_or_conflict(id, expected_version).await?),
        }
    }

    /// Activate or deactivate an account, subject to the same version check.
    pub async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        expected_version: i64,
    ) -> AppResult<UserProfile> {
        let updated = sqlx::query_as::<_, UserProfile>(concat!(
            "UPDATE users SET activo = $3, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2 RETURNING ",
            profile_columns!()
        ))
        .bind(id)
        .bind(expected_version)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update status", e))?;

        match updated {
            Some(profile) => Ok(profile),
            None => Err(self.missing_or_conflict(id, expected_version).await?),
        }
    }

    /// Explain why a conditional update touched no row.
    async fn missing_or_conflict(&self, id: Uuid, expected_version: i64) -> AppResult<AppError> {
        let current: Option<i64> = sqlx::query_scalar("SELECT version FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read user version", e)
            })?;

        Ok(match current {
            None => AppError::not_found(format!("User {id} not found")),
            Some(found) => AppError::conflict(format!(
                "User {id} was modified concurrently (expected version {expected_version}, found {found})"
            )),
        })
    }
}
