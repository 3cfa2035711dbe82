//! User profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::role::UserRole;

/// A dashboard user's profile row from the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    /// Identity id shared with the auth service.
    pub id: Uuid,
    /// Display name.
    #[sqlx(rename = "nombre")]
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Role driving navigation and permission lookups.
    #[sqlx(rename = "rol")]
    pub role: UserRole,
    /// Hospital department, if assigned.
    #[sqlx(rename = "departamento")]
    pub department: Option<String>,
    /// Whether the account may use the dashboard.
    #[sqlx(rename = "activo")]
    pub active: bool,
    /// Optimistic-concurrency counter, bumped by every update.
    #[serde(default)]
    pub version: i64,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Fields an explicit profile-update action may patch.
///
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    /// New display name.
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub full_name: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New department.
    #[validate(length(max = 120, message = "department must be at most 120 characters"))]
    pub department: Option<String>,
}

impl ProfileUpdate {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.role.is_none() && self.department.is_none()
    }
}
