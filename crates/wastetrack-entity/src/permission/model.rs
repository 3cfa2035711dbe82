//! Permission row model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::action::PermissionAction;
use crate::user::UserRole;

/// One row of the `permisos` table: what a role may do in a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RolePermission {
    /// Surrogate key.
    #[serde(default)]
    pub id: i64,
    /// Role the row applies to.
    #[sqlx(rename = "rol")]
    pub role: UserRole,
    /// Module name.
    #[sqlx(rename = "modulo")]
    pub module: String,
    /// Read flag.
    #[sqlx(rename = "puede_leer")]
    pub can_read: bool,
    /// Write flag.
    #[sqlx(rename = "puede_escribir")]
    pub can_write: bool,
    /// Delete flag.
    #[sqlx(rename = "puede_eliminar")]
    pub can_delete: bool,
}

impl RolePermission {
    /// A row granting nothing; combine with [`Self::with`].
    pub fn new(role: UserRole, module: impl Into<String>) -> Self {
        Self {
            id: 0,
            role,
            module: module.into(),
            can_read: false,
            can_write: false,
            can_delete: false,
        }
    }

    /// Grant an additional action.
    pub fn with(mut self, action: PermissionAction) -> Self {
        match action {
            PermissionAction::Read => self.can_read = true,
            PermissionAction::Write => self.can_write = true,
            PermissionAction::Delete => self.can_delete = true,
        }
        self
    }

    /// Whether this row grants the action.
    pub fn allows(&self, action: PermissionAction) -> bool {
        match action {
            PermissionAction::Read => self.can_read,
            PermissionAction::Write => self.can_write,
            PermissionAction::Delete => self.can_delete,
        }
    }
}
