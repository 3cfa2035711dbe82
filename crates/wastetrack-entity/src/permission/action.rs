//! Actions a permission row can grant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An action gated by a `permisos` row flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionAction {
    /// `puede_leer`.
    #[serde(rename = "lectura", alias = "read")]
    Read,
    /// `puede_escribir`.
    #[serde(rename = "escritura", alias = "write")]
    Write,
    /// `puede_eliminar`.
    #[serde(rename = "eliminacion", alias = "delete")]
    Delete,
}

impl PermissionAction {
    /// Return the action name used by the dashboard.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "lectura",
            Self::Write => "escritura",
            Self::Delete => "eliminacion",
        }
    }

    /// Whether the action changes data.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionAction {
    type Err = wastetrack_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lectura" | "read" => Ok(Self::Read),
            "escritura" | "write" => Ok(Self::Write),
            "eliminacion" | "eliminación" | "delete" => Ok(Self::Delete),
            _ => Err(wastetrack_core::AppError::validation(format!(
                "Invalid permission action: '{s}'. Expected one of: lectura, escritura, eliminacion"
            ))),
        }
    }
}
