//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a dashboard user can hold.
///
/// The stored values are the backend's Spanish strings; English names are
/// accepted when parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rol_usuario")]
pub enum UserRole {
    /// Registers waste produced by a hospital unit.
    #[serde(rename = "generador", alias = "generator")]
    #[sqlx(rename = "generador")]
    #[default]
    Generator,
    /// Reviews registrations and oversees deliveries.
    #[serde(rename = "supervisor")]
    #[sqlx(rename = "supervisor")]
    Supervisor,
    /// Weighs and carries waste to external handlers.
    #[serde(rename = "transportista", alias = "transporter")]
    #[sqlx(rename = "transportista")]
    Transporter,
    /// External company receiving the waste.
    #[serde(rename = "gestor_externo", alias = "external-handler", alias = "external_handler")]
    #[sqlx(rename = "gestor_externo")]
    ExternalHandler,
    /// Full administrator.
    #[serde(rename = "admin")]
    #[sqlx(rename = "admin")]
    Admin,
}

impl UserRole {
    /// Every role, in declaration order.
    pub const ALL: [UserRole; 5] = [
        Self::Generator,
        Self::Supervisor,
        Self::Transporter,
        Self::ExternalHandler,
        Self::Admin,
    ];

    /// Return the stored string for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generator => "generador",
            Self::Supervisor => "supervisor",
            Self::Transporter => "transportista",
            Self::ExternalHandler => "gestor_externo",
            Self::Admin => "admin",
        }
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = wastetrack_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generador" | "generator" => Ok(Self::Generator),
            "supervisor" => Ok(Self::Supervisor),
            "transportista" | "transporter" => Ok(Self::Transporter),
            "gestor_externo" | "external-handler" | "external_handler" => {
                Ok(Self::ExternalHandler)
            }
            "admin" => Ok(Self::Admin),
            _ => Err(wastetrack_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: generador, supervisor, \
                 transportista, gestor_externo, admin"
            ))),
        }
    }
}
