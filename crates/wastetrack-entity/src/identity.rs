//! Identity and auth-session types returned by the hosted auth service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::{UserProfile, UserRole};

/// The authenticated principal as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque principal id; equals the profile row id.
    pub id: Uuid,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// When the email address was confirmed, if ever.
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    /// Free-form metadata written at registration.
    #[serde(default, rename = "user_metadata")]
    pub metadata: IdentityMetadata,
}

/// Profile hints carried in the identity token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    /// Display name.
    #[serde(default, alias = "nombre", alias = "name")]
    pub full_name: Option<String>,
    /// Role string, not validated by the auth service.
    #[serde(default, alias = "rol")]
    pub role: Option<String>,
    /// Department.
    #[serde(default, alias = "departamento")]
    pub department: Option<String>,
}

impl Identity {
    /// Best-effort profile built from token metadata.
    ///
    /// Used only when the profile table cannot be read. A missing or
    /// unrecognised role falls back to [`UserRole::Generator`].
    pub fn fallback_profile(&self) -> UserProfile {
        let role = self
            .metadata
            .role
            .as_deref()
            .and_then(|r| r.parse::<UserRole>().ok())
            .unwrap_or_default();

        let full_name = self
            .metadata
            .full_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.email.split('@').next().unwrap_or_default().to_string());

        UserProfile {
            id: self.id,
            full_name,
            email: self.email.clone(),
            role,
            department: self.metadata.department.clone(),
            active: true,
            version: 0,
            updated_at: None,
        }
    }
}

/// Tokens issued by a successful password sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for identity calls.
    pub access_token: String,
    /// Token used to obtain a new access token.
    #[serde(default)]
    pub refresh_token: String,
    /// Expiry of the access token as a unix timestamp.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// The signed-in identity.
    #[serde(rename = "user")]
    pub identity: Identity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(metadata: serde_json::Value) -> Identity {
        serde_json::from_value(serde_json::json!({
            "id": "7f1c1c52-2b0e-4f43-9a43-4f4b2f3b9e10",
            "email": "lucia@hospital.example",
            "user_metadata": metadata,
        }))
        .unwrap()
    }

    #[test]
    fn test_fallback_reads_spanish_metadata() {
        let id = identity(serde_json::json!({
            "nombre": "Lucía Gómez",
            "rol": "supervisor",
            "departamento": "Quirófano"
        }));
        let profile = id.fallback_profile();
        assert_eq!(profile.full_name, "Lucía Gómez");
        assert_eq!(profile.role, UserRole::Supervisor);
        assert_eq!(profile.department.as_deref(), Some("Quirófano"));
        assert!(profile.active);
    }

    #[test]
    fn test_fallback_defaults_role_and_name() {
        let profile = identity(serde_json::json!({ "rol": "superuser" })).fallback_profile();
        assert_eq!(profile.role, UserRole::Generator);
        assert_eq!(profile.full_name, "lucia");
    }
}
