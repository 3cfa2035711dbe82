//! Observable session state.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use wastetrack_entity::user::UserRole;

/// Whether the cached profile is still inside its freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Served from cache without I/O.
    Fresh,
    /// The next resolution will go to the backend.
    Stale,
}

/// Lifecycle state of the session.
///
/// `Anonymous -> Resolving -> Authenticated(Fresh) -> Authenticated(Stale)`,
/// and back to `Anonymous` on sign-out or identity invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Nobody is signed in.
    Anonymous,
    /// A sign-in or resolution is in flight.
    Resolving,
    /// A profile is resolved.
    Authenticated {
        /// Identity id.
        user_id: Uuid,
        /// Resolved role.
        role: UserRole,
        /// Cache freshness.
        freshness: Freshness,
        /// Built from identity metadata rather than the profile table.
        degraded: bool,
    },
}

impl SessionState {
    /// Whether a profile is resolved.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Resolving => write!(f, "resolving"),
            Self::Authenticated {
                freshness: Freshness::Fresh,
                ..
            } => write!(f, "authenticated (fresh)"),
            Self::Authenticated {
                freshness: Freshness::Stale,
                ..
            } => write!(f, "authenticated (stale)"),
        }
    }
}
