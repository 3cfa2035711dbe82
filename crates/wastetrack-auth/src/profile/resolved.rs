//! Outcome of a profile resolution.

use serde::Serialize;

use wastetrack_entity::session::CachedSession;
use wastetrack_entity::user::UserProfile;

/// A resolved profile, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ResolvedProfile {
    /// Read from the profile table.
    Authoritative(UserProfile),
    /// Built from identity metadata because the profile table could not
    /// provide a row.
    Degraded {
        /// Best-effort profile.
        profile: UserProfile,
        /// Why the table lookup did not succeed.
        reason: String,
    },
}

impl ResolvedProfile {
    /// The profile regardless of provenance.
    pub fn profile(&self) -> &UserProfile {
        match self {
            Self::Authoritative(profile) | Self::Degraded { profile, .. } => profile,
        }
    }

    /// Consume into the profile.
    pub fn into_profile(self) -> UserProfile {
        match self {
            Self::Authoritative(profile) | Self::Degraded { profile, .. } => profile,
        }
    }

    /// Whether the profile was built from identity metadata.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Degradation reason, if any.
    pub fn degradation_reason(&self) -> Option<&str> {
        match self {
            Self::Authoritative(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

impl From<CachedSession> for ResolvedProfile {
    fn from(entry: CachedSession) -> Self {
        match entry.degraded {
            None => Self::Authoritative(entry.profile),
            Some(reason) => Self::Degraded {
                profile: entry.profile,
                reason,
            },
        }
    }
}
