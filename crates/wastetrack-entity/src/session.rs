//! Cached session entries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserProfile;

/// A resolved profile paired with the moment it was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSession {
    /// The resolved profile.
    pub profile: UserProfile,
    /// When the profile was resolved.
    pub cached_at: DateTime<Utc>,
    /// Why the profile was built from identity metadata instead of the
    /// profile table. `None` for authoritative profiles.
    #[serde(default)]
    pub degraded: Option<String>,
}

impl CachedSession {
    /// Age of the entry at `now`. Never negative.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.cached_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// An entry is fresh while its age is strictly below `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserRole;

    fn entry(cached_at: DateTime<Utc>) -> CachedSession {
        CachedSession {
            profile: UserProfile {
                id: uuid::Uuid::new_v4(),
                full_name: "Test".into(),
                email: "t@example.com".into(),
                role: UserRole::Admin,
                department: None,
                active: true,
                version: 1,
                updated_at: None,
            },
            cached_at,
            degraded: None,
        }
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let start = Utc::now();
        let e = entry(start);
        let ttl = Duration::from_secs(300);
        assert!(e.is_fresh(start + chrono::Duration::seconds(299), ttl));
        assert!(!e.is_fresh(start + chrono::Duration::seconds(300), ttl));
    }

    #[test]
    fn test_clock_skew_counts_as_zero_age() {
        let start = Utc::now();
        let e = entry(start);
        assert_eq!(e.age(start - chrono::Duration::seconds(10)), Duration::ZERO);
    }
}
