//! # wastetrack-auth
//!
//! Session and authorization layer for the WasteTrack dashboard.
//!
//! ## Modules
//!
//! - `identity`: hosted auth service client (sign-in, sign-out, current identity)
//! - `profile`: session cache and profile resolution with metadata fallback
//! - `rbac`: role/permission loading, the access policy, and navigation gating
//! - `session`: session lifecycle (sign-in/out, state, profile updates)

pub mod identity;
pub mod profile;
pub mod rbac;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use identity::{AuthFailure, GoTrueClient, IdentityProvider, TokenStore};
pub use profile::{ProfileResolver, ProfileStore, ResolvedProfile, SessionCache};
pub use rbac::{AccessPolicy, Decision, PermissionLoader, PermissionSource, filter_navigation, has_permission};
pub use session::{Freshness, SessionManager, SessionState};
