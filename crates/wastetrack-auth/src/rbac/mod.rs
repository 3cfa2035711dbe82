//! Role/permission table, access policy, and navigation gating.

pub mod loader;
pub mod navigation;
pub mod policy;

pub use loader::{PermissionLoader, PermissionSource};
pub use navigation::filter_navigation;
pub use policy::{AccessPolicy, Decision, has_permission};
