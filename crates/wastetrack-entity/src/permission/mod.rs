//! Role/permission reference data.

pub mod action;
pub mod model;
pub mod module;

pub use action::PermissionAction;
pub use model::RolePermission;
