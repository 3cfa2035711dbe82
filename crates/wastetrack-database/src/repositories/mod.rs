//! Repository implementations for the session layer's tables.

pub mod permission;
pub mod user;

pub use permission::PermissionRepository;
pub use user::UserRepository;
