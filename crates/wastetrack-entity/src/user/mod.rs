//! User profile entities.

pub mod model;
pub mod role;

pub use model::{ProfileUpdate, UserProfile};
pub use role::UserRole;
