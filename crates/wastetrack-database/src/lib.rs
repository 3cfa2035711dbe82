//! # wastetrack-database
//!
//! PostgreSQL connection management and the repositories for the two
//! tables the session layer reads: `users` and `permisos`.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::{DatabasePool, mask_password};
