//! # wastetrack-cache
//!
//! Storage providers for the persisted session mirror. Supports two modes:
//!
//! - **memory**: In-process storage using [moka](https://crates.io/crates/moka)
//! - **file**: One JSON file per key under a configured directory, shared by
//!   every process of the same operator
//!
//! The provider is selected at runtime based on configuration.

pub mod file;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::StorageManager;
