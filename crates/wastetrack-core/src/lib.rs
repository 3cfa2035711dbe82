//! # wastetrack-core
//!
//! Core crate for WasteTrack. Contains the unified error system,
//! configuration schemas, and the seam traits (clock and session storage)
//! that the session layer is built against.
//!
//! This crate has **no** internal dependencies on other WasteTrack crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
