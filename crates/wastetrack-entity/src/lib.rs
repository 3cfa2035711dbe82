//! # wastetrack-entity
//!
//! Domain entity models for WasteTrack. Database rows derive
//! `sqlx::FromRow`; everything that crosses the persisted session mirror
//! or the identity service derives `Serialize`/`Deserialize`.

pub mod identity;
pub mod navigation;
pub mod permission;
pub mod session;
pub mod user;
