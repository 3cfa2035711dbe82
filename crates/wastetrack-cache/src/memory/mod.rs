//! In-memory session storage.

pub mod store;

pub use store::MemorySessionStorage;
