//! Session lifecycle: sign-in, sign-out, resolution state, profile updates.

pub mod manager;
pub mod state;

pub use manager::SessionManager;
pub use state::{Freshness, SessionState};
