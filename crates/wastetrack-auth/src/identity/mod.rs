//! Hosted identity service integration.

pub mod error;
pub mod gotrue;
pub mod provider;
pub mod tokens;

pub use error::AuthFailure;
pub use gotrue::GoTrueClient;
pub use provider::IdentityProvider;
pub use tokens::TokenStore;
