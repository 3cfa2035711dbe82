//! Profile resolution and the session cache.

pub mod cache;
pub mod resolved;
pub mod resolver;
pub mod store;

pub use cache::SessionCache;
pub use resolved::ResolvedProfile;
pub use resolver::ProfileResolver;
pub use store::ProfileStore;
