//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod identity;
pub mod logging;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::identity::IdentityConfig;
pub use self::logging::LoggingConfig;
pub use self::session::{SessionConfig, StorageProviderKind};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Hosted identity service settings.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Session cache and authorization settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// `path` names the base file (extension optional). An overlay
    /// `config/{WASTETRACK_ENV}.toml` is merged when present, followed by
    /// environment variables such as `WASTETRACK__SESSION__PROFILE_TTL_SECONDS`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let env = std::env::var("WASTETRACK_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WASTETRACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(path, env = %env, storage = %config.session.storage, "Configuration loaded");
        Ok(config)
    }
}
