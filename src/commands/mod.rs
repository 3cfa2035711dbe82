//! CLI command definitions and dispatch.

pub mod config;
pub mod permissions;
pub mod session;
pub mod users;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use wastetrack_auth::{GoTrueClient, SessionManager};
use wastetrack_cache::StorageManager;
use wastetrack_core::config::AppConfig;
use wastetrack_core::error::AppError;
use wastetrack_core::traits::clock::SystemClock;
use wastetrack_database::DatabasePool;
use wastetrack_database::repositories::{PermissionRepository, UserRepository};

/// WasteTrack: session and access administration for the waste dashboard
#[derive(Debug, Parser)]
#[command(name = "wastetrack", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login(session::LoginArgs),
    /// Sign out and clear the local session
    Logout,
    /// Show the signed-in profile
    Whoami {
        /// Bypass the session cache
        #[arg(long)]
        refresh: bool,
    },
    /// Show the session lifecycle state
    State,
    /// Show the navigation entries visible to the signed-in user
    Nav,
    /// Role permission table management
    Permissions(permissions::PermissionArgs),
    /// User profile management
    Users(users::UserArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Login(args) => session::login(args, &config, self.format).await,
            Commands::Logout => session::logout(&config).await,
            Commands::Whoami { refresh } => session::whoami(*refresh, &config, self.format).await,
            Commands::State => session::state(&config, self.format).await,
            Commands::Nav => session::nav(&config, self.format).await,
            Commands::Permissions(args) => permissions::execute(args, &config, self.format).await,
            Commands::Users(args) => users::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: wire a session manager against the configured backends
///
/// The pool connects lazily: an unreachable database degrades profile
/// resolution instead of failing the command up front.
pub async fn session_manager(config: &AppConfig) -> Result<SessionManager, AppError> {
    let db = DatabasePool::connect_lazy(&config.database)?;
    let storage = Arc::new(StorageManager::new(&config.session).await?);
    let identity = Arc::new(GoTrueClient::new(&config.identity)?);

    Ok(SessionManager::new(
        &config.session,
        identity,
        Arc::new(UserRepository::new(db.pool().clone())),
        Arc::new(PermissionRepository::new(db.pool().clone())),
        storage,
        Arc::new(SystemClock),
    ))
}
