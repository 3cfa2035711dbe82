//! User profile management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use wastetrack_core::config::AppConfig;
use wastetrack_core::error::AppError;
use wastetrack_database::repositories::UserRepository;
use wastetrack_entity::permission::{PermissionAction, module};
use wastetrack_entity::user::{ProfileUpdate, UserProfile, UserRole};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users
    List {
        /// Filter by role
        #[arg(short, long)]
        role: Option<UserRole>,
    },
    /// Change name, role, or department
    Update {
        /// User ID
        id: Uuid,
        /// Version the change is based on (see `users list`)
        #[arg(long)]
        version: i64,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New role
        #[arg(long)]
        role: Option<UserRole>,
        /// New department
        #[arg(long)]
        department: Option<String>,
    },
    /// Allow a user to sign in
    Activate {
        /// User ID
        id: Uuid,
        /// Expected version (defaults to the current one)
        #[arg(long)]
        version: Option<i64>,
    },
    /// Prevent a user from signing in
    Deactivate {
        /// User ID
        id: Uuid,
        /// Expected version (defaults to the current one)
        #[arg(long)]
        version: Option<i64>,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    department: String,
    active: bool,
    version: i64,
    updated_at: String,
}

impl From<&UserProfile> for UserRow {
    fn from(u: &UserProfile) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.full_name.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            department: u.department.clone().unwrap_or_else(|| "-".into()),
            active: u.active,
            version: u.version,
            updated_at: u
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        UserCommand::List { role } => {
            super::session_manager(config)
                .await?
                .authorize(PermissionAction::Read, module::USERS)
                .await?;
            let db = super::create_db_pool(config).await?;
            let users = UserRepository::new(db.pool().clone()).find_all(*role).await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Update {
            id,
            version,
            name,
            role,
            department,
        } => {
            let patch = ProfileUpdate {
                full_name: name.clone(),
                role: *role,
                department: department.clone(),
            };
            let manager = super::session_manager(config).await?;
            let updated = manager.update_profile(*id, &patch, *version).await?;
            output::print_success(&format!("User {id} updated to version {}", updated.version));
            output::print_record(&UserRow::from(&updated), format);
        }
        UserCommand::Activate { id, version } => {
            set_active(config, *id, true, *version, format).await?;
        }
        UserCommand::Deactivate { id, version } => {
            set_active(config, *id, false, *version, format).await?;
        }
    }

    Ok(())
}

async fn set_active(
    config: &AppConfig,
    id: Uuid,
    active: bool,
    version: Option<i64>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::session_manager(config).await?;
    manager.authorize(PermissionAction::Write, module::USERS).await?;

    let version = match version {
        Some(v) => v,
        None => {
            let db = super::create_db_pool(config).await?;
            UserRepository::new(db.pool().clone())
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?
                .version
        }
    };

    let updated = manager.set_active(id, active, version).await?;
    let verb = if active { "activated" } else { "deactivated" };
    output::print_success(&format!("User {id} {verb}"));
    output::print_record(&UserRow::from(&updated), format);
    Ok(())
}
