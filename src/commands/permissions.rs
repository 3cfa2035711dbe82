//! Role permission table commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use wastetrack_core::config::AppConfig;
use wastetrack_core::error::AppError;
use wastetrack_database::repositories::PermissionRepository;
use wastetrack_entity::permission::{PermissionAction, RolePermission, module};
use wastetrack_entity::user::UserRole;

/// Arguments for permission commands
#[derive(Debug, Args)]
pub struct PermissionArgs {
    /// Permission subcommand
    #[command(subcommand)]
    pub command: PermissionCommand,
}

/// Permission subcommands
#[derive(Debug, Subcommand)]
pub enum PermissionCommand {
    /// List permission rows
    List {
        /// Filter by role
        #[arg(short, long)]
        role: Option<UserRole>,
    },
    /// Create or replace the row for a role and module
    Grant {
        /// Role (e.g. supervisor, transportista)
        role: UserRole,
        /// Module (e.g. residuos, reportes)
        module: String,
        /// Allow reading
        #[arg(long)]
        read: bool,
        /// Allow writing
        #[arg(long)]
        write: bool,
        /// Allow deleting
        #[arg(long)]
        delete: bool,
    },
    /// Remove the row for a role and module
    Revoke {
        /// Role
        role: UserRole,
        /// Module
        module: String,
    },
}

/// Permission display row
#[derive(Debug, Serialize, Tabled)]
struct PermissionRow {
    role: String,
    module: String,
    read: bool,
    write: bool,
    delete: bool,
}

impl From<&RolePermission> for PermissionRow {
    fn from(p: &RolePermission) -> Self {
        Self {
            role: p.role.to_string(),
            module: p.module.clone(),
            read: p.can_read,
            write: p.can_write,
            delete: p.can_delete,
        }
    }
}

impl PermissionCommand {
    /// Access the signed-in operator needs on the permissions module
    fn required_action(&self) -> PermissionAction {
        match self {
            Self::List { .. } => PermissionAction::Read,
            Self::Grant { .. } => PermissionAction::Write,
            Self::Revoke { .. } => PermissionAction::Delete,
        }
    }
}

/// Execute permission commands
pub async fn execute(
    args: &PermissionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    super::session_manager(config)
        .await?
        .authorize(args.command.required_action(), module::PERMISSIONS)
        .await?;

    let db = super::create_db_pool(config).await?;
    let repo = PermissionRepository::new(db.pool().clone());

    match &args.command {
        PermissionCommand::List { role } => {
            let permissions = match role {
                Some(role) => repo.find_by_role(*role).await?,
                None => repo.find_all().await?,
            };
            let rows: Vec<PermissionRow> = permissions.iter().map(PermissionRow::from).collect();
            output::print_list(&rows, format);
        }
        PermissionCommand::Grant {
            role,
            module: name,
            read,
            write,
            delete,
        } => {
            if !module::ALL.contains(&name.as_str()) {
                output::print_warning(&format!(
                    "'{name}' is not a built-in module; no menu entry refers to it"
                ));
            }

            let mut row = RolePermission::new(*role, name.clone());
            for (granted, action) in [
                (*read, PermissionAction::Read),
                (*write, PermissionAction::Write),
                (*delete, PermissionAction::Delete),
            ] {
                if granted {
                    row = row.with(action);
                }
            }

            let saved = repo.upsert(&row).await?;
            output::print_success(&format!("Permissions for {role} on '{name}' saved"));
            output::print_record(&PermissionRow::from(&saved), format);
        }
        PermissionCommand::Revoke { role, module: name } => {
            if !repo.delete(*role, name).await? {
                return Err(AppError::not_found(format!(
                    "No permission row for {role} on '{name}'"
                )));
            }
            output::print_success(&format!("Permissions for {role} on '{name}' revoked"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_action_per_command() {
        let list = PermissionCommand::List { role: None };
        let grant = PermissionCommand::Grant {
            role: UserRole::Supervisor,
            module: module::REPORTS.into(),
            read: true,
            write: false,
            delete: false,
        };
        let revoke = PermissionCommand::Revoke {
            role: UserRole::Supervisor,
            module: module::REPORTS.into(),
        };

        assert_eq!(list.required_action(), PermissionAction::Read);
        assert_eq!(grant.required_action(), PermissionAction::Write);
        assert_eq!(revoke.required_action(), PermissionAction::Delete);
    }
}
