//! Configuration inspection commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use wastetrack_core::config::AppConfig;
use wastetrack_core::error::AppError;
use wastetrack_database::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = mask_password(&shown.database.url);
            shown.identity.anon_key = mask_secret(&shown.identity.anon_key);

            match format {
                OutputFormat::Json => output::print_json(&shown),
                OutputFormat::Table => {
                    output::print_kv("Database", &shown.database.url);
                    output::print_kv("Identity service", &shown.identity.url);
                    output::print_kv("Anon key", &shown.identity.anon_key);
                    output::print_kv(
                        "Profile TTL",
                        &format!("{}s", shown.session.profile_ttl_seconds),
                    );
                    output::print_kv("Session storage", &shown.session.storage.to_string());
                    output::print_kv("Storage directory", &shown.session.storage_dir);
                    output::print_kv(
                        "Degraded writes",
                        if shown.session.allow_degraded_writes { "allowed" } else { "denied" },
                    );
                    output::print_kv(
                        "Admin bypass",
                        if shown.session.admin_bypass { "on" } else { "off" },
                    );
                    output::print_kv(
                        "Logging",
                        &format!("{} ({})", shown.logging.level, shown.logging.format),
                    );
                }
            }
        }
    }

    Ok(())
}

/// Keep only the first characters of a key
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else {
        format!("{}****", secret.chars().take(6).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("eyJhbGciOiJIUzI1NiJ9"), "eyJhbG****");
    }
}
