//! Sign-in, sign-out, and session inspection commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use wastetrack_auth::{ResolvedProfile, SessionState};
use wastetrack_core::config::AppConfig;
use wastetrack_core::error::AppError;
use wastetrack_entity::navigation::default_navigation;

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Email address (prompted when omitted)
    #[arg(short, long)]
    pub email: Option<String>,
}

/// Profile display row
#[derive(Debug, Serialize, Tabled)]
struct ProfileRow {
    id: String,
    name: String,
    email: String,
    role: String,
    department: String,
    active: bool,
    version: i64,
    source: String,
}

impl From<&ResolvedProfile> for ProfileRow {
    fn from(resolved: &ResolvedProfile) -> Self {
        let p = resolved.profile();
        Self {
            id: p.id.to_string(),
            name: p.full_name.clone(),
            email: p.email.clone(),
            role: p.role.to_string(),
            department: p.department.clone().unwrap_or_else(|| "-".into()),
            active: p.active,
            version: p.version,
            source: match resolved.degradation_reason() {
                None => "profile table".into(),
                Some(reason) => format!("identity metadata ({reason})"),
            },
        }
    }
}

/// Navigation display row
#[derive(Debug, Serialize, Tabled)]
struct NavRow {
    title: &'static str,
    route: &'static str,
    module: &'static str,
}

/// Sign in, prompting for missing credentials
pub async fn login(args: &LoginArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let email = match &args.email {
        Some(email) => email.clone(),
        None => dialoguer::Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
    };
    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

    let manager = super::session_manager(config).await?;
    let resolved = manager.sign_in(&email, &password).await?;

    output::print_success(&format!(
        "Signed in as {} ({})",
        resolved.profile().full_name,
        resolved.profile().role
    ));
    warn_if_degraded(&resolved);
    output::print_record(&ProfileRow::from(&resolved), format);
    Ok(())
}

/// Sign out
pub async fn logout(config: &AppConfig) -> Result<(), AppError> {
    let manager = super::session_manager(config).await?;
    manager.sign_out().await?;
    output::print_success("Signed out");
    Ok(())
}

/// Show the current profile
pub async fn whoami(refresh: bool, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let manager = super::session_manager(config).await?;
    match manager.current_user(refresh).await? {
        Some(resolved) => {
            warn_if_degraded(&resolved);
            output::print_record(&ProfileRow::from(&resolved), format);
        }
        None => output::print_warning("Not signed in"),
    }
    Ok(())
}

/// Show the lifecycle state after resolving from cache
pub async fn state(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let manager = super::session_manager(config).await?;
    manager.current_user(false).await?;
    let state = manager.state();

    match format {
        OutputFormat::Json => output::print_json(&state),
        OutputFormat::Table => {
            output::print_kv("State", &state.to_string());
            if let SessionState::Authenticated {
                user_id,
                role,
                degraded,
                ..
            } = &state
            {
                output::print_kv("User", &user_id.to_string());
                output::print_kv("Role", role.as_str());
                output::print_kv("Degraded", &degraded.to_string());
            }
        }
    }
    Ok(())
}

/// Show visible navigation entries
pub async fn nav(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let manager = super::session_manager(config).await?;
    let rows: Vec<NavRow> = manager
        .navigation(default_navigation())
        .await?
        .into_iter()
        .map(|item| NavRow {
            title: item.title,
            route: item.route,
            module: item.module.unwrap_or("-"),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}

fn warn_if_degraded(resolved: &ResolvedProfile) {
    if let Some(reason) = resolved.degradation_reason() {
        output::print_warning(&format!(
            "Profile could not be read ({reason}); showing sign-up metadata, changes are disabled"
        ));
    }
}
