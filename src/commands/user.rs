//! Staff account management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use beautydesk_auth::{AuthError, RegistrationContext, RegistrationRequest};
use beautydesk_core::config::AppConfig;
use beautydesk_core::error::AppError;
use beautydesk_entity::identity::{IdentityProfile, Role};

use crate::output::{self, OutputFormat};

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
    /// List accounts
    List {
        /// Filter by role
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// Create an account as an administrator
    Create {
        /// Email address
        #[arg(long)]
        email: String,
        /// Login name
        #[arg(long)]
        username: String,
        /// Given name
        #[arg(long)]
        first_name: String,
        /// Family name
        #[arg(long)]
        last_name: String,
        /// Role to assign
        #[arg(long, default_value = "employee")]
        role: Role,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Re-activate an account
    Enable {
        /// Email or username
        identifier: String,
    },
    /// Deactivate an account, invalidating its sessions
    Disable {
        /// Email or username
        identifier: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Account display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// Identity ID
    id: String,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Status
    status: String,
    /// Last login
    last_login: String,
}

impl From<&IdentityProfile> for UserRow {
    fn from(identity: &IdentityProfile) -> Self {
        Self {
            id: identity.id.to_string(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role.to_string(),
            status: if identity.is_active { "active" } else { "disabled" }.to_string(),
            last_login: identity
                .last_login_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let repo = super::connect(config).await?;

    match &args.command {
        UserCommand::List { role } => {
            let identities = repo.list(*role).await?;
            let rows: Vec<UserRow> = identities
                .into_iter()
                .map(IdentityProfile::from)
                .map(|p| UserRow::from(&p))
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::Create {
            email,
            username,
            first_name,
            last_name,
            role,
            password,
        } => {
            let password = match password {
                Some(p) => p.clone(),
                None => super::prompt_new_password()?,
            };

            let service = super::auth_service(config, repo)?;
            let identity = service
                .register(
                    RegistrationRequest {
                        email: email.clone(),
                        username: username.clone(),
                        first_name: first_name.clone(),
                        last_name: last_name.clone(),
                        password,
                        role: Some(*role),
                    },
                    RegistrationContext::Invited {
                        inviter_role: Role::Admin,
                    },
                )
                .await
                .map_err(AppError::from)?;

            output::print_success(&format!(
                "Created {} account '{}'",
                identity.role, identity.username
            ));
            output::print_item(&identity, format);
        }
        UserCommand::Enable { identifier } => {
            let service = super::auth_service(config, repo)?;
            let identity = set_active(&service, identifier, true).await?;
            output::print_success(&format!("Account '{}' enabled", identity.username));
        }
        UserCommand::Disable { identifier, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Disable '{identifier}'? Existing sessions stop working immediately."
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let service = super::auth_service(config, repo)?;
            let identity = set_active(&service, identifier, false).await?;
            output::print_success(&format!("Account '{}' disabled", identity.username));
        }
    }

    Ok(())
}

async fn set_active(
    service: &beautydesk_auth::AuthSessionService,
    identifier: &str,
    active: bool,
) -> Result<IdentityProfile, AppError> {
    service
        .set_active(identifier, active)
        .await
        .map_err(|e| match e {
            AuthError::Validation(_) => {
                AppError::not_found(format!("No account matches '{identifier}'"))
            }
            other => other.into(),
        })
}
