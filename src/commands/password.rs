//! Password policy and hashing commands.

use clap::{Args, Subcommand};

use beautydesk_auth::{PasswordHasher, PasswordValidator};
use beautydesk_core::config::AppConfig;
use beautydesk_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for password commands
#[derive(Debug, Args)]
pub struct PasswordArgs {
    /// Password subcommand
    #[command(subcommand)]
    pub command: PasswordCommand,
}

/// Password subcommands
#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Check a password against the configured policy
    Check {
        /// Password to check; prompted for when omitted
        password: Option<String>,
    },
    /// Print an Argon2id hash for a password
    Hash,
}

/// Execute password commands
pub async fn execute(
    args: &PasswordArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        PasswordCommand::Check { password } => {
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };

            let check = PasswordValidator::new(&config.password).validate(&password);
            match format {
                OutputFormat::Json => output::print_item(&check, format),
                OutputFormat::Table if check.is_valid => {
                    output::print_success("Password meets the policy")
                }
                OutputFormat::Table => {
                    for error in &check.errors {
                        output::print_warning(error);
                    }
                }
            }

            if !check.is_valid {
                return Err(AppError::validation("Password does not meet the policy"));
            }
        }
        PasswordCommand::Hash => {
            let password = super::prompt_new_password()?;
            let hasher = PasswordHasher::new(&config.password)?;
            let hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
                .await
                .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))??;
            println!("{hash}");
        }
    }

    Ok(())
}
