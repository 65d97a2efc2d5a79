//! CLI command definitions and dispatch.

pub mod migrate;
pub mod password;
pub mod token;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use beautydesk_auth::AuthSessionService;
use beautydesk_core::config::AppConfig;
use beautydesk_core::error::AppError;
use beautydesk_core::traits::SystemClock;
use beautydesk_database::{DatabasePool, IdentityRepository};

use crate::output::OutputFormat;

/// BeautyDesk: salon staff account administration
#[derive(Debug, Parser)]
#[command(name = "beautydesk", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
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
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Staff account management
    User(user::UserArgs),
    /// Password policy and hashing
    Password(password::PasswordArgs),
    /// Token inspection
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::User(args) => user::execute(args, config, self.format).await,
            Commands::Password(args) => password::execute(args, config, self.format).await,
            Commands::Token(args) => token::execute(args, config, self.format),
        }
    }
}

/// Helper: connect to the configured database
pub async fn connect(config: &AppConfig) -> Result<IdentityRepository, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(IdentityRepository::new(pool.into_pool()))
}

/// Helper: build the auth service over the PostgreSQL credential store
pub fn auth_service(
    config: &AppConfig,
    repo: IdentityRepository,
) -> Result<AuthSessionService, AppError> {
    AuthSessionService::new(config, Arc::new(repo), Arc::new(SystemClock))
}

/// Helper: prompt for a password twice
pub fn prompt_new_password() -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
