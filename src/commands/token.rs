//! Token inspection commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use beautydesk_auth::JwtDecoder;
use beautydesk_core::config::AppConfig;
use beautydesk_core::error::AppError;
use beautydesk_core::traits::SystemClock;

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Verify a token with the configured secrets and show its claims
    Inspect {
        /// Access or refresh token
        token: String,
    },
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let decoder = JwtDecoder::new(&config.auth, Arc::new(SystemClock));

    match &args.command {
        TokenCommand::Inspect { token } => {
            if let Ok(claims) = decoder.decode_access_token(token) {
                if format == OutputFormat::Table {
                    output::print_kv("type", "access");
                    output::print_kv("identity", &claims.sub.to_string());
                    output::print_kv("email", &claims.email);
                    output::print_kv("role", claims.role.as_str());
                    output::print_kv("lifetime (s)", &claims.lifetime_seconds().to_string());
                    output::print_kv("expires", &format_expiry(claims.expires_at()));
                } else {
                    output::print_item(&claims, format);
                }
                return Ok(());
            }

            if let Ok(claims) = decoder.decode_refresh_token(token) {
                if format == OutputFormat::Table {
                    output::print_kv("type", "refresh");
                    output::print_kv("identity", &claims.sub.to_string());
                    output::print_kv("token id", &claims.jti.to_string());
                    output::print_kv("expires", &format_expiry(claims.expires_at()));
                } else {
                    output::print_item(&claims, format);
                }
                return Ok(());
            }

            Err(AppError::authentication("Token is invalid or expired"))
        }
    }
}

fn format_expiry(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map(|t| t.to_rfc3339()).unwrap_or_else(|| "unknown".to_string())
}
