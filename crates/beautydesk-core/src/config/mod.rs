//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section falls back to its defaults when omitted.

pub mod auth;
pub mod database;
pub mod logging;
pub mod password;
pub mod rate_limit;
pub mod registration;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::password::PasswordConfig;
pub use self::rate_limit::RateLimitConfig;
pub use self::registration::RegistrationConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "BEAUTYDESK";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token signing and lifetime settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Password policy and hashing cost.
    #[serde(default)]
    pub password: PasswordConfig,
    /// Login attempt throttling.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Role assignment for new identities.
    #[serde(default)]
    pub registration: RegistrationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges `config/default`, the given file, and environment variables
    /// prefixed with `BEAUTYDESK__` (e.g. `BEAUTYDESK__AUTH__ISSUER`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks cross-field invariants of every section.
    pub fn validate(&self) -> Result<(), AppError> {
        self.auth.validate()?;
        self.password.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.rate_limit.max_login_attempts, 5);
        assert_eq!(config.rate_limit.lockout_duration_minutes, 15);
        assert_eq!(config.auth.session_timeout_minutes, 30);
        assert_eq!(config.auth.remember_me_duration_days, 30);
        assert_eq!(config.auth.refresh_token_duration_days, 7);
        assert_eq!(config.password.min_length, 8);
        assert!(config.password.require_mixed_case_digit_special);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[rate_limit]\nmax_login_attempts = 3\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.rate_limit.max_login_attempts, 3);
        assert_eq!(config.rate_limit.lockout_duration_minutes, 15);
        assert_eq!(config.auth.issuer, "beautydesk");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("config/does-not-exist").unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
