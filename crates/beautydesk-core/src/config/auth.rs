//! Token signing and lifetime configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound on any token lifetime, in days.
const MAX_LIFETIME_DAYS: i64 = 36_500;

/// Token issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from the access secret.
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// `iss` claim written into and required on access tokens.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// `aud` claim written into and required on access tokens.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Access token lifetime without remember-me, in minutes.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: i64,
    /// Access token lifetime with remember-me, in days.
    #[serde(default = "default_remember_me")]
    pub remember_me_duration_days: i64,
    /// Refresh token lifetime, in days.
    #[serde(default = "default_refresh_duration")]
    pub refresh_token_duration_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            refresh_token_secret: default_refresh_secret(),
            issuer: default_issuer(),
            audience: default_audience(),
            session_timeout_minutes: default_session_timeout(),
            remember_me_duration_days: default_remember_me(),
            refresh_token_duration_days: default_refresh_duration(),
        }
    }
}

impl AuthConfig {
    /// Rejects configurations that would weaken token isolation.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err(AppError::configuration("Token secrets must not be empty"));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AppError::configuration(
                "Access and refresh tokens must use distinct secrets",
            ));
        }
        self.session_ttl()?;
        self.remember_me_ttl()?;
        self.refresh_ttl()?;
        Ok(())
    }

    /// Access token lifetime without remember-me.
    pub fn session_ttl(&self) -> Result<TimeDelta, AppError> {
        lifetime(
            "auth.session_timeout_minutes",
            self.session_timeout_minutes,
            MAX_LIFETIME_DAYS * 24 * 60,
            TimeDelta::try_minutes,
        )
    }

    /// Access token lifetime with remember-me.
    pub fn remember_me_ttl(&self) -> Result<TimeDelta, AppError> {
        lifetime(
            "auth.remember_me_duration_days",
            self.remember_me_duration_days,
            MAX_LIFETIME_DAYS,
            TimeDelta::try_days,
        )
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> Result<TimeDelta, AppError> {
        lifetime(
            "auth.refresh_token_duration_days",
            self.refresh_token_duration_days,
            MAX_LIFETIME_DAYS,
            TimeDelta::try_days,
        )
    }
}

/// Converts a configured lifetime, rejecting values outside `1..=max`.
pub(crate) fn lifetime(
    key: &str,
    value: i64,
    max: i64,
    unit: fn(i64) -> Option<TimeDelta>,
) -> Result<TimeDelta, AppError> {
    if !(1..=max).contains(&value) {
        return Err(AppError::configuration(format!(
            "{key} must be between 1 and {max}"
        )));
    }
    unit(value).ok_or_else(|| AppError::configuration(format!("{key} is out of range")))
}

fn default_access_secret() -> String {
    "CHANGE_ME_ACCESS_SECRET".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_REFRESH_SECRET".to_string()
}

fn default_issuer() -> String {
    "beautydesk".to_string()
}

fn default_audience() -> String {
    "beautydesk-app".to_string()
}

fn default_session_timeout() -> i64 {
    30
}

fn default_remember_me() -> i64 {
    30
}

fn default_refresh_duration() -> i64 {
    7
}
