//! Login attempt throttling configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::auth::lifetime;
use crate::error::AppError;

/// Upper bound on the lockout window and attempt retention, in hours.
const MAX_RETENTION_HOURS: i64 = 24 * 366;

/// Sliding-window lockout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Failed attempts inside the window that trigger a lockout.
    #[serde(default = "default_max_attempts")]
    pub max_login_attempts: u32,
    /// Length of the sliding lockout window in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: i64,
    /// How long attempt history is kept at all, in hours.
    #[serde(default = "default_retention")]
    pub attempt_retention_hours: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_attempts(),
            lockout_duration_minutes: default_lockout(),
            attempt_retention_hours: default_retention(),
        }
    }
}

impl RateLimitConfig {
    /// Rejects windows that could never block or never forget.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_login_attempts == 0 {
            return Err(AppError::configuration(
                "rate_limit.max_login_attempts must be at least 1",
            ));
        }
        let window = self.lockout_window()?;
        if self.retention()? < window {
            return Err(AppError::configuration(
                "rate_limit.attempt_retention_hours must cover the lockout window",
            ));
        }
        Ok(())
    }

    /// Length of the sliding lockout window.
    pub fn lockout_window(&self) -> Result<TimeDelta, AppError> {
        lifetime(
            "rate_limit.lockout_duration_minutes",
            self.lockout_duration_minutes,
            MAX_RETENTION_HOURS * 60,
            TimeDelta::try_minutes,
        )
    }

    /// How long attempt history is kept.
    pub fn retention(&self) -> Result<TimeDelta, AppError> {
        lifetime(
            "rate_limit.attempt_retention_hours",
            self.attempt_retention_hours,
            MAX_RETENTION_HOURS,
            TimeDelta::try_hours,
        )
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout() -> i64 {
    15
}

fn default_retention() -> i64 {
    24
}
