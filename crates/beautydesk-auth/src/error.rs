//! Caller-facing authentication failures.
//!
//! [`AuthError`] is the only error type the session service returns. Its
//! `Display` text is what a UI may show, so no variant carries internal
//! detail; the underlying cause is logged where it is collapsed.

use thiserror::Error;

use beautydesk_core::error::{AppError, ErrorKind};

/// Every way an auth operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Malformed input. Carries one human-readable reason per problem.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// Too many recent failures for this identifier.
    #[error(
        "Too many failed login attempts. Please try again in {remaining_minutes} minute(s)."
    )]
    RateLimited {
        /// Remaining lockout rounded up to whole minutes.
        remaining_minutes: i64,
        /// Remaining lockout in milliseconds.
        remaining_ms: i64,
    },

    /// Unknown identifier or wrong password. The two are indistinguishable.
    #[error("Invalid email/username or password")]
    InvalidCredentials,

    /// The identity exists but has been deactivated.
    #[error("This account has been disabled. Please contact an administrator.")]
    AccountDisabled,

    /// Missing, malformed, tampered, revoked, or expired token.
    #[error("Invalid or expired session")]
    InvalidToken,

    /// Registration collided with an existing email or username.
    #[error("An account with this email or username already exists")]
    DuplicateIdentity,

    /// Anything unexpected. Details are logged, never returned.
    #[error("An internal error occurred. Please try again later.")]
    Internal,
}

impl AuthError {
    /// Convenience constructor for a single validation reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(vec![reason.into()])
    }

    /// Builds a rate-limit error from a remaining duration in milliseconds.
    pub fn rate_limited(remaining_ms: i64) -> Self {
        let remaining_ms = remaining_ms.max(0);
        let remaining_minutes = ((remaining_ms + 59_999) / 60_000).max(1);
        Self::RateLimited {
            remaining_minutes,
            remaining_ms,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::RateLimited { .. } => ErrorKind::RateLimit,
            AuthError::InvalidCredentials | AuthError::InvalidToken => ErrorKind::Authentication,
            AuthError::AccountDisabled => ErrorKind::Authorization,
            AuthError::DuplicateIdentity => ErrorKind::Conflict,
            AuthError::Internal => ErrorKind::Internal,
        };
        AppError::new(kind, err.to_string())
    }
}
