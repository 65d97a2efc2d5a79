//! Login attempt event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single login attempt. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// Email or username exactly as submitted.
    pub identifier: String,
    /// When the attempt happened.
    pub attempted_at: DateTime<Utc>,
    /// Whether the credentials were accepted.
    pub success: bool,
    /// Client address, when the caller knows it.
    pub origin: Option<String>,
}

impl LoginAttempt {
    /// Records a failed attempt.
    pub fn failed(
        identifier: impl Into<String>,
        attempted_at: DateTime<Utc>,
        origin: Option<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            attempted_at,
            success: false,
            origin,
        }
    }

    /// Records a successful attempt.
    pub fn succeeded(
        identifier: impl Into<String>,
        attempted_at: DateTime<Utc>,
        origin: Option<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            attempted_at,
            success: true,
            origin,
        }
    }
}
