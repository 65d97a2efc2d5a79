//! Identity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// An authenticable salon staff account, as held by a credential store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    /// Unique identity identifier.
    pub id: Uuid,
    /// Email address, unique case-insensitively.
    pub email: String,
    /// Login name, unique case-insensitively.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Privilege role.
    pub role: Role,
    /// Deactivated identities cannot log in or use existing tokens.
    pub is_active: bool,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
    /// When the identity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Whether `identifier` names this identity by email or username, ignoring case.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let needle = identifier.trim().to_lowercase();
        self.email.to_lowercase() == needle || self.username.to_lowercase() == needle
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// The public view of this identity, without the password hash.
    pub fn profile(&self) -> IdentityProfile {
        IdentityProfile::from(self.clone())
    }
}

/// Identity data safe to hand to callers. Has no password field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Unique identity identifier.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Privilege role.
    pub role: Role,
    /// Active flag.
    pub is_active: bool,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
    /// When the identity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl From<Identity> for IdentityProfile {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            username: identity.username,
            first_name: identity.first_name,
            last_name: identity.last_name,
            role: identity.role,
            is_active: identity.is_active,
            last_login_at: identity.last_login_at,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

/// Data required to create a new identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIdentity {
    /// Email address.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
}
