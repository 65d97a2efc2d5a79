//! Credential store capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use beautydesk_core::result::AppResult;
use beautydesk_entity::identity::{Identity, NewIdentity};

/// Holds identity records for the auth core.
///
/// Implementations enforce case-insensitive uniqueness of email and username
/// across both columns and report violations as `ErrorKind::Conflict`.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find the identity whose email or username equals `identifier`, ignoring case.
    async fn find_by_email_or_username(&self, identifier: &str) -> AppResult<Option<Identity>>;

    /// Find an identity by its primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>>;

    /// Create a new identity and return it.
    async fn insert(&self, data: &NewIdentity) -> AppResult<Identity>;

    /// Stamp the last successful login time.
    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Activate or deactivate an identity.
    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<()>;

    /// Count all identities, active or not.
    async fn count(&self) -> AppResult<u64>;
}
