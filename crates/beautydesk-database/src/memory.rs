//! In-memory credential store using a Tokio lock for single-node deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use beautydesk_core::error::AppError;
use beautydesk_core::result::AppResult;
use beautydesk_entity::identity::{Identity, NewIdentity};

use crate::store::CredentialStore;

/// In-memory credential store.
///
/// Uniqueness is checked and the insert performed under one write lock, so
/// concurrent registrations for the same email cannot both succeed.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    identities: Arc<RwLock<HashMap<Uuid, Identity>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Returns the conflict message if `data` collides with `existing`.
fn collision(existing: &Identity, data: &NewIdentity) -> Option<AppError> {
    if existing.matches_identifier(&data.email) {
        return Some(AppError::conflict("Email already in use"));
    }
    if existing.matches_identifier(&data.username) {
        return Some(AppError::conflict(format!(
            "Username '{}' already exists",
            data.username
        )));
    }
    None
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email_or_username(&self, identifier: &str) -> AppResult<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .find(|identity| identity.matches_identifier(identifier))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        Ok(self.identities.read().await.get(&id).cloned())
    }

    async fn insert(&self, data: &NewIdentity) -> AppResult<Identity> {
        let mut identities = self.identities.write().await;

        if let Some(err) = identities.values().find_map(|existing| collision(existing, data)) {
            return Err(err);
        }

        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            email: data.email.trim().to_string(),
            username: data.username.trim().to_string(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            role: data.role,
            is_active: true,
            password_hash: data.password_hash.clone(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        identities.insert(identity.id, identity.clone());
        debug!(identity_id = %identity.id, "Identity stored in memory");
        Ok(identity)
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))?;
        identity.last_login_at = Some(at);
        identity.updated_at = Utc::now();
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<()> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))?;
        identity.is_active = active;
        identity.updated_at = Utc::now();
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.identities.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beautydesk_entity::identity::Role;

    fn new_identity(email: &str, username: &str) -> NewIdentity {
        NewIdentity {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Employee,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_case_insensitive() {
        let store = MemoryCredentialStore::new();
        let created = store
            .insert(&new_identity("ana@salon.com", "ana"))
            .await
            .unwrap();

        let by_email = store
            .find_by_email_or_username("ANA@SALON.COM")
            .await
            .unwrap()
            .unwrap();
        let by_username = store.find_by_email_or_username("Ana").await.unwrap().unwrap();

        assert_eq!(by_email.id, created.id);
        assert_eq!(by_username.id, created.id);
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_non_ascii_username_conflicts_across_case() {
        let store = MemoryCredentialStore::new();
        store
            .insert(&new_identity("zoe@salon.com", "zoë"))
            .await
            .unwrap();

        let err = store
            .insert(&new_identity("zoe2@salon.com", "ZOË"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(store.find_by_email_or_username("ZOË").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryCredentialStore::new();
        store
            .insert(&new_identity("ana@salon.com", "ana"))
            .await
            .unwrap();

        let err = store
            .insert(&new_identity("Ana@Salon.com", "ana2"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_username_may_not_shadow_email() {
        let store = MemoryCredentialStore::new();
        store
            .insert(&new_identity("ana@salon.com", "ana"))
            .await
            .unwrap();

        let err = store
            .insert(&new_identity("other@salon.com", "ana@salon.com"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_active_and_last_login() {
        let store = MemoryCredentialStore::new();
        let created = store
            .insert(&new_identity("ana@salon.com", "ana"))
            .await
            .unwrap();

        store.set_active(created.id, false).await.unwrap();
        let at = Utc::now();
        store.update_last_login(created.id, at).await.unwrap();

        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert!(!found.is_active);
        assert_eq!(found.last_login_at, Some(at));
    }

    #[tokio::test]
    async fn test_set_active_unknown_id() {
        let store = MemoryCredentialStore::new();
        let err = store.set_active(Uuid::new_v4(), false).await.unwrap_err();
        assert_eq!(err.kind, beautydesk_core::error::ErrorKind::NotFound);
    }
}
