//! PostgreSQL identity repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use beautydesk_core::error::{AppError, ErrorKind};
use beautydesk_core::result::AppResult;
use beautydesk_entity::identity::{Identity, NewIdentity, Role};

use crate::store::CredentialStore;

const EMAIL_KEY: &str = "identities_email_lower_key";
const USERNAME_KEY: &str = "identities_username_lower_key";

/// Credential store backed by the `identities` table.
#[derive(Debug, Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    /// Create a new identity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List identities, optionally only those with `role`, oldest first.
    pub async fn list(&self, role: Option<Role>) -> AppResult<Vec<Identity>> {
        let query = match role {
            Some(role) => sqlx::query_as::<_, Identity>(
                "SELECT * FROM identities WHERE role = $1 ORDER BY created_at",
            )
            .bind(role),
            None => {
                sqlx::query_as::<_, Identity>("SELECT * FROM identities ORDER BY created_at")
            }
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list identities", e))
    }
}

/// Translate a unique-index violation into a conflict error.
fn conflict_for(constraint: Option<&str>, data: &NewIdentity) -> Option<AppError> {
    match constraint {
        Some(EMAIL_KEY) => Some(AppError::conflict("Email already in use")),
        Some(USERNAME_KEY) => Some(AppError::conflict(format!(
            "Username '{}' already exists",
            data.username
        ))),
        _ => None,
    }
}

#[async_trait]
impl CredentialStore for IdentityRepository {
    async fn find_by_email_or_username(&self, identifier: &str) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>(
            "SELECT * FROM identities \
             WHERE LOWER(email) = LOWER($1) OR LOWER(username) = LOWER($1) \
             LIMIT 1",
        )
        .bind(identifier.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find identity", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find identity by id", e)
            })
    }

    async fn insert(&self, data: &NewIdentity) -> AppResult<Identity> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // The unique indexes cover each column; this covers email-vs-username.
        let shadowed: Option<(String,)> = sqlx::query_as(
            "SELECT email FROM identities \
             WHERE LOWER(email) IN (LOWER($1), LOWER($2)) \
                OR LOWER(username) IN (LOWER($1), LOWER($2)) \
             LIMIT 1",
        )
        .bind(data.email.trim())
        .bind(data.username.trim())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check identity uniqueness", e)
        })?;

        if shadowed.is_some() {
            return Err(AppError::conflict("Email or username already in use"));
        }

        let identity = sqlx::query_as::<_, Identity>(
            "INSERT INTO identities (id, email, username, first_name, last_name, role, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.email.trim())
        .bind(data.username.trim())
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role)
        .bind(&data.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let constraint = match &e {
                sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
                _ => None,
            };
            conflict_for(constraint.as_deref(), data).unwrap_or_else(|| {
                AppError::with_source(ErrorKind::Database, "Failed to create identity", e)
            })
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit identity", e)
        })?;

        Ok(identity)
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE identities SET last_login_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE identities SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(active)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update active flag", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Identity {id} not found")));
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identities")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count identities", e)
            })?;
        Ok(total.max(0) as u64)
    }
}
