//! Login attempt history storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use beautydesk_core::result::AppResult;
use beautydesk_entity::attempt::LoginAttempt;

/// Append-only attempt history keyed by normalized identifier.
///
/// A shared backend (for multi-instance deployments) must keep `append`
/// atomic per key: the new attempt and the pruning of old ones are one step.
#[async_trait]
pub trait AttemptStore: Send + Sync + std::fmt::Debug + 'static {
    /// Appends `attempt` under `key` and drops attempts at or before
    /// `retain_after` under every key. Keys left without history are removed.
    async fn append(
        &self,
        key: &str,
        attempt: LoginAttempt,
        retain_after: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Timestamps of failed attempts under `key` strictly after `since`, oldest first.
    async fn failures_since(&self, key: &str, since: DateTime<Utc>) -> AppResult<Vec<DateTime<Utc>>>;

    /// Removes all history under `key`.
    async fn clear(&self, key: &str) -> AppResult<()>;
}

/// In-process attempt history using a sharded concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttemptStore {
    attempts: Arc<DashMap<String, Vec<LoginAttempt>>>,
}

impl MemoryAttemptStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers with retained history.
    pub fn tracked_identifiers(&self) -> usize {
        self.attempts.len()
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn append(
        &self,
        key: &str,
        attempt: LoginAttempt,
        retain_after: DateTime<Utc>,
    ) -> AppResult<()> {
        // Prune every key; keys with no history left are dropped.
        self.attempts.retain(|_, history| {
            history.retain(|a| a.attempted_at > retain_after);
            !history.is_empty()
        });

        if attempt.attempted_at > retain_after {
            let mut history = self.attempts.entry(key.to_string()).or_default();
            history.push(attempt);
            history.sort_by_key(|a| a.attempted_at);
        }
        Ok(())
    }

    async fn failures_since(&self, key: &str, since: DateTime<Utc>) -> AppResult<Vec<DateTime<Utc>>> {
        Ok(self
            .attempts
            .get(key)
            .map(|history| {
                history
                    .iter()
                    .filter(|a| !a.success && a.attempted_at > since)
                    .map(|a| a.attempted_at)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn clear(&self, key: &str) -> AppResult<()> {
        self.attempts.remove(key);
        Ok(())
    }
}
