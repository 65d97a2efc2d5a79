//! Per-identifier sliding-window lockout.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use beautydesk_core::config::RateLimitConfig;
use beautydesk_core::result::AppResult;
use beautydesk_core::traits::Clock;
use beautydesk_entity::attempt::LoginAttempt;

use super::store::AttemptStore;

/// Throttles login attempts per identifier.
///
/// An identifier is blocked while at least `max_login_attempts` failures
/// fall inside the trailing lockout window. The lockout ends when the
/// oldest of the most recent `max_login_attempts` failures leaves the
/// window, so one more failure during a lockout does not restart it.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn AttemptStore>,
    clock: Arc<dyn Clock>,
    max_attempts: usize,
    window: Duration,
    retention: Duration,
}

impl RateLimiter {
    /// Creates a limiter over the given attempt store.
    pub fn new(
        config: &RateLimitConfig,
        store: Arc<dyn AttemptStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        Ok(Self {
            store,
            clock,
            max_attempts: config.max_login_attempts.max(1) as usize,
            window: config.lockout_window()?,
            retention: config.retention()?,
        })
    }

    /// Whether `identifier` is currently locked out.
    pub async fn is_blocked(&self, identifier: &str) -> AppResult<bool> {
        let failures = self.recent_failures(identifier).await?;
        Ok(failures.len() >= self.max_attempts)
    }

    /// Records one attempt and forgets history older than the retention period.
    pub async fn record_attempt(
        &self,
        identifier: &str,
        success: bool,
        origin: Option<String>,
    ) -> AppResult<()> {
        let now = self.clock.now();
        let attempt = if success {
            LoginAttempt::succeeded(identifier, now, origin)
        } else {
            LoginAttempt::failed(identifier, now, origin)
        };

        self.store
            .append(&normalize(identifier), attempt, before(now, self.retention))
            .await?;

        debug!(identifier = %identifier, success, "Recorded login attempt");
        Ok(())
    }

    /// Time left until `identifier` is unblocked. Zero when not blocked.
    pub async fn remaining_lockout(&self, identifier: &str) -> AppResult<Duration> {
        let failures = self.recent_failures(identifier).await?;
        if failures.len() < self.max_attempts {
            return Ok(Duration::zero());
        }

        let anchor = failures[failures.len() - self.max_attempts];
        let unblocks_at = anchor
            .checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let remaining = unblocks_at.signed_duration_since(self.clock.now());
        Ok(remaining.max(Duration::zero()))
    }

    /// [`remaining_lockout`](Self::remaining_lockout) in milliseconds.
    pub async fn remaining_lockout_ms(&self, identifier: &str) -> AppResult<i64> {
        Ok(self.remaining_lockout(identifier).await?.num_milliseconds())
    }

    /// Clears all history for `identifier`.
    pub async fn reset(&self, identifier: &str) -> AppResult<()> {
        self.store.clear(&normalize(identifier)).await?;
        info!(identifier = %identifier, "Rate limit history cleared");
        Ok(())
    }

    /// Failures inside the window, oldest first.
    async fn recent_failures(
        &self,
        identifier: &str,
    ) -> AppResult<Vec<DateTime<Utc>>> {
        let since = before(self.clock.now(), self.window);
        let mut failures = self
            .store
            .failures_since(&normalize(identifier), since)
            .await?;
        failures.sort();
        Ok(failures)
    }
}

fn normalize(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

fn before(now: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
