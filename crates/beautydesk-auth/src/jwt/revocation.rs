//! Consumed refresh token tracking.
//!
//! A refresh token may mint exactly one new pair. Its `jti` is remembered
//! until the token would have expired anyway.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use beautydesk_core::traits::Clock;

/// Process-wide set of refresh token IDs that may no longer be used.
#[derive(Debug, Clone)]
pub struct RefreshRevocations {
    /// jti → expiration (seconds since epoch).
    revoked: Arc<DashMap<Uuid, i64>>,
    clock: Arc<dyn Clock>,
}

impl RefreshRevocations {
    /// Creates an empty revocation set.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            revoked: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Marks `jti` as used. Returns `false` if it had already been used.
    ///
    /// The check and the insert are one atomic step per `jti`, so two
    /// concurrent refreshes with the same token cannot both succeed.
    pub fn consume(&self, jti: Uuid, exp: i64) -> bool {
        self.prune();
        match self.revoked.entry(jti) {
            Entry::Occupied(_) => {
                debug!(%jti, "Refresh token reuse detected");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(exp);
                true
            }
        }
    }

    /// Whether `jti` has been used or revoked.
    pub fn is_revoked(&self, jti: &Uuid) -> bool {
        self.revoked.contains_key(jti)
    }

    /// Number of tracked IDs.
    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }

    fn prune(&self) {
        let now = self.clock.now().timestamp();
        self.revoked.retain(|_, exp| *exp > now);
    }
}
