//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use beautydesk_auth::{AuthSessionService, RegistrationContext, RegistrationRequest};
use beautydesk_core::config::AppConfig;
use beautydesk_core::result::AppResult;
use beautydesk_core::traits::{Clock, ManualClock};
use beautydesk_database::{CredentialStore, MemoryCredentialStore};
use beautydesk_entity::identity::{Identity, IdentityProfile, NewIdentity};

/// Password that satisfies the default policy.
pub const PASSWORD: &str = "Abcdef1!";

/// Test application context
pub struct TestApp {
    /// The service under test
    pub service: AuthSessionService,
    /// Credential store behind the service
    pub store: Arc<CountingStore>,
    /// Clock shared by every component
    pub clock: ManualClock,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with default policy and cheap hashing
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application after adjusting the config
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.password.memory_kib = 1024;
        config.password.iterations = 1;
        adjust(&mut config);

        let store = Arc::new(CountingStore::default());
        let clock = ManualClock::starting_now();
        let service = AuthSessionService::new(&config, store.clone(), Arc::new(clock.clone()))
            .expect("Failed to build auth service");

        Self {
            service,
            store,
            clock,
            config,
        }
    }

    /// Identifier lookups the service has made so far
    pub fn lookups(&self) -> usize {
        self.store.lookups.load(Ordering::SeqCst)
    }

    /// Current time on the shared clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Self-register an identity with [`PASSWORD`]
    pub async fn register(&self, email: &str, username: &str) -> IdentityProfile {
        self.service
            .register(request(email, username), RegistrationContext::SelfService)
            .await
            .expect("Failed to register test identity")
    }
}

/// A registration request with [`PASSWORD`] and placeholder names
pub fn request(email: &str, username: &str) -> RegistrationRequest {
    RegistrationRequest {
        email: email.to_string(),
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "Stylist".to_string(),
        password: PASSWORD.to_string(),
        role: None,
    }
}

/// In-memory credential store that counts identifier lookups
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryCredentialStore,
    lookups: AtomicUsize,
}

#[async_trait]
impl CredentialStore for CountingStore {
    async fn find_by_email_or_username(&self, identifier: &str) -> AppResult<Option<Identity>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_email_or_username(identifier).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, data: &NewIdentity) -> AppResult<Identity> {
        self.inner.insert(data).await
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.inner.update_last_login(id, at).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<()> {
        self.inner.set_active(id, active).await
    }

    async fn count(&self) -> AppResult<u64> {
        self.inner.count().await
    }
}
