//! Session orchestration: the one entry point the application talks to.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use beautydesk_core::config::AppConfig;
use beautydesk_core::error::AppError;
use beautydesk_core::result::AppResult;
use beautydesk_core::traits::Clock;
use beautydesk_database::CredentialStore;
use beautydesk_entity::identity::{IdentityProfile, NewIdentity, Role};

use crate::csrf::CsrfTokenManager;
use crate::email::validate_email;
use crate::error::AuthError;
use crate::jwt::{JwtDecoder, JwtEncoder, RefreshRevocations, TokenPair};
use crate::password::{PasswordHasher, PasswordValidator};
use crate::rate_limit::{AttemptStore, MemoryAttemptStore, RateLimiter};

use super::state::{SessionEvent, SessionState};

/// Hashed once at startup and verified against when the identifier is
/// unknown, so that path costs as much as a wrong password.
const DUMMY_PASSWORD: &str = "beautydesk-unknown-identity";

/// Returned by a successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    /// The signed-in identity, without its password hash.
    pub identity: IdentityProfile,
    /// Signed access token.
    pub access_token: String,
    /// Signed refresh token.
    pub refresh_token: String,
    /// Current anti-forgery token.
    pub csrf_token: String,
    /// When the access token expires. Shown to the user as session expiry.
    pub expires_at: DateTime<Utc>,
    /// When the refresh token expires.
    pub refresh_expires_at: DateTime<Utc>,
    /// Whether the access token has the remember-me lifetime.
    pub remember_me: bool,
}

impl AuthResult {
    fn new(identity: IdentityProfile, tokens: TokenPair, csrf_token: String) -> Self {
        Self {
            identity,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            csrf_token,
            expires_at: tokens.access_expires_at,
            refresh_expires_at: tokens.refresh_expires_at,
            remember_me: tokens.remember_me,
        }
    }
}

/// Outcome of checking a presented access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionVerification {
    /// Whether the session may be used.
    pub is_valid: bool,
    /// The re-resolved identity when valid.
    pub identity: Option<IdentityProfile>,
}

impl SessionVerification {
    fn valid(identity: IdentityProfile) -> Self {
        Self {
            is_valid: true,
            identity: Some(identity),
        }
    }

    fn invalid() -> Self {
        Self {
            is_valid: false,
            identity: None,
        }
    }
}

/// Data submitted to create a new identity.
#[derive(Clone, Deserialize)]
pub struct RegistrationRequest {
    /// Email address.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Requested role. Defaults to the highest role the context allows
    /// for self-service, or the configured default for invitations.
    #[serde(default)]
    pub role: Option<Role>,
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Who is creating the identity, which bounds the role it may receive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationContext {
    /// The person registers themselves.
    ///
    /// The first identity of an empty store may become an admin when
    /// bootstrap is enabled; everyone after gets the configured default role.
    #[default]
    SelfService,
    /// A signed-in manager or admin creates an identity for someone else.
    Invited {
        /// Role of the inviting identity. Caps the assignable role.
        inviter_role: Role,
    },
}

#[derive(Debug, Default)]
struct LocalSession {
    state: SessionState,
    identity: Option<IdentityProfile>,
}

/// Orchestrates credential checks, throttling, tokens, and CSRF.
///
/// The service does not know which [`CredentialStore`] backs it.
#[derive(Clone)]
pub struct AuthSessionService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    revocations: RefreshRevocations,
    rate_limiter: RateLimiter,
    csrf: CsrfTokenManager,
    default_role: Role,
    bootstrap_admin: bool,
    clock: Arc<dyn Clock>,
    session: Arc<RwLock<LocalSession>>,
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for AuthSessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionService")
            .field("store", &self.store)
            .field("encoder", &self.encoder)
            .field("rate_limiter", &self.rate_limiter)
            .field("default_role", &self.default_role)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish_non_exhaustive()
    }
}

impl AuthSessionService {
    /// Creates a service with in-process attempt history.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        Self::with_attempt_store(config, store, Arc::new(MemoryAttemptStore::new()), clock)
    }

    /// Creates a service with a caller-supplied attempt store, e.g. a shared
    /// backend for multi-instance deployments.
    pub fn with_attempt_store(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        attempts: Arc<dyn AttemptStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        config.validate()?;

        let default_role: Role = config.registration.default_role.parse().map_err(|e| {
            AppError::configuration(format!("Invalid registration.default_role: {e}"))
        })?;

        let hasher = PasswordHasher::new(&config.password)?;
        let dummy_hash: Arc<str> = hasher.hash_password(DUMMY_PASSWORD)?.into();

        Ok(Self {
            store,
            validator: PasswordValidator::new(&config.password),
            encoder: JwtEncoder::new(&config.auth, Arc::clone(&clock))?,
            decoder: JwtDecoder::new(&config.auth, Arc::clone(&clock)),
            revocations: RefreshRevocations::new(Arc::clone(&clock)),
            rate_limiter: RateLimiter::new(
                &config.rate_limit,
                attempts,
                Arc::clone(&clock),
            )?,
            csrf: CsrfTokenManager::new(),
            default_role,
            bootstrap_admin: config.registration.bootstrap_admin,
            clock,
            session: Arc::new(RwLock::new(LocalSession::default())),
            hasher,
            dummy_hash,
        })
    }

    /// Signs in with an email or username.
    ///
    /// Checks run in a fixed order: input, rate limit, lookup, active flag,
    /// password. A blocked identifier never reaches the credential store.
    /// Unknown identifiers and wrong passwords fail identically.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
        origin: Option<&str>,
    ) -> Result<AuthResult, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::validation(
                "Email/username and password are required",
            ));
        }

        self.apply(SessionEvent::LoginStarted).await;

        match self
            .authenticate(identifier, password, remember_me, origin)
            .await
        {
            Ok(result) => {
                self.enter(
                    SessionEvent::LoginSucceeded {
                        identity_id: result.identity.id,
                        expires_at: result.expires_at,
                    },
                    result.identity.clone(),
                )
                .await;
                Ok(result)
            }
            Err(err) => {
                self.apply(SessionEvent::LoginFailed).await;
                Err(err)
            }
        }
    }

    async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
        origin: Option<&str>,
    ) -> Result<AuthResult, AuthError> {
        let blocked = self
            .rate_limiter
            .is_blocked(identifier)
            .await
            .map_err(internal("Rate limit check failed"))?;
        if blocked {
            let remaining_ms = self
                .rate_limiter
                .remaining_lockout_ms(identifier)
                .await
                .map_err(internal("Rate limit check failed"))?;
            warn!(identifier = %identifier, remaining_ms, "Login blocked: too many failed attempts");
            return Err(AuthError::rate_limited(remaining_ms));
        }

        let found = self
            .store
            .find_by_email_or_username(identifier)
            .await
            .map_err(internal("Identity lookup failed"))?;

        let Some(mut identity) = found else {
            self.verify_password(password, &self.dummy_hash).await?;
            self.record_failure(identifier, origin).await?;
            warn!(identifier = %identifier, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if !identity.is_active {
            self.record_failure(identifier, origin).await?;
            warn!(identity_id = %identity.id, "Login failed: account disabled");
            return Err(AuthError::AccountDisabled);
        }

        if !self
            .verify_password(password, &identity.password_hash)
            .await?
        {
            self.record_failure(identifier, origin).await?;
            warn!(identifier = %identifier, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        self.rate_limiter
            .record_attempt(identifier, true, origin.map(str::to_owned))
            .await
            .map_err(internal("Failed to record login attempt"))?;
        self.rate_limiter
            .reset(identifier)
            .await
            .map_err(internal("Failed to reset rate limit"))?;

        let tokens = self
            .encoder
            .issue(&identity, remember_me)
            .map_err(internal("Token issuance failed"))?;

        match self
            .store
            .update_last_login(identity.id, tokens.issued_at)
            .await
        {
            Ok(()) => identity.last_login_at = Some(tokens.issued_at),
            Err(e) => warn!(identity_id = %identity.id, error = %e, "Failed to stamp last login"),
        }

        let csrf_token = self.csrf.current().await;

        info!(
            identity_id = %identity.id,
            role = %identity.role,
            remember_me,
            "Login succeeded"
        );

        Ok(AuthResult::new(identity.profile(), tokens, csrf_token))
    }

    /// Ends the local session and returns the new CSRF token.
    ///
    /// Revokes `refresh_token` when given and still valid. Never fails.
    pub async fn logout(&self, refresh_token: Option<&str>) -> String {
        if let Some(token) = refresh_token {
            match self.decoder.decode_refresh_token(token) {
                Ok(claims) => {
                    self.revocations.consume(claims.jti, claims.exp);
                    debug!(identity_id = %claims.sub, "Refresh token revoked on logout");
                }
                Err(_) => debug!("Logout with an unusable refresh token, nothing to revoke"),
            }
        }

        let csrf_token = self.csrf.rotate().await;

        let mut session = self.session.write().await;
        session.identity = None;
        session.state = session
            .state
            .transition(SessionEvent::LoggedOut)
            .unwrap_or(SessionState::LoggedOut);

        info!("Logged out");
        csrf_token
    }

    /// Checks an access token and re-resolves its identity.
    ///
    /// Fails closed: a structurally valid token for a missing or deactivated
    /// identity is invalid, and so is any lookup error.
    pub async fn verify_session(&self, access_token: &str) -> SessionVerification {
        let claims = match self.decoder.decode_access_token(access_token) {
            Ok(claims) => claims,
            Err(_) => {
                self.expire_if_due().await;
                return SessionVerification::invalid();
            }
        };

        match self.store.find_by_email_or_username(&claims.email).await {
            Ok(Some(identity)) if identity.id == claims.sub && identity.is_active => {
                SessionVerification::valid(identity.profile())
            }
            Ok(_) => {
                debug!(identity_id = %claims.sub, "Session rejected: identity missing or inactive");
                SessionVerification::invalid()
            }
            Err(e) => {
                error!(identity_id = %claims.sub, error = %e, "Session lookup failed");
                SessionVerification::invalid()
            }
        }
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The presented token is consumed; presenting it again fails. The new
    /// access token always has the short session lifetime.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResult, AuthError> {
        let claims = self
            .decoder
            .decode_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidToken)?;

        let identity = self
            .store
            .find_by_id(claims.sub)
            .await
            .map_err(internal("Identity lookup failed"))?
            .ok_or(AuthError::InvalidToken)?;

        if !identity.is_active {
            warn!(identity_id = %identity.id, "Refresh rejected: account disabled");
            return Err(AuthError::AccountDisabled);
        }

        if !self.revocations.consume(claims.jti, claims.exp) {
            warn!(identity_id = %identity.id, "Refresh rejected: token already used");
            return Err(AuthError::InvalidToken);
        }

        let tokens = self
            .encoder
            .issue(&identity, false)
            .map_err(internal("Token issuance failed"))?;
        let csrf_token = self.csrf.current().await;
        let result = AuthResult::new(identity.profile(), tokens, csrf_token);

        self.enter(
            SessionEvent::Refreshed {
                identity_id: identity.id,
                expires_at: result.expires_at,
            },
            result.identity.clone(),
        )
        .await;

        info!(identity_id = %identity.id, "Session refreshed");
        Ok(result)
    }

    /// Creates a new identity.
    ///
    /// Reports every input problem at once. The assigned role is bounded by
    /// `context`.
    pub async fn register(
        &self,
        request: RegistrationRequest,
        context: RegistrationContext,
    ) -> Result<IdentityProfile, AuthError> {
        let email = request.email.trim().to_lowercase();
        let username = request.username.trim().to_string();
        let first_name = request.first_name.trim().to_string();
        let last_name = request.last_name.trim().to_string();

        let mut errors = Vec::new();
        if !validate_email(&email) {
            errors.push("Please enter a valid email address".to_string());
        }
        if let Some(problem) = username_problem(&username) {
            errors.push(problem);
        }
        if first_name.is_empty() {
            errors.push("First name is required".to_string());
        }
        if last_name.is_empty() {
            errors.push("Last name is required".to_string());
        }
        errors.extend(self.validator.validate(&request.password).errors);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let role = self.assign_role(request.role, context).await?;

        for candidate in [&email, &username] {
            let existing = self
                .store
                .find_by_email_or_username(candidate)
                .await
                .map_err(internal("Identity lookup failed"))?;
            if existing.is_some() {
                return Err(AuthError::DuplicateIdentity);
            }
        }

        let password_hash = self.hash_password(request.password).await?;

        let identity = self
            .store
            .insert(&NewIdentity {
                email,
                username,
                first_name,
                last_name,
                password_hash,
                role,
            })
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AuthError::DuplicateIdentity
                } else {
                    error!(error = %e, "Failed to create identity");
                    AuthError::Internal
                }
            })?;

        info!(identity_id = %identity.id, role = %identity.role, "Identity registered");
        Ok(identity.profile())
    }

    async fn assign_role(
        &self,
        requested: Option<Role>,
        context: RegistrationContext,
    ) -> Result<Role, AuthError> {
        let (ceiling, fallback) = match context {
            RegistrationContext::SelfService => {
                let empty = self.bootstrap_admin
                    && self
                        .store
                        .count()
                        .await
                        .map_err(internal("Identity count failed"))?
                        == 0;
                let ceiling = if empty { Role::Admin } else { self.default_role };
                (ceiling, ceiling)
            }
            RegistrationContext::Invited { inviter_role } => {
                if !inviter_role.has_at_least(&Role::Manager) {
                    return Err(AuthError::validation(
                        "Only managers and admins can create accounts for others",
                    ));
                }
                (inviter_role, self.default_role.min(inviter_role))
            }
        };

        let role = requested.unwrap_or(fallback);
        if role > ceiling {
            return Err(AuthError::validation(format!(
                "The {role} role cannot be assigned here"
            )));
        }
        Ok(role)
    }

    /// Activates or deactivates the identity matching `identifier`.
    ///
    /// Deactivation takes effect on the next `verify_session` or `refresh`,
    /// without waiting for outstanding tokens to expire.
    pub async fn set_active(
        &self,
        identifier: &str,
        active: bool,
    ) -> Result<IdentityProfile, AuthError> {
        let mut identity = self
            .store
            .find_by_email_or_username(identifier.trim())
            .await
            .map_err(internal("Identity lookup failed"))?
            .ok_or_else(|| AuthError::validation("No account matches that email or username"))?;

        self.store
            .set_active(identity.id, active)
            .await
            .map_err(internal("Failed to update account status"))?;
        identity.is_active = active;

        info!(identity_id = %identity.id, active, "Account status changed");
        Ok(identity.profile())
    }

    /// Current CSRF token, generated on first use.
    pub async fn csrf_token(&self) -> String {
        self.csrf.current().await
    }

    /// Replaces the CSRF token and returns the new one.
    pub async fn rotate_csrf_token(&self) -> String {
        self.csrf.rotate().await
    }

    /// Whether `submitted` is the current CSRF token.
    pub async fn validate_csrf_token(&self, submitted: &str) -> bool {
        self.csrf.validate(submitted).await
    }

    /// Local session state.
    pub async fn state(&self) -> SessionState {
        self.session.read().await.state
    }

    /// Identity of the local session, while signed in.
    pub async fn current_identity(&self) -> Option<IdentityProfile> {
        let session = self.session.read().await;
        if session.state.is_authenticated_at(self.clock.now()) {
            session.identity.clone()
        } else {
            None
        }
    }

    async fn apply(&self, event: SessionEvent) {
        let mut session = self.session.write().await;
        match session.state.transition(event) {
            Some(next) => session.state = next,
            None => debug!(state = ?session.state, event = ?event, "Ignored session event"),
        }
    }

    async fn enter(&self, event: SessionEvent, identity: IdentityProfile) {
        let mut session = self.session.write().await;
        match session.state.transition(event) {
            Some(next) => {
                session.state = next;
                session.identity = Some(identity);
            }
            None => debug!(state = ?session.state, event = ?event, "Ignored session event"),
        }
    }

    async fn expire_if_due(&self) {
        let now = self.clock.now();
        let mut session = self.session.write().await;
        if let SessionState::Authenticated { expires_at, .. } = session.state
            && now >= expires_at
        {
            session.state = SessionState::Expired;
            session.identity = None;
            debug!("Local session expired");
        }
    }

    async fn record_failure(&self, identifier: &str, origin: Option<&str>) -> Result<(), AuthError> {
        self.rate_limiter
            .record_attempt(identifier, false, origin.map(str::to_owned))
            .await
            .map_err(internal("Failed to record login attempt"))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| {
                error!(error = %e, "Password verification task failed");
                AuthError::Internal
            })
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| {
                error!(error = %e, "Password hashing task failed");
                AuthError::Internal
            })?
            .map_err(internal("Password hashing failed"))
    }
}

/// Logs an [`AppError`] with `context` and collapses it to [`AuthError::Internal`].
fn internal(context: &'static str) -> impl FnOnce(AppError) -> AuthError {
    move |e| {
        error!(error = %e, "{context}");
        AuthError::Internal
    }
}

fn username_problem(username: &str) -> Option<String> {
    let length = username.chars().count();
    if !(2..=50).contains(&length) {
        return Some("Username must be between 2 and 50 characters".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Some(
            "Username may only contain letters, numbers, dots, underscores, and hyphens"
                .to_string(),
        );
    }
    None
}
