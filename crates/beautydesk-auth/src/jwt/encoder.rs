//! JWT token creation with separate signing keys per token type.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use beautydesk_core::config::AuthConfig;
use beautydesk_core::error::AppError;
use beautydesk_core::traits::Clock;
use beautydesk_entity::identity::Identity;

use super::claims::{AccessClaims, RefreshClaims, TokenType};

/// Creates signed access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    issuer: String,
    audience: String,
    session_ttl: Duration,
    remember_me_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("session_ttl", &self.session_ttl)
            .field("remember_me_ttl", &self.remember_me_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// A freshly issued access + refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token.
    pub access_token: String,
    /// Signed refresh token.
    pub refresh_token: String,
    /// When the pair was issued.
    pub issued_at: DateTime<Utc>,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration. Never earlier than `access_expires_at`.
    pub refresh_expires_at: DateTime<Utc>,
    /// Whether the access token got the remember-me lifetime.
    pub remember_me: bool,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        Ok(Self {
            access_key: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            session_ttl: config.session_ttl()?,
            remember_me_ttl: config.remember_me_ttl()?,
            refresh_ttl: config.refresh_ttl()?,
            clock,
        })
    }

    /// Issues a token pair for `identity`.
    ///
    /// The access token lives for the session timeout, or for the remember-me
    /// duration when `remember_me` is set. The refresh token lives for the
    /// refresh duration, extended if needed so it never expires before the
    /// access token.
    pub fn issue(&self, identity: &Identity, remember_me: bool) -> Result<TokenPair, AppError> {
        let now = self.clock.now();
        let access_ttl = if remember_me {
            self.remember_me_ttl
        } else {
            self.session_ttl
        };
        let access_exp = expiry(now, access_ttl)?;
        let refresh_exp = expiry(now, self.refresh_ttl)?.max(access_exp);

        let access_claims = AccessClaims {
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
        };

        let refresh_claims = RefreshClaims {
            sub: identity.id,
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Refresh,
        };

        let access_token = encode(&Header::default(), &access_claims, &self.access_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            issued_at: now,
            access_expires_at: access_exp,
            refresh_expires_at: refresh_exp,
            remember_me,
        })
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AppError> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AppError::internal("Token expiry is out of range"))
}
