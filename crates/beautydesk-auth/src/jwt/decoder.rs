//! JWT token validation.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use beautydesk_core::config::AuthConfig;
use beautydesk_core::traits::Clock;

use super::claims::{AccessClaims, RefreshClaims, TokenType};

/// The single failure a token check can report.
///
/// Expired, malformed, tampered, and wrong-type tokens all collapse into
/// this so callers cannot probe which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Validates access and refresh tokens against their own keys.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    access_validation: Validation,
    refresh_validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("access_validation", &self.access_validation)
            .field("refresh_validation", &self.refresh_validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        // Expiry is checked against the injected clock below, not by jsonwebtoken.
        let mut access_validation = Validation::new(Algorithm::HS256);
        access_validation.validate_exp = false;
        access_validation.leeway = 0;
        access_validation.set_issuer(&[config.issuer.as_str()]);
        access_validation.set_audience(&[config.audience.as_str()]);
        access_validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let mut refresh_validation = Validation::new(Algorithm::HS256);
        refresh_validation.validate_exp = false;
        refresh_validation.validate_aud = false;
        refresh_validation.leeway = 0;
        refresh_validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access_key: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_validation,
            refresh_validation,
            clock,
        }
    }

    /// Decodes and validates an access token.
    ///
    /// Checks signature, issuer, audience, token type, and expiry. A token is
    /// expired from its `exp` second onwards.
    pub fn decode_access_token(&self, token: &str) -> Result<AccessClaims, InvalidToken> {
        let claims: AccessClaims = decode_with(token, &self.access_key, &self.access_validation)?;

        if claims.token_type != TokenType::Access {
            debug!("Rejected token: expected access token");
            return Err(InvalidToken);
        }
        self.check_expiry(claims.exp)?;

        Ok(claims)
    }

    /// Decodes and validates a refresh token.
    pub fn decode_refresh_token(&self, token: &str) -> Result<RefreshClaims, InvalidToken> {
        let claims: RefreshClaims =
            decode_with(token, &self.refresh_key, &self.refresh_validation)?;

        if claims.token_type != TokenType::Refresh {
            debug!("Rejected token: expected refresh token");
            return Err(InvalidToken);
        }
        self.check_expiry(claims.exp)?;

        Ok(claims)
    }

    fn check_expiry(&self, exp: i64) -> Result<(), InvalidToken> {
        if self.clock.now().timestamp() >= exp {
            debug!(exp, "Rejected token: expired");
            return Err(InvalidToken);
        }
        Ok(())
    }
}

fn decode_with<T: DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<T, InvalidToken> {
    if token.is_empty() {
        return Err(InvalidToken);
    }
    decode::<T>(token, key, validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(reason = ?e.kind(), "Rejected token");
            InvalidToken
        })
}
