//! Anti-forgery token for state-changing requests.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::debug;

/// Random bytes per token.
const TOKEN_BYTES: usize = 32;

/// Holds the single current CSRF token.
///
/// Only the current value validates; a rotated-out token is rejected
/// immediately.
#[derive(Debug, Clone, Default)]
pub struct CsrfTokenManager {
    current: Arc<RwLock<Option<String>>>,
}

impl CsrfTokenManager {
    /// Creates a manager with no token yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token, generating one on first use.
    pub async fn current(&self) -> String {
        if let Some(token) = self.current.read().await.as_ref() {
            return token.clone();
        }

        let mut slot = self.current.write().await;
        slot.get_or_insert_with(generate_token).clone()
    }

    /// Replaces the current token with a fresh one and returns it.
    pub async fn rotate(&self) -> String {
        let token = generate_token();
        *self.current.write().await = Some(token.clone());
        debug!("CSRF token rotated");
        token
    }

    /// Whether `submitted` equals the current token.
    pub async fn validate(&self, submitted: &str) -> bool {
        match self.current.read().await.as_deref() {
            Some(current) => current.as_bytes().ct_eq(submitted.as_bytes()).into(),
            None => false,
        }
    }
}

fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}
