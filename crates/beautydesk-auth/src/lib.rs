//! # beautydesk-auth
//!
//! Authentication and session security for BeautyDesk.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and password policy
//! - `email`: email syntax validation
//! - `jwt`: access/refresh token issuance, verification, and refresh rotation
//! - `rate_limit`: sliding-window login lockout per identifier
//! - `csrf`: single current anti-forgery token
//! - `session`: login, logout, session verification, refresh, registration

pub mod csrf;
pub mod email;
pub mod error;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod session;

pub use csrf::CsrfTokenManager;
pub use email::validate_email;
pub use error::AuthError;
pub use jwt::{AccessClaims, JwtDecoder, JwtEncoder, RefreshClaims, TokenPair};
pub use password::{PasswordCheck, PasswordHasher, PasswordValidator, validate_password};
pub use rate_limit::{AttemptStore, MemoryAttemptStore, RateLimiter};
pub use session::{
    AuthResult, AuthSessionService, RegistrationContext, RegistrationRequest, SessionEvent,
    SessionState, SessionVerification,
};
