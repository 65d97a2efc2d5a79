//! Login, logout, session verification, refresh, and registration.

pub mod service;
pub mod state;

pub use service::{
    AuthResult, AuthSessionService, RegistrationContext, RegistrationRequest, SessionVerification,
};
pub use state::{SessionEvent, SessionState};
