//! Login attempt events.

pub mod model;

pub use model::LoginAttempt;
