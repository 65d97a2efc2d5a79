//! Sliding-window login throttling per identifier.

pub mod limiter;
pub mod store;

pub use limiter::RateLimiter;
pub use store::{AttemptStore, MemoryAttemptStore};
