//! # beautydesk-core
//!
//! Core crate for the BeautyDesk authentication core. Contains configuration
//! schemas, the unified error system, and the clock abstraction used by every
//! time-dependent component.
//!
//! This crate has **no** internal dependencies on other BeautyDesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
pub use traits::{Clock, ManualClock, SystemClock};
