//! # beautydesk-database
//!
//! The [`CredentialStore`] capability consumed by the auth core, with an
//! in-memory implementation for tests and demos and a PostgreSQL
//! implementation for production.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryCredentialStore;
pub use repositories::identity::IdentityRepository;
pub use store::CredentialStore;
