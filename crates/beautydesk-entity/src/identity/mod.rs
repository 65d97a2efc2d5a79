//! Identity domain entities.

pub mod model;
pub mod role;

pub use model::{Identity, IdentityProfile, NewIdentity};
pub use role::Role;
