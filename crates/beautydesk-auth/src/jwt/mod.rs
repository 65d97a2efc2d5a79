//! JWT token encoding, decoding, and refresh rotation.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod revocation;

pub use claims::{AccessClaims, RefreshClaims, TokenType};
pub use decoder::{InvalidToken, JwtDecoder};
pub use encoder::{JwtEncoder, TokenPair};
pub use revocation::RefreshRevocations;
