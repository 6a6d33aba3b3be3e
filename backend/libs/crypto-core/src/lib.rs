//! Shared security primitives for Yatube services.
//!
//! - `jwt`: RS256 access/refresh token issuing and validation

pub mod jwt;

pub use jwt::{Claims, JwtError, TokenPair, TokenType};
