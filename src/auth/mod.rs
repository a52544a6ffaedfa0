//! Auth Module
//!
//! JWT issuing and verification, the revocation blocklist and password
//! hashing.

mod password;
mod revocation;
mod service;
mod token;

use thiserror::Error;

pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
pub use revocation::{RevocationStore, BLOCKLIST_CACHE_NAME};
pub use service::{token_from_header, AuthService, IssuedToken, TokenPair};
pub use token::{TokenClaims, TokenError, TokenManager, TokenType};

/// Why a request was not authenticated. Always a 401.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingHeader,

    #[error("authorization header must be 'Bearer <token>'")]
    InvalidFormat,

    #[error(transparent)]
    Token(#[from] TokenError),

    /// Verified, but logged out
    #[error("token has been revoked")]
    Revoked,
}
