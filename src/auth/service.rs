//! Auth Service
//!
//! Combines signature/expiry verification with the revocation blocklist.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::auth::{AuthError, RevocationStore, TokenClaims, TokenError, TokenManager, TokenType};

/// A signed token and the instant it stops verifying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    fn new(token: String, claims: &TokenClaims) -> Self {
        Self {
            token,
            expires_at: claims.expires_at(),
        }
    }
}

/// Access and refresh token issued together at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    tokens: TokenManager,
    revocations: RevocationStore,
}

impl AuthService {
    pub fn new(tokens: TokenManager, revocations: RevocationStore) -> Self {
        Self {
            tokens,
            revocations,
        }
    }

    /// Accepts `token` only if it verifies as `expected` and is not revoked.
    ///
    /// The blocklist is consulted only for tokens that already verified, so
    /// garbage never reaches the revocation store.
    pub fn authorize(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AuthError> {
        let claims = self.tokens.verify_token_of_type(token, expected)?;

        if self.revocations.is_blocked(token) {
            debug!(user_id = claims.user_id, "Rejected revoked token");
            return Err(AuthError::Revoked);
        }

        Ok(claims)
    }

    /// Issues a fresh access/refresh pair for `user_id`.
    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, TokenError> {
        let (access, access_claims) = self.tokens.create_token(TokenType::Access, user_id)?;
        let (refresh, refresh_claims) = self.tokens.create_token(TokenType::Refresh, user_id)?;

        Ok(TokenPair {
            access: IssuedToken::new(access, &access_claims),
            refresh: IssuedToken::new(refresh, &refresh_claims),
        })
    }

    /// Issues a new access token for the owner of a valid refresh token.
    pub fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        let claims = self.authorize(refresh_token, TokenType::Refresh)?;
        let (token, access_claims) = self.tokens.create_token(TokenType::Access, claims.user_id)?;
        Ok(IssuedToken::new(token, &access_claims))
    }

    /// Revokes a refresh token until it expires.
    pub fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.authorize(refresh_token, TokenType::Refresh)?;
        self.revocations.block(refresh_token, &claims);
        info!(user_id = claims.user_id, "User logged out");
        Ok(())
    }

    pub fn revocations(&self) -> &RevocationStore {
        &self.revocations
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn token_from_header(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::InvalidFormat),
    }
}
