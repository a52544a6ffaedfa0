//! Token Manager
//!
//! Issues and verifies HS256-signed access and refresh tokens. Expiry is
//! checked against the injected clock, the same one the caches use.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::config::JwtConfig;
use crate::error::ConfigError;

// == Token Type ==
/// Purpose of a token. Each type has its own lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

// == Token Claims ==
/// Signed payload of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: i64,
    pub token_type: TokenType,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expires-at, seconds since the epoch
    pub exp: i64,
    /// Random token id; keeps tokens issued in the same second distinct
    pub jti: String,
}

impl TokenClaims {
    /// Instant from which the token is no longer valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Same boundary as cache entries: expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

// == Token Error ==
/// Reasons a token is rejected or cannot be issued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong algorithm or MAC mismatch
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Not a token, or claims that cannot be decoded
    #[error("token is malformed")]
    Malformed,

    /// Past its expiry
    #[error("token has expired")]
    Expired,

    /// Valid token of the other type
    #[error("{expected} token must be provided")]
    WrongTokenType { expected: TokenType },

    /// Signing failed
    #[error("failed to sign the token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

// == Token Manager ==
/// Pure function of a secret key and the clock.
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: SharedClock,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Creates a manager from the JWT configuration.
    ///
    /// Fails if the secret is empty.
    pub fn new(config: &JwtConfig, clock: SharedClock) -> Result<Self, ConfigError> {
        if config.secret_key.is_empty() {
            return Err(ConfigError::Missing("API_JWT_SECRET_KEY"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock in `verify_token`
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            validation,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            clock,
        })
    }

    /// Lifetime of tokens of `token_type`.
    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }

    /// Issues a signed token for `user_id`.
    pub fn create_token(
        &self,
        token_type: TokenType,
        user_id: i64,
    ) -> Result<(String, TokenClaims), TokenError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl(token_type))
            .ok_or_else(|| TokenError::Signing("token expiry is out of range".to_string()))?;

        let claims = TokenClaims {
            user_id,
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))?;

        Ok((token, claims))
    }

    /// Checks the signature and expiry of `token` and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Like [`verify_token`](Self::verify_token), additionally requiring
    /// `expected` as the token type.
    pub fn verify_token_of_type(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<TokenClaims, TokenError> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongTokenType { expected });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn jwt_config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret_key: secret.to_string(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
        }
    }

    fn setup() -> (Arc<ManualClock>, TokenManager) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let manager = TokenManager::new(&jwt_config("test-secret"), clock.clone()).unwrap();
        (clock, manager)
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        assert!(TokenManager::new(&jwt_config(""), clock).is_err());
    }

    #[test]
    fn test_round_trip_access_token() {
        let (_clock, manager) = setup();

        let (token, claims) = manager.create_token(TokenType::Access, 42).unwrap();
        let verified = manager.verify_token(&token).unwrap();

        assert_eq!(verified, claims);
        assert_eq!(verified.user_id, 42);
        assert_eq!(verified.token_type, TokenType::Access);
    }

    #[test]
    fn test_lifetimes_depend_on_type() {
        let (_clock, manager) = setup();

        let (_, access) = manager.create_token(TokenType::Access, 1).unwrap();
        let (_, refresh) = manager.create_token(TokenType::Refresh, 1).unwrap();

        assert_eq!(access.exp - access.iat, 15 * 60);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let (clock, manager) = setup();
        let (token, _) = manager.create_token(TokenType::Access, 1).unwrap();

        clock.advance(Duration::minutes(15) - Duration::seconds(1));
        assert!(manager.verify_token(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(manager.verify_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let (clock, manager) = setup();
        let other = TokenManager::new(&jwt_config("other-secret"), clock).unwrap();

        let (token, _) = other.create_token(TokenType::Access, 1).unwrap();
        assert_eq!(manager.verify_token(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_other_algorithm_is_invalid_signature() {
        let (_clock, manager) = setup();
        let claims = TokenClaims {
            user_id: 1,
            token_type: TokenType::Access,
            iat: 1_704_067_200,
            exp: 1_704_067_200 + 900,
            jti: "fixed".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(manager.verify_token(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let (_clock, manager) = setup();
        assert_eq!(manager.verify_token("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(manager.verify_token(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_wrong_token_type_is_rejected() {
        let (_clock, manager) = setup();
        let (access, _) = manager.create_token(TokenType::Access, 7).unwrap();
        let (refresh, _) = manager.create_token(TokenType::Refresh, 7).unwrap();

        assert_eq!(
            manager.verify_token_of_type(&access, TokenType::Refresh),
            Err(TokenError::WrongTokenType {
                expected: TokenType::Refresh
            })
        );
        assert_eq!(
            manager.verify_token_of_type(&refresh, TokenType::Access),
            Err(TokenError::WrongTokenType {
                expected: TokenType::Access
            })
        );
        assert!(manager.verify_token_of_type(&refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_same_second_tokens_are_distinct() {
        let (_clock, manager) = setup();

        let (first, first_claims) = manager.create_token(TokenType::Refresh, 3).unwrap();
        let (second, second_claims) = manager.create_token(TokenType::Refresh, 3).unwrap();

        assert_eq!(first_claims.iat, second_claims.iat);
        assert_ne!(first_claims.jti, second_claims.jti);
        assert_ne!(first, second);
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let config = JwtConfig {
            secret_key: "test-secret".to_string(),
            access_token_ttl: Duration::days(365 * 1_000_000),
            refresh_token_ttl: Duration::days(7),
        };
        let manager = TokenManager::new(&config, clock).unwrap();

        assert!(matches!(
            manager.create_token(TokenType::Access, 1),
            Err(TokenError::Signing(_))
        ));
        assert!(manager.create_token(TokenType::Refresh, 1).is_ok());
    }

    #[test]
    fn test_debug_hides_keys() {
        let (_clock, manager) = setup();
        let rendered = format!("{:?}", manager);
        assert!(!rendered.contains("test-secret"));
    }
}
