//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::Duration;

use crate::error::ConfigError;

/// Upper bound for any configured lifetime: ten years.
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 3600;

/// Runtime environment, selects the log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::Invalid {
                name: "ENVIRONMENT",
                reason: format!("unknown environment '{}'", other),
            }),
        }
    }
}

/// Token signing parameters.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret, never logged
    pub secret_key: String,
    /// Lifetime of access tokens
    pub access_token_ttl: Duration,
    /// Lifetime of refresh tokens
    pub refresh_token_ttl: Duration,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret_key", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

/// Capacity and refresh TTL of one cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub capacity: usize,
    /// TTL applied to entries loaded through the cache
    pub ttl: Duration,
}

/// Server configuration parameters.
///
/// All values except the JWT secret have sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Selects human-readable or JSON logs
    pub environment: Environment,
    /// HTTP bind host
    pub host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Token signing parameters
    pub jwt: JwtConfig,
    /// `user-by-email` read-through cache
    pub user_cache: CacheConfig,
    /// `article-by-slug` read-through cache
    pub article_cache: CacheConfig,
    /// Maximum number of revoked tokens held at once
    pub blocklist_capacity: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ENVIRONMENT` - `development` or `production` (default: development)
    /// - `API_HOST` - Bind host (default: 0.0.0.0)
    /// - `API_PORT` - HTTP server port (default: 8080)
    /// - `API_JWT_SECRET_KEY` - HMAC secret (required)
    /// - `API_JWT_ACCESS_TOKEN_TTL` - Access token lifetime in seconds (default: 900)
    /// - `API_JWT_REFRESH_TOKEN_TTL` - Refresh token lifetime in seconds (default: 604800)
    /// - `USER_CACHE_CAPACITY` / `USER_CACHE_TTL` - (default: 1000 / 900)
    /// - `ARTICLE_CACHE_CAPACITY` / `ARTICLE_CACHE_TTL` - (default: 1000 / 300)
    /// - `BLOCKLIST_CAPACITY` - Revoked token capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("ENVIRONMENT") {
            Some(value) => value.parse()?,
            None => Environment::Development,
        };

        let secret_key = lookup("API_JWT_SECRET_KEY")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("API_JWT_SECRET_KEY"))?;

        Ok(Self {
            environment,
            host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(&lookup, "API_PORT", 8080)?,
            jwt: JwtConfig {
                secret_key,
                access_token_ttl: seconds_or(&lookup, "API_JWT_ACCESS_TOKEN_TTL", 15 * 60)?,
                refresh_token_ttl: seconds_or(&lookup, "API_JWT_REFRESH_TOKEN_TTL", 7 * 24 * 3600)?,
            },
            user_cache: CacheConfig {
                capacity: parse_or(&lookup, "USER_CACHE_CAPACITY", 1000)?,
                ttl: seconds_or(&lookup, "USER_CACHE_TTL", 15 * 60)?,
            },
            article_cache: CacheConfig {
                capacity: parse_or(&lookup, "ARTICLE_CACHE_CAPACITY", 1000)?,
                ttl: seconds_or(&lookup, "ARTICLE_CACHE_TTL", 5 * 60)?,
            },
            blocklist_capacity: parse_or(&lookup, "BLOCKLIST_CAPACITY", 10_000)?,
            cleanup_interval: positive_or(&lookup, "CLEANUP_INTERVAL", 30)?,
        })
    }

    /// Returns the `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}

fn positive_or<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: u64 = parse_or(lookup, name, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn seconds_or<F>(lookup: &F, name: &'static str, default: i64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let seconds: i64 = parse_or(lookup, name, default)?;
    if seconds <= 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "duration must be a positive number of seconds".to_string(),
        });
    }
    if seconds > MAX_TTL_SECONDS {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("duration must not exceed {} seconds", MAX_TTL_SECONDS),
        });
    }
    Duration::try_seconds(seconds).ok_or(ConfigError::Invalid {
        name,
        reason: "duration is out of range".to_string(),
    })
}
