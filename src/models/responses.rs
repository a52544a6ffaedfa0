//! Response DTOs for the blog API
//!
//! Every success body is wrapped as `{"data": ...}`.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::{IssuedToken, TokenPair};
use crate::cache::CacheStats;
use crate::models::Article;

/// `{"data": T}` envelope with a status code.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> Envelope<T> {
    /// 200 OK
    pub fn ok(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response body of `GET /healthz`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Response body of `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub email: String,
}

/// Response body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

impl From<TokenPair> for LoginResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access.token,
            access_token_expires_at: pair.access.expires_at,
            refresh_token: pair.refresh.token,
            refresh_token_expires_at: pair.refresh.expires_at,
        }
    }
}

/// Response body of `POST /auth/refresh`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for RefreshResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            access_token: issued.token,
            access_token_expires_at: issued.expires_at,
        }
    }
}

/// Response body of `GET /articles`
#[derive(Debug, Clone, Serialize)]
pub struct ArticlesResponse {
    pub articles: Vec<Article>,
    /// Cursor of the next page, null on the last one
    pub next_cursor: Option<i64>,
}

/// Response body of `POST /articles`
#[derive(Debug, Clone, Serialize)]
pub struct CreateArticleResponse {
    pub id: i64,
    pub slug: String,
}

/// Response body of `GET /stats`, keyed by cache name.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub caches: BTreeMap<String, CacheStatsView>,
}

/// One cache's statistics, including the derived hit rate.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsView {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: impl IntoIterator<Item = CacheStats>) -> Self {
        let caches = stats
            .into_iter()
            .map(|stats| {
                let hit_rate = stats.hit_rate();
                (stats.name.clone(), CacheStatsView { stats, hit_rate })
            })
            .collect();
        Self { caches }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wraps_data() {
        let json = serde_json::to_value(Envelope::ok(RegisterResponse {
            id: 1,
            email: "a@example.com".into(),
        }))
        .unwrap();

        assert_eq!(json["data"]["id"], 1);
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_envelope_status() {
        let response = Envelope::created("x").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_next_cursor_null_at_end() {
        let json = serde_json::to_value(ArticlesResponse {
            articles: vec![],
            next_cursor: None,
        })
        .unwrap();
        assert!(json["next_cursor"].is_null());
    }

    #[test]
    fn test_stats_response_keyed_by_name() {
        let stats = CacheStats {
            name: "user-by-email".into(),
            hits: 3,
            misses: 1,
            capacity: 10,
            ..Default::default()
        };
        let json = serde_json::to_value(StatsResponse::new(vec![stats])).unwrap();

        assert_eq!(json["caches"]["user-by-email"]["hits"], 3);
        assert_eq!(json["caches"]["user-by-email"]["hit_rate"], 0.75);
    }

    #[test]
    fn test_health_response() {
        let response = HealthResponse::healthy();
        assert_eq!(response.status, "healthy");
    }
}
