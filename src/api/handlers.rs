//! API Handlers
//!
//! HTTP request handlers for each blog endpoint, plus the shared state they
//! run against.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::info;

use crate::api::metrics::HttpMetrics;
use crate::auth::{
    token_from_header, AuthService, RevocationStore, TokenClaims, TokenManager,
    BLOCKLIST_CACHE_NAME,
};
use crate::cache::{Cache, CacheMetrics, ExpirySweep, ReadThroughCache};
use crate::clock::{SharedClock, SystemClock};
use crate::config::Config;
use crate::error::{AppError, ConfigError, Result};
use crate::models::{
    Article, ArticleRequest, ArticlesResponse, CreateArticleResponse, Envelope, HealthResponse,
    LoginRequest, LoginResponse, PaginationQuery, RefreshResponse, RegisterRequest,
    RegisterResponse, StatsResponse,
};
use crate::repositories::{InMemoryArticleRepository, InMemoryUserRepository, UserRepository};
use crate::services::{ArticleService, UserService, ARTICLE_CACHE_NAME, USER_CACHE_NAME};

/// Application state shared across all handlers.
///
/// Every cache instance is owned by exactly one service; `caches` holds
/// type-erased handles to the same instances for cleanup and stats.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub articles: Arc<ArticleService>,
    pub caches: Vec<Arc<dyn ExpirySweep>>,
    pub registry: Registry,
    pub http_metrics: HttpMetrics,
}

impl AppState {
    /// Wires caches, repositories and services from `config`.
    ///
    /// Metrics are registered on `registry`, which `GET /metrics` exports.
    pub fn new(
        config: &Config,
        clock: SharedClock,
        registry: Registry,
    ) -> std::result::Result<Self, ConfigError> {
        let cache_metrics = CacheMetrics::new(&registry)?;
        let http_metrics = HttpMetrics::new(&registry)?;

        let user_cache = Arc::new(Cache::new(
            USER_CACHE_NAME,
            config.user_cache.capacity,
            clock.clone(),
            cache_metrics.clone(),
        ));
        let article_cache = Arc::new(Cache::new(
            ARTICLE_CACHE_NAME,
            config.article_cache.capacity,
            clock.clone(),
            cache_metrics.clone(),
        ));
        let blocklist = Arc::new(Cache::new(
            BLOCKLIST_CACHE_NAME,
            config.blocklist_capacity,
            clock.clone(),
            cache_metrics,
        ));

        let tokens = TokenManager::new(&config.jwt, clock.clone())?;
        let auth = AuthService::new(tokens, RevocationStore::new(blocklist.clone(), clock.clone()));

        let user_repo: Arc<dyn UserRepository> =
            Arc::new(InMemoryUserRepository::new(clock.clone()));
        let article_repo = Arc::new(InMemoryArticleRepository::new(clock.clone()));

        let users = UserService::new(
            user_repo.clone(),
            ReadThroughCache::new(user_cache.clone(), config.user_cache.ttl),
        );
        let articles = ArticleService::new(
            article_repo,
            user_repo,
            ReadThroughCache::new(article_cache.clone(), config.article_cache.ttl),
            clock,
        );

        let caches: Vec<Arc<dyn ExpirySweep>> = vec![
            user_cache as Arc<dyn ExpirySweep>,
            article_cache as Arc<dyn ExpirySweep>,
            blocklist as Arc<dyn ExpirySweep>,
        ];

        Ok(Self {
            auth: Arc::new(auth),
            users: Arc::new(users),
            articles: Arc::new(articles),
            caches,
            registry,
            http_metrics,
        })
    }

    /// Creates the production state: wall clock and a fresh registry.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        Self::new(config, SystemClock::shared(), Registry::new())
    }
}

// == Health ==
/// Handler for GET /api/v1/healthz
pub async fn health_handler() -> Envelope<HealthResponse> {
    Envelope::ok(HealthResponse::healthy())
}

// == Auth ==
/// Handler for POST /api/v1/auth/register
pub async fn register_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Envelope<RegisterResponse>> {
    if let Some(errors) = req.validate() {
        return Err(AppError::Validation(errors));
    }

    let user = state.users.register(req).await?;
    Ok(Envelope::created(RegisterResponse {
        id: user.id,
        email: user.email,
    }))
}

/// Handler for POST /api/v1/auth/login
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Envelope<LoginResponse>> {
    if let Some(errors) = req.validate() {
        return Err(AppError::Validation(errors));
    }

    let user = state.users.verify_credentials(&req.email, &req.password).await?;
    let pair = state.auth.issue_pair(user.id)?;

    info!(user_id = user.id, "User logged in");
    Ok(Envelope::ok(pair.into()))
}

/// Handler for POST /api/v1/auth/refresh
///
/// Expects the refresh token in the `Authorization` header.
pub async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Envelope<RefreshResponse>> {
    let token = token_from_header(&headers)?;
    let issued = state.auth.refresh(token)?;
    Ok(Envelope::ok(issued.into()))
}

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the refresh token in the `Authorization` header.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let token = token_from_header(&headers)?;
    state.auth.logout(token)?;
    Ok(StatusCode::NO_CONTENT)
}

// == Articles ==
/// Handler for GET /api/v1/articles
pub async fn list_articles_handler(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Envelope<ArticlesResponse>> {
    let pagination = query.resolve().map_err(AppError::Validation)?;
    let page = state.articles.list(pagination).await?;

    Ok(Envelope::ok(ArticlesResponse {
        articles: page.articles,
        next_cursor: page.next_cursor,
    }))
}

/// Handler for GET /api/v1/articles/:slug
pub async fn get_article_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Envelope<Article>> {
    let article = state.articles.get_by_slug(&slug).await?;
    Ok(Envelope::ok(article))
}

/// Handler for POST /api/v1/articles
pub async fn create_article_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Json(req): Json<ArticleRequest>,
) -> Result<Envelope<CreateArticleResponse>> {
    if let Some(errors) = req.validate() {
        return Err(AppError::Validation(errors));
    }

    let article = state.articles.create(claims.user_id, req).await?;
    Ok(Envelope::created(CreateArticleResponse {
        id: article.id,
        slug: article.slug,
    }))
}

/// Handler for PUT /api/v1/articles/:slug
pub async fn update_article_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(slug): Path<String>,
    Json(req): Json<ArticleRequest>,
) -> Result<Envelope<Article>> {
    if let Some(errors) = req.validate() {
        return Err(AppError::Validation(errors));
    }

    let article = state.articles.update(&slug, claims.user_id, req).await?;
    Ok(Envelope::ok(article))
}

/// Handler for DELETE /api/v1/articles/:slug
pub async fn delete_article_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    state.articles.delete(&slug, claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// == Observability ==
/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.caches.iter().map(|cache| cache.stats()),
    ))
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Result<Response> {
    let encoder = TextEncoder::new();
    let body = encoder
        .encode_to_string(&state.registry.gather())
        .map_err(|err| AppError::Internal(format!("failed to encode metrics: {}", err)))?;

    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn test_state() -> AppState {
        let config = Config::from_lookup(|name| {
            (name == "API_JWT_SECRET_KEY").then(|| "test-secret".to_string())
        })
        .unwrap();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        AppState::new(&config, clock, Registry::new()).unwrap()
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: email.into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let state = test_state();

        let registered = register_handler(
            State(state.clone()),
            Json(register_request("jane@example.com")),
        )
        .await
        .unwrap();
        assert_eq!(registered.data.email, "jane@example.com");

        let login = login_handler(
            State(state.clone()),
            Json(LoginRequest {
                email: "jane@example.com".into(),
                password: "secret".into(),
            }),
        )
        .await
        .unwrap();
        assert!(!login.data.access_token.is_empty());
        assert!(login.data.refresh_token_expires_at > login.data.access_token_expires_at);
    }

    #[tokio::test]
    async fn test_register_validation_error() {
        let state = test_state();
        let result = register_handler(State(state), Json(register_request("nope"))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let state = test_state();
        register_handler(State(state.clone()), Json(register_request("jane@example.com")))
            .await
            .unwrap();

        let result = login_handler(
            State(state),
            Json(LoginRequest {
                email: "jane@example.com".into(),
                password: "wrong".into(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_get_missing_article() {
        let state = test_state();
        let result = get_article_handler(State(state), Path("missing".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_lists_every_cache() {
        let state = test_state();
        let response = stats_handler(State(state)).await;

        assert_eq!(response.caches.len(), 3);
        assert!(response.caches.contains_key(USER_CACHE_NAME));
        assert!(response.caches.contains_key(ARTICLE_CACHE_NAME));
        assert!(response.caches.contains_key(BLOCKLIST_CACHE_NAME));
    }

    #[tokio::test]
    async fn test_metrics_handler_renders_text_format() {
        let state = test_state();
        let response = metrics_handler(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.data.status, "healthy");
    }
}
