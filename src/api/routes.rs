//! API Routes
//!
//! Configures the Axum router with all blog endpoints.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_article_handler, delete_article_handler, get_article_handler, health_handler,
    list_articles_handler, login_handler, logout_handler, metrics_handler, refresh_handler,
    register_handler, stats_handler, update_article_handler, AppState,
};
use super::middleware::{require_access_token, track_http_metrics};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/v1/healthz`
/// - `POST /api/v1/auth/{register,login,refresh,logout}`
/// - `GET|POST /api/v1/articles`
/// - `GET|PUT|DELETE /api/v1/articles/:slug`
/// - `GET /stats`, `GET /metrics`
///
/// Article writes require an access token. Every response carries an
/// `x-request-id` header.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/auth/logout", post(logout_handler));

    let public_articles = Router::new()
        .route("/articles", get(list_articles_handler))
        .route("/articles/:slug", get(get_article_handler));

    let protected_articles = Router::new()
        .route("/articles", post(create_article_handler))
        .route(
            "/articles/:slug",
            put(update_article_handler).delete(delete_article_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token,
        ));

    let api = Router::new()
        .route("/healthz", get(health_handler))
        .merge(auth)
        .merge(public_articles)
        .merge(protected_articles);

    Router::new()
        .nest("/api/v1", api)
        .route("/stats", get(stats_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), track_http_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
