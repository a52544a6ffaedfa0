//! API Module
//!
//! HTTP handlers, middleware and routing for the blog REST API.
//!
//! # Endpoints
//! - `GET /api/v1/healthz` - Health check
//! - `POST /api/v1/auth/register` - Create an account
//! - `POST /api/v1/auth/login` - Exchange credentials for tokens
//! - `POST /api/v1/auth/refresh` - New access token from a refresh token
//! - `POST /api/v1/auth/logout` - Revoke a refresh token
//! - `GET /api/v1/articles` - Paginated article list
//! - `POST /api/v1/articles` - Create an article
//! - `GET /api/v1/articles/:slug` - Read an article
//! - `PUT /api/v1/articles/:slug` - Update an article
//! - `DELETE /api/v1/articles/:slug` - Delete an article
//! - `GET /stats` - Per-cache statistics
//! - `GET /metrics` - Prometheus metrics

pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;

pub use handlers::AppState;
pub use metrics::HttpMetrics;
pub use routes::create_router;
