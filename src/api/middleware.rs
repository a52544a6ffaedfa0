//! API Middleware
//!
//! Bearer-token guard for protected routes and HTTP metrics.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::AppState;
use crate::auth::{token_from_header, TokenType};
use crate::error::AppError;

/// Rejects requests without a valid, unrevoked access token.
///
/// On success the verified [`TokenClaims`](crate::auth::TokenClaims) are
/// stored in the request extensions for the handler.
pub async fn require_access_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_header(req.headers())?.to_owned();

    let claims = state
        .auth
        .authorize(&token, TokenType::Access)
        .inspect_err(|err| debug!(error = %err, path = %req.uri().path(), "Rejected request"))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Counts every request by status and records its latency.
pub async fn track_http_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let in_flight = state.http_metrics.request_started();

    let response = next.run(req).await;

    in_flight.finish(response.status().as_u16());
    response
}
