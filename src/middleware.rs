//! Middlewares for routes.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::error::{Result, ServerError};

/// Reject browser calls from origins outside the allow-list.
/// Requests without an `Origin` header (same-origin, curl) pass.
pub async fn check_origin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    if let Some(origin) = req.headers().get(header::ORIGIN) {
        let origin = origin.to_str().map_err(|_| ServerError::OriginDenied)?;
        if !state
            .config
            .allowed_origins
            .iter()
            .any(|allowed| allowed == origin)
        {
            tracing::debug!(origin, "request from disallowed origin");
            return Err(ServerError::OriginDenied);
        }
    }

    Ok(next.run(req).await)
}

/// Per-client sliding-window rate limit on the contact endpoint.
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let client = client_addr(&req);
    let allowed = state.limiter.lock().unwrap().check_rate(&client);
    if !allowed {
        tracing::debug!(client, "rate limit exceeded");
        return Err(ServerError::RateLimited);
    }

    Ok(next.run(req).await)
}

/// Client address: `X-Forwarded-For` when behind a proxy, otherwise the
/// socket peer.
fn client_addr(req: &Request) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_owned())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip().to_string())
        })
        .unwrap_or_else(|| "127.0.0.1".to_owned())
}
