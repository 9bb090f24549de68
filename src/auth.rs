//! Static bearer-secret guards for the admin and cron routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::{AppState, error::AppError};

pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    guard(state.config.admin_token.as_deref(), request, next, "admin").await
}

pub async fn require_cron(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    guard(state.config.cron_secret.as_deref(), request, next, "cron").await
}

async fn guard(secret: Option<&str>, request: Request<Body>, next: Next, scope: &str) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if authorized(secret, presented) {
        next.run(request).await
    } else {
        debug!(scope, path = %request.uri().path(), "rejected bearer token");
        AppError::Unauthorized.into_response()
    }
}

/// An unset secret never authorizes.
pub fn authorized(secret: Option<&str>, presented: Option<&str>) -> bool {
    match (secret, presented) {
        (Some(secret), Some(token)) => secret.as_bytes().ct_eq(token.trim().as_bytes()).into(),
        _ => false,
    }
}
