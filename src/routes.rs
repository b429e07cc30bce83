//! HTTP routing and the middleware shared by every deployment.
//!
//! Per-IP rate limiting needs the peer address, so it is layered on by the
//! binary rather than here.

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::handlers::{self, AppState};

/// Largest accepted request body. A lead form is a few KiB.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// How long browsers may cache a preflight answer.
pub const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86400);

/// Builds the application router.
///
/// # Routes
///
/// - `GET /health`
/// - `POST /api/leads`
/// - `GET|POST /api/redirect-link`
/// - `GET /redirect?token=...`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/leads", post(handlers::submit_lead))
        .route(
            "/api/redirect-link",
            get(handlers::issue_redirect_link).post(handlers::issue_redirect_link),
        )
        .route("/redirect", get(handlers::redirect))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Fixed, permissive CORS policy; preflight answers carry no body.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(PREFLIGHT_MAX_AGE)
}
