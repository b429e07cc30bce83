use crate::config::Config;
use crate::errors::AppError;
use crate::lead_client::LeadApiClient;
use crate::models::FieldError;
use crate::relay::{self, RelayOutcome};
use crate::token::{TokenCodec, TokenError};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the partner lead API.
    pub lead_client: LeadApiClient,
    /// Redirect token codec keyed by `TOKEN_SECRET`.
    pub codec: TokenCodec,
}

impl AppState {
    /// Builds every shared component from configuration.
    ///
    /// Fails when the token secret is unusable, so a misconfigured process never
    /// starts serving.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let lead_client = LeadApiClient::new(&config)?;
        let codec = TokenCodec::from_secret(&config.token_secret)
            .map_err(|e| AppError::Internal(format!("Failed to build token codec: {}", e)))?;

        Ok(Self {
            config,
            lead_client,
            codec,
        })
    }
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-relay",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/leads
///
/// Validates the form payload, relays it to the partner and answers with the
/// normalized outcome.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - The raw JSON body; a body that is not JSON is a validation error.
///
/// # Returns
///
/// * `Result<RelayOutcome, AppError>` - The outcome, served with its own status code.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<RelayOutcome, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!("Unreadable lead body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Validation(vec![FieldError::new("", "body must be a JSON object")])
        }
    })?;

    tracing::info!("POST /api/leads");
    relay::relay_lead(&state, &body).await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectLinkResponse {
    pub redirect_url: String,
}

/// GET|POST /api/redirect-link
///
/// Seals the configured destination into a fresh token and returns the public
/// redirect URL carrying it.
pub async fn issue_redirect_link(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RedirectLinkResponse>, AppError> {
    let token = state
        .codec
        .encrypt(&state.config.redirect_destination_url)
        .map_err(|e| AppError::Internal(format!("Token encryption failed: {}", e)))?;

    let mut url = Url::parse(&state.config.redirect_endpoint_url)
        .map_err(|e| AppError::Internal(format!("Invalid redirect endpoint: {}", e)))?;
    url.query_pairs_mut().append_pair("token", &token);

    tracing::debug!("Issued redirect token");
    Ok(Json(RedirectLinkResponse {
        redirect_url: url.into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    token: Option<String>,
}

/// GET /redirect?token=...
///
/// Decrypts the token and redirects to the sealed destination. Fails closed:
/// anything short of an authenticated, absolute http(s) URL is a 400.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RedirectQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::warn!("Unreadable redirect query: {}", rejection.body_text());
        AppError::InvalidToken(TokenError::Malformed)
    })?;
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingToken)?;

    let destination = decode_destination(&state.codec, &token)?;
    let location =
        HeaderValue::try_from(destination).map_err(|_| TokenError::InvalidDestination)?;

    tracing::info!("Redirecting token holder");
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Decrypts `token` and checks the result is a redirectable URL.
///
/// Returns the plaintext exactly as sealed, not a re-serialized URL.
pub fn decode_destination(codec: &TokenCodec, token: &str) -> Result<String, TokenError> {
    let plaintext = codec.decrypt(token)?;
    if plaintext.chars().any(char::is_control) {
        return Err(TokenError::InvalidDestination);
    }
    let url = Url::parse(&plaintext).map_err(|_| TokenError::InvalidDestination)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(TokenError::InvalidDestination);
    }
    Ok(plaintext)
}
