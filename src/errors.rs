use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::FieldError;
use crate::token::TokenError;

/// Generic message for failures whose detail must not reach the caller.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected server error";

/// Application-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The submission violated the lead schema.
    #[error("Validation failed with {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),
    /// The request body exceeded the router's size limit.
    #[error("Request body too large")]
    PayloadTooLarge,
    /// The redirect request carried no token.
    #[error("Missing token")]
    MissingToken,
    /// The token could not be decrypted or did not hold a usable destination.
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    /// Transport-level failure talking to the upstream lead API.
    #[error("External API error: {0}")]
    ExternalApi(String),
    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    /// Maps each error variant to a status code and JSON body.
    ///
    /// Internal detail is logged here and never echoed to the caller.
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                tracing::info!("Rejected submission: {} field error(s)", errors.len());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "status": "validation_error",
                        "errors": errors,
                    })),
                )
                    .into_response()
            }
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "Request body too large" })),
            )
                .into_response(),
            AppError::MissingToken => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing token" })),
            )
                .into_response(),
            AppError::InvalidToken(e) => {
                tracing::warn!("Refusing redirect: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid token" })),
                )
                    .into_response()
            }
            AppError::ExternalApi(msg) => {
                tracing::error!("External API error: {}", msg);
                unexpected()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                unexpected()
            }
        }
    }
}

fn unexpected() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "status": "error",
            "message": UNEXPECTED_ERROR_MESSAGE,
        })),
    )
        .into_response()
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::ExternalApi(format!("upstream timed out: {}", err))
        } else {
            AppError::ExternalApi(err.to_string())
        }
    }
}
