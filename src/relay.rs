//! Lead relay: validate, normalize, forward, and translate the partner's answer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::UpstreamResult;
use crate::validation::validate_submission;

/// Message used when the partner rejects without saying why.
pub const DEFAULT_REJECTION_MESSAGE: &str = "rejected";

/// What the frontend sees after a relayed submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelayOutcome {
    #[serde(rename_all = "camelCase")]
    Accepted { redirect_url: Value, price: Value },
    Rejected { message: Value },
    #[serde(rename_all = "camelCase")]
    Error { upstream_status: u16, upstream: Value },
}

impl RelayOutcome {
    /// Status code the outcome is served with.
    ///
    /// An upstream status that cannot carry a body (1xx, 204, 304) or is not a
    /// valid code becomes 502, so the error JSON always reaches the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayOutcome::Accepted { .. } | RelayOutcome::Rejected { .. } => StatusCode::OK,
            RelayOutcome::Error {
                upstream_status, ..
            } => StatusCode::from_u16(*upstream_status)
                .ok()
                .filter(|status| {
                    !status.is_informational()
                        && *status != StatusCode::NO_CONTENT
                        && *status != StatusCode::NOT_MODIFIED
                })
                .unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }
}

impl From<UpstreamResult> for RelayOutcome {
    /// Maps the partner's answer. Only HTTP 200 with `ACCEPTED` or `REJECTED`
    /// (case-sensitive) is a decision; everything else is echoed as an error.
    fn from(result: UpstreamResult) -> Self {
        let field = |name: &str| result.body.get(name).cloned().unwrap_or(Value::Null);

        match (result.status, result.body_status()) {
            (200, Some("ACCEPTED")) => RelayOutcome::Accepted {
                redirect_url: field("redirectUrl"),
                price: field("price"),
            },
            (200, Some("REJECTED")) => RelayOutcome::Rejected {
                message: match field("message") {
                    Value::Null => Value::from(DEFAULT_REJECTION_MESSAGE),
                    message => message,
                },
            },
            _ => RelayOutcome::Error {
                upstream_status: result.status,
                upstream: result.body.clone(),
            },
        }
    }
}

impl IntoResponse for RelayOutcome {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Runs one submission through the relay.
///
/// Validation failures return before any outbound call. The partner is called
/// exactly once; there is no retry.
pub async fn relay_lead(state: &AppState, body: &Value) -> Result<RelayOutcome, AppError> {
    let lead = validate_submission(body).map_err(AppError::Validation)?;
    let lead = lead.normalize();

    let result = state.lead_client.submit(&lead).await?;
    let outcome = RelayOutcome::from(result);

    match &outcome {
        RelayOutcome::Accepted { price, .. } => {
            tracing::info!("✓ Lead accepted: campaign={:?}, price={}", lead.campaign_id(), price)
        }
        RelayOutcome::Rejected { .. } => {
            tracing::info!("Lead rejected by partner: campaign={:?}", lead.campaign_id())
        }
        RelayOutcome::Error {
            upstream_status, ..
        } => tracing::warn!(
            "❌ Partner error {} for campaign={:?}",
            upstream_status,
            lead.campaign_id()
        ),
    }

    if state.config.response_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(state.config.response_delay_ms)).await;
    }

    Ok(outcome)
}
