//! Shared fixtures for integration tests.

// Each test file compiles as its own crate and uses a subset of these helpers.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use lead_relay::config::Config;
use lead_relay::handlers::AppState;
use lead_relay::routes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_TOKEN_SECRET: &str = "integration-test-secret";
pub const TEST_REDIRECT_ENDPOINT: &str = "https://go.example.com/redirect";
pub const TEST_DESTINATION: &str = "https://offers.example.com/landing?src=relay";

/// Helper function to create test config
pub fn create_test_config(lead_api_base_url: String) -> Config {
    Config {
        port: 8080,
        lead_api_base_url,
        lead_api_key: "test_key".to_string(),
        lead_api_secret: "test_secret".to_string(),
        lead_api_timeout_secs: 5,
        response_delay_ms: 0,
        token_secret: TEST_TOKEN_SECRET.to_string(),
        redirect_endpoint_url: TEST_REDIRECT_ENDPOINT.to_string(),
        redirect_destination_url: TEST_DESTINATION.to_string(),
    }
}

pub fn create_app(config: Config) -> Router {
    let state = AppState::new(config).expect("failed to build app state");
    routes::router(Arc::new(state))
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("failed to make request")
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

/// A submission that passes every schema rule except the cross-field one:
/// callers add `subID3` or `bankMonths`.
pub fn valid_lead() -> Value {
    json!({
        "campaignID": 1234,
        "ipAddress": "203.0.113.7",
        "sourceURL": "https://loans.example.com/apply",
        "minPrice": 0,
        "firstName": "Jane",
        "lastName": "Doe",
        "address": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "zipCode": "62701",
        "ssn": "123456789",
        "dateOfBirth": "1990-04-12",
        "licenseNumber": "D1234567",
        "licenseState": "IL",
        "homePhone": "2175550100",
        "workPhone": "2175550101",
        "cellPhone": "2175550102",
        "email": "jane.doe@example.com",
        "ownRent": "own",
        "addressYears": 3,
        "addressMonths": 4,
        "employerName": "Acme",
        "employerState": "IL",
        "employmentYears": 5,
        "employmentMonths": 0,
        "monthlyIncome": "4200",
        "incomeSource": "EMPLOYMENT",
        "bankName": "First Bank",
        "bankAccountNumber": "000123456789",
        "bankRoutingNumber": "071000013",
        "bankAccountType": "CHECKING",
        "payMethod": "DIRECT_DEPOSIT",
        "payPeriod": "BI_WEEKLY",
        "firstPayDate": "2026-11-01",
        "secondPayDate": "2026-11-15",
        "loanAmount": 500,
        "activeMilitary": "0",
        "subID": "click-42"
    })
}

pub fn valid_lead_with(field: &str, value: Value) -> Value {
    let mut lead = valid_lead();
    lead[field] = value;
    lead
}
