//! Redirect token endpoints: issuing links, redeeming tokens, preflight and health.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{
    body_json, create_app, create_test_config, get, send, TEST_DESTINATION,
    TEST_REDIRECT_ENDPOINT, TEST_TOKEN_SECRET,
};
use lead_relay::token::TokenCodec;
use serde_json::json;
use url::Url;

fn app() -> axum::Router {
    create_app(create_test_config("http://127.0.0.1:9".to_string()))
}

fn codec() -> TokenCodec {
    TokenCodec::from_secret(TEST_TOKEN_SECRET).unwrap()
}

#[tokio::test]
async fn test_missing_token_is_400() {
    let response = get(app(), "/redirect").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(body_json(response).await, json!({ "error": "Missing token" }));
}

#[tokio::test]
async fn test_empty_token_is_missing() {
    let response = get(app(), "/redirect?token=").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Missing token" }));
}

#[tokio::test]
async fn test_valid_token_redirects_to_exact_destination() {
    let token = codec().encrypt("https://example.com/x").unwrap();
    let response = get(app(), &format!("/redirect?token={}", token)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/x"
    );
}

#[tokio::test]
async fn test_tampered_token_fails_closed() {
    let token = codec().encrypt("https://example.com/x").unwrap();
    let last = token.chars().last().unwrap();
    let replacement = if last == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}{}", &token[..token.len() - 1], replacement);

    let response = get(app(), &format!("/redirect?token={}", tampered)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(body_json(response).await, json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn test_token_from_other_secret_fails_closed() {
    let foreign = TokenCodec::from_secret("some-other-deployment")
        .unwrap()
        .encrypt("https://example.com/x")
        .unwrap();

    let response = get(app(), &format!("/redirect?token={}", foreign)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn test_repeated_token_parameter_is_invalid_token() {
    let token = codec().encrypt("https://example.com/x").unwrap();
    let response = get(app(), &format!("/redirect?token={}&token={}", token, token)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(body_json(response).await, json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn test_non_ascii_destination_sent_byte_for_byte() {
    let destination = "https://example.com/caf\u{e9}";
    let token = codec().encrypt(destination).unwrap();
    let response = get(app(), &format!("/redirect?token={}", token)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap().as_bytes(),
        destination.as_bytes()
    );
}

#[tokio::test]
async fn test_issued_link_round_trips_through_redirect() {
    let response = get(app(), "/api/redirect-link").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let link = Url::parse(body["redirectUrl"].as_str().unwrap()).unwrap();
    assert!(link.as_str().starts_with(TEST_REDIRECT_ENDPOINT));

    let token = link
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .expect("link carries a token");
    assert_eq!(codec().decrypt(&token).unwrap(), TEST_DESTINATION);

    let response = get(app(), &format!("/redirect?{}", link.query().unwrap())).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        TEST_DESTINATION
    );
}

#[tokio::test]
async fn test_redirect_link_accepts_post() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/redirect-link")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["redirectUrl"]
        .as_str()
        .unwrap()
        .contains("token=v1."));
}

#[tokio::test]
async fn test_preflight_answers_with_fixed_policy() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/leads")
        .header(header::ORIGIN, "https://forms.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("POST") && methods.contains("GET"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_health_check() {
    let response = get(app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "lead-relay");
}
