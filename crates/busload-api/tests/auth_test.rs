//! Integration tests for bearer authentication on the protected routes.
//!
//! Exercises the `/api/v1` route group with missing, malformed, wrong,
//! and valid credentials, and verifies the public routes stay open.

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, StatusCode},
};
use busload_api::{create_router, AppState, Config};
use serde_json::json;
use tower::ServiceExt;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

const TEST_TOKEN: &str = "test-gateway-token";

fn test_state(store_url: &str) -> AppState {
    let config = Config {
        database_url: store_url.to_string(),
        database_key: "test-service-key".to_string(),
        bearer_token: TEST_TOKEN.to_string(),
        store_timeout_ms: 1000,
        ..Config::default()
    };

    AppState::from_config(config).expect("build app state")
}

fn push_request(auth_header: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/push")
        .header("content-type", "application/json");

    if let Some(value) = auth_header {
        builder = builder.header(AUTHORIZATION, value);
    }

    builder
        .body(Body::from(serde_json::to_vec(&json!({})).expect("serialize payload")))
        .expect("build request")
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body =
        axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read response body");
    serde_json::from_slice(&body).expect("parse response json")
}

/// Test that protected routes reject requests without credentials.
///
/// The rejection must still arrive in the response envelope with the
/// bearer challenge header set.
#[tokio::test]
async fn protected_route_fails_without_credentials() {
    let app = create_router(test_state("http://127.0.0.1:1"));

    let response = app.oneshot(push_request(None)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("www-authenticate").and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );

    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid bearer token");
    assert!(body["data"].is_null());
}

/// Test that a wrong bearer token is rejected.
#[tokio::test]
async fn protected_route_fails_with_wrong_token() {
    let app = create_router(test_state("http://127.0.0.1:1"));

    let response =
        app.oneshot(push_request(Some("Bearer wrong-token"))).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Invalid bearer token");
}

/// Test that a non-bearer authorization scheme is rejected.
#[tokio::test]
async fn protected_route_fails_with_malformed_scheme() {
    let app = create_router(test_state("http://127.0.0.1:1"));

    let response =
        app.oneshot(push_request(Some("Basic dXNlcjpwYXNz"))).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that all authentication failures are indistinguishable.
///
/// A caller probing the gateway must not be able to tell a missing
/// header from a malformed one or from a wrong token.
#[tokio::test]
async fn authentication_failures_answer_identically() {
    let attempts = [None, Some("Bearer wrong-token"), Some("Token whatever"), Some("Bearer ")];

    for auth_header in attempts {
        let app = create_router(test_state("http://127.0.0.1:1"));
        let response = app.oneshot(push_request(auth_header)).await.expect("execute request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "attempt: {auth_header:?}");
        assert_eq!(
            response.headers().get("www-authenticate").and_then(|v| v.to_str().ok()),
            Some("Bearer"),
            "attempt: {auth_header:?}"
        );

        let body = read_json(response).await;
        assert_eq!(body["message"], "Invalid bearer token", "attempt: {auth_header:?}");
    }
}

/// Test that the correct bearer token passes authentication.
#[tokio::test]
async fn protected_route_accepts_valid_token() {
    let store_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/rest/v1/push_requests"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 1,
            "created_at": "2026-03-01T08:00:00Z",
            "json_data": {}
        }])))
        .mount(&store_server)
        .await;

    let app = create_router(test_state(&store_server.uri()));

    let response = app
        .oneshot(push_request(Some(&format!("Bearer {TEST_TOKEN}"))))
        .await
        .expect("execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
}

/// Test that the root endpoint answers without credentials.
#[tokio::test]
async fn root_endpoint_needs_no_credentials() {
    let app = create_router(test_state("http://127.0.0.1:1"));

    let request = Request::builder().uri("/").body(Body::empty()).expect("build request");
    let response = app.oneshot(request).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Bus occupancy gateway is running");
    assert_eq!(body["data"]["environment"], "development");
    assert!(body["data"]["version"].is_string());
}
