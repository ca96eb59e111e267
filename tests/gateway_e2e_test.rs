//! End-to-end tests of the gateway over a real TCP socket.
//!
//! Boots the full router with `axum::serve` against mock store and
//! webhook consumers, then drives the flows with a plain HTTP client
//! the way a device or dashboard would.

use std::time::Duration;

use busload_api::{create_router, AppState, Config};
use serde_json::json;
use uuid::Uuid;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

const TEST_TOKEN: &str = "e2e-gateway-token";

async fn spawn_gateway(store_url: &str, webhook_url: &str) -> String {
    let config = Config {
        database_url: store_url.to_string(),
        database_key: "e2e-service-key".to_string(),
        bearer_token: TEST_TOKEN.to_string(),
        webhook_url: webhook_url.to_string(),
        webhook_secret: "e2e-hook-secret".to_string(),
        webhook_timeout_ms: 500,
        store_timeout_ms: 1000,
        ..Config::default()
    };

    let state = AppState::from_config(config).expect("build app state");
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve gateway");
    });

    format!("http://{addr}")
}

/// Test the full detection flow: push over the socket, persistence in
/// the store, and webhook delivery to the downstream consumer.
#[tokio::test]
async fn detection_push_flows_through_gateway() {
    let store_server = MockServer::start().await;
    let webhook_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/rest/v1/push_requests"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 501,
            "created_at": "2026-03-01T08:00:00Z",
            "json_data": {}
        }])))
        .mount(&store_server)
        .await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&webhook_server)
        .await;

    let base = spawn_gateway(&store_server.uri(), &webhook_server.uri()).await;
    let client = reqwest::Client::new();

    let record_uuid = Uuid::new_v4();
    let response = client
        .post(format!("{base}/api/v1/push"))
        .bearer_auth(TEST_TOKEN)
        .json(&json!({
            "uuid": record_uuid,
            "data": { "detection_results": [{ "seat": 3, "occupied": false }] }
        }))
        .send()
        .await
        .expect("push request");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("push body");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["processed_data"]["uuid"], record_uuid.to_string());

    // Webhook dispatch runs on its own task; wait for it to land.
    let mut delivered = Vec::new();
    for _ in 0..80 {
        delivered = webhook_server.received_requests().await.unwrap_or_default();
        if !delivered.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(delivered.len(), 1, "webhook never delivered");

    let envelope: serde_json::Value =
        serde_json::from_slice(&delivered[0].body).expect("webhook body");
    assert_eq!(envelope["event"], "new_detection_data");
    assert_eq!(envelope["record_id"], 501);
    assert_eq!(envelope["secret"], "e2e-hook-secret");
    assert_eq!(envelope["data"]["uuid"], record_uuid.to_string());
}

/// Test the occupancy write and readback flow over the socket.
#[tokio::test]
async fn occupancy_round_trip_through_gateway() {
    let store_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/rest/v1/bus_occupancy"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 31,
            "created_at": "2026-03-01T08:00:00Z",
            "json_data": {}
        }])))
        .mount(&store_server)
        .await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/rest/v1/bus_occupancy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 31,
            "created_at": "2026-03-01T08:00:00Z",
            "json_data": {
                "bus_id": "bus-9",
                "route_id": "4",
                "occupancy_count": 18,
                "max_capacity": 41,
                "occupancy_percentage": 43.90243902439025,
                "timestamp": "2026-03-01T08:00:00Z",
                "location": null
            }
        }])))
        .mount(&store_server)
        .await;

    let base = spawn_gateway(&store_server.uri(), "").await;
    let client = reqwest::Client::new();

    let update = client
        .post(format!("{base}/api/v1/bus-occupancy"))
        .bearer_auth(TEST_TOKEN)
        .json(&json!({
            "bus_id": "bus-9",
            "route_id": "4",
            "occupancy_count": 18,
            "max_capacity": 41
        }))
        .send()
        .await
        .expect("update request");

    assert_eq!(update.status(), 200);

    let update_body: serde_json::Value = update.json().await.expect("update body");
    let percentage = update_body["data"]["occupancy_percentage"].as_f64().expect("percentage");
    assert!((percentage - 18.0 / 41.0 * 100.0).abs() < 1e-9);

    let read = client
        .get(format!("{base}/api/v1/bus-occupancy/bus-9"))
        .bearer_auth(TEST_TOKEN)
        .send()
        .await
        .expect("read request");

    assert_eq!(read.status(), 200);

    let read_body: serde_json::Value = read.json().await.expect("read body");
    assert_eq!(read_body["data"]["id"], 31);
    assert_eq!(read_body["data"]["json_data"]["bus_id"], "bus-9");
}

/// Test that the socket surface enforces authentication and keeps the
/// public routes open.
#[tokio::test]
async fn gateway_refuses_missing_credentials() {
    let base = spawn_gateway("http://127.0.0.1:1", "").await;
    let client = reqwest::Client::new();

    let rejected = client
        .post(format!("{base}/api/v1/push"))
        .json(&json!({}))
        .send()
        .await
        .expect("unauthenticated request");

    assert_eq!(rejected.status(), 401);
    assert_eq!(
        rejected.headers().get("www-authenticate").and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );

    let root = client.get(format!("{base}/")).send().await.expect("root request");
    assert_eq!(root.status(), 200);

    let body: serde_json::Value = root.json().await.expect("root body");
    assert_eq!(body["message"], "Bus occupancy gateway is running");
}
