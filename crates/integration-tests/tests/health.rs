//! Liveness, readiness and fallback behavior.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The API server running (cargo run -p hridved-api)

use hridved_integration_tests::{api_base_url, api_url, client};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_root_banner() {
    let resp = client()
        .get(format!("{}/", api_base_url()))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "API is running...");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health_and_readiness() {
    let client = client();
    let base = api_base_url();

    let live = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("Failed to reach /health");
    assert_eq!(live.status(), StatusCode::OK);

    let ready = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .expect("Failed to reach /health/ready");
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_unknown_route_is_json_404() {
    let resp = client()
        .get(api_url("/does-not-exist"))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("JSON body");
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not Found - /api/does-not-exist");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_request_id_is_returned() {
    let resp = client()
        .get(format!("{}/health", api_base_url()))
        .send()
        .await
        .expect("Failed to reach API");

    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(
        resp.headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
}
