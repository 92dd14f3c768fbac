//! Register, profile and logout over the cookie session.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The API server running (cargo run -p hridved-api)

use hridved_integration_tests::{api_url, client, unique_email};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_register_profile_logout() {
    let client = client();
    let email = unique_email();

    let resp = client
        .post(api_url("/users"))
        .json(&json!({ "name": "Integration Test", "email": email, "password": "secret123" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = resp.json().await.expect("JSON body");
    assert_eq!(user["email"], email.as_str());
    assert_eq!(user["isAdmin"], false);

    // Cookie from registration authenticates the next call
    let resp = client
        .get(api_url("/users/profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = resp.json().await.expect("JSON body");
    assert_eq!(profile["_id"], user["_id"]);

    let resp = client
        .post(api_url("/users/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(api_url("/users/profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_duplicate_registration_rejected() {
    let client = client();
    let body = json!({ "name": "Twice", "email": unique_email(), "password": "secret123" });

    let first = client
        .post(api_url("/users"))
        .json(&body)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(api_url("/users"))
        .json(&body)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_login_with_wrong_password() {
    let resp = client()
        .post(api_url("/users/auth"))
        .json(&json!({ "email": unique_email(), "password": "not-the-password" }))
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("JSON body");
    assert_eq!(body["message"], "Invalid email or password");
}
