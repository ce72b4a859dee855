/// Integration tests for the authentication endpoints
///
/// These drive the real router end-to-end: registration uniqueness,
/// credential-error uniformity, and the token round trip through the
/// protected `me` endpoint.
///
/// Run with: cargo test --test auth_api -- --ignored --test-threads=1

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_register_returns_public_view() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "Password123!",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_i64());
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_register_duplicate_username_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register_and_login("alice").await;

    let (status, body) = ctx
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "Password123!",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "Username already taken");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_register_duplicate_email_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register_and_login("alice").await;

    let (status, body) = ctx
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "Password123!",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_register_validation_failure() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "not-an-email",
                "password": "short",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register_and_login("alice").await;

    // Existing user, wrong password
    let (status_wrong, body_wrong) = ctx
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "WrongPassword!" })),
        )
        .await;

    // Nonexistent user
    let (status_missing, body_missing) = ctx
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "nobody", "password": "WrongPassword!" })),
        )
        .await;

    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(status_missing, StatusCode::UNAUTHORIZED);
    // Same body for both failure modes: no username enumeration
    assert_eq!(body_wrong, body_missing);
    assert_eq!(body_wrong["message"], "Invalid username or password");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_login_token_round_trip() {
    let ctx = TestContext::new().await.unwrap();
    let (user_id, _) = ctx.register_and_login("alice").await;

    let (status, body) = ctx
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "Password123!" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user_id"], user_id);
    let expires_in = body["expires_in"].as_i64().unwrap();
    assert!(expires_in > 0 && expires_in <= 24 * 3600);

    // The issued token is accepted by the protected endpoint and names the
    // same user
    let token = body["access_token"].as_str().unwrap();
    let (status, me) = ctx.request("GET", "/api/v1/auth/me", Some(token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id);
    assert_eq!(me["username"], "alice");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_me_rejects_missing_and_garbage_tokens() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.request("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request("GET", "/api/v1/auth/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
