//! Integration tests for sign-up, sign-in and session handling.
//!
//! Run with: cargo test --test auth_integration

mod common;

use axum::http::{Method, StatusCode};
use common::{unique_test_email, TestApp, ADMIN_EMAIL, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_sign_up_creates_participant() {
    let app = TestApp::new().await;
    let email = unique_test_email();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(json!({ "email": email, "password": PASSWORD, "role": "ADMIN" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "PARTICIPANT");
    assert_eq!(body["user"]["email"], email.to_lowercase());
    assert!(body["user"].get("clubName").is_none());
    assert_eq!(body["tokens"]["tokenType"], "Bearer");
    assert!(!body["tokens"]["refreshToken"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_sign_up_duplicate_email() {
    let app = TestApp::new().await;
    let (email, _) = app.participant().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(json!({ "email": email.to_uppercase(), "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_sign_up_weak_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(json!({ "email": unique_test_email(), "password": "password" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "Wrong12345" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_session_reports_role_and_club() {
    let app = TestApp::new().await;
    let organizer = app.organizer("Robotics").await;

    let (status, body) = app
        .call(Method::GET, "/api/v1/auth/session", Some(&organizer.token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "ORGANIZER");
    assert_eq!(body["user"]["clubName"], "Robotics");
    assert_eq!(body["user"]["userId"], organizer.id);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;

    let (status, _) = app.call(Method::GET, "/api/v1/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::GET, "/api/v1/events", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_out_revokes_session() {
    let app = TestApp::new().await;
    let (_, token) = app.participant().await;

    let (status, _) = app
        .call(Method::POST, "/api/v1/auth/sign-out", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .call(Method::GET, "/api/v1/auth/session", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::new().await;
    let email = unique_test_email();
    let (_, body) = app
        .call(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        )
        .await;
    let refresh_token = body["tokens"]["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refreshToken": refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access_token = body["accessToken"].as_str().unwrap().to_string();

    let (status, _) = app
        .call(Method::GET, "/api/v1/auth/session", Some(&access_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // The old refresh token is spent.
    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refreshToken": refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"]["backend"], "memory");
    assert_eq!(body["storage"]["connected"], true);
}
