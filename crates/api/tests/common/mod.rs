//! Common test utilities for integration tests.
//!
//! Every test builds its own application over in-memory stores, so no
//! database is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use domain::models::Role;
use domain::services::{MockTextGenerator, TextGenerator};
use eventease_api::app::{create_app, AppState, Stores};
use eventease_api::config::Config;
use fake::faker::internet::en::FreeEmailProvider;
use fake::Fake;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "Festival2024";
pub const ADMIN_EMAIL: &str = "admin@college.edu";

/// Test configuration with an HS256 secret and the given extra overrides.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut all = vec![("jwt.secret", JWT_SECRET)];
    all.extend_from_slice(overrides);
    Config::load_with_overrides(&all).expect("test config should load")
}

/// A running application plus the state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with(test_config(&[]), Arc::new(MockTextGenerator::new("Generated text"))).await
    }

    /// Builds the app and seeds one administrator account.
    pub async fn with(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let state = AppState::new(config, Stores::in_memory(), generator)
            .expect("state should build");
        state
            .auth
            .create_account(ADMIN_EMAIL, PASSWORD, Role::Admin, None)
            .await
            .expect("admin account should be created");

        Self {
            router: create_app(state.clone()),
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sends a request and returns the status with the parsed JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.send(json_request(method, uri, token, body)).await;
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/auth/sign-in",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "sign-in failed: {}", body);
        body["tokens"]["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.sign_in(ADMIN_EMAIL, PASSWORD).await
    }

    /// Signs up a fresh participant and returns its email and access token.
    pub async fn participant(&self) -> (String, String) {
        let email = unique_test_email();
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/auth/sign-up",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);
        let token = body["tokens"]["accessToken"].as_str().unwrap().to_string();
        (email, token)
    }

    /// Provisions an organizer through the admin API and signs it in.
    pub async fn organizer(&self, club_name: &str) -> TestOrganizer {
        let admin = self.admin_token().await;
        let email = unique_test_email();
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/admin/organizers",
                Some(&admin),
                Some(json!({ "email": email, "password": PASSWORD, "clubName": club_name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "provisioning failed: {}", body);

        TestOrganizer {
            id: body["id"].as_str().unwrap().to_string(),
            token: self.sign_in(&email, PASSWORD).await,
            email,
        }
    }

    /// Creates an event as `token` and returns its id.
    pub async fn create_event(&self, token: &str, title: &str, max: Option<i32>) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/events",
                Some(token),
                Some(event_body(title, max)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "event creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn register(&self, token: &str, event_id: &str, email: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            &format!("/api/v1/events/{}/registrations", event_id),
            Some(token),
            Some(registrant_body(email)),
        )
        .await
    }

    pub async fn set_status(&self, token: &str, event_id: &str, status: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            &format!("/api/v1/events/{}/status", event_id),
            Some(token),
            Some(json!({ "status": status })),
        )
        .await
    }
}

pub struct TestOrganizer {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn parse_response_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap_or(Value::Null)
}

/// Generate a unique email for testing.
pub fn unique_test_email() -> String {
    let provider: String = FreeEmailProvider().fake();
    format!("student_{}@{}", uuid::Uuid::new_v4().simple(), provider)
}

pub fn event_body(title: &str, max: Option<i32>) -> Value {
    json!({
        "title": title,
        "date": "2025-03-15",
        "description": "Teams race autonomous robots.",
        "schedule": "10:00 heats, 15:00 final",
        "venue": "Main Arena",
        "rules": "Robots under 5kg",
        "contact": "robotics@college.edu",
        "maxRegistrations": max,
    })
}

pub fn registrant_body(email: &str) -> Value {
    json!({
        "name": "Smith, John",
        "email": email,
        "college": "MIT",
        "referenceId": "TXN-001",
        "paymentEvidence": "receipt.png",
    })
}
