//! Integration tests for the registration ledger: registering, the one-shot
//! edit and CSV export.
//!
//! Run with: cargo test --test registrations_integration

mod common;

use axum::http::{header, Method, StatusCode};
use common::{body_bytes, json_request, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_register_records_authenticated_email() {
    let app = TestApp::new().await;
    let organizer = app.organizer("Robotics").await;
    let event_id = app.create_event(&organizer.token, "Robo Race", None).await;
    let (email, participant) = app.participant().await;

    let (status, body) = app
        .register(&participant, &event_id, "teammate@college.edu")
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["eventId"], event_id);
    assert_eq!(body["email"], "teammate@college.edu");
    assert_eq!(body["userEmail"], email.to_lowercase());
    assert_eq!(body["detailsEdited"], false);
    assert_eq!(body["edit"], "AVAILABLE");

    let (status, body) = app
        .call(Method::GET, "/api/v1/me/registrations", Some(&participant), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let mine = body["registrations"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["eventTitle"], "Robo Race");
}

#[tokio::test]
async fn test_organizer_cannot_register() {
    let app = TestApp::new().await;
    let organizer = app.organizer("Robotics").await;
    let event_id = app.create_event(&organizer.token, "Robo Race", None).await;

    let (status, body) = app
        .register(&organizer.token, &event_id, &organizer.email)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only participants can register for events");
}

#[tokio::test]
async fn test_register_for_unknown_event() {
    let app = TestApp::new().await;
    let (email, participant) = app.participant().await;

    let (status, _) = app
        .register(&participant, &uuid::Uuid::new_v4().to_string(), &email)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_can_be_edited_once() {
    let app = TestApp::new().await;
    let organizer = app.organizer("Robotics").await;
    let event_id = app.create_event(&organizer.token, "Robo Race", None).await;
    let (email, participant) = app.participant().await;
    let (_, body) = app.register(&participant, &event_id, &email).await;
    let uri = format!("/api/v1/registrations/{}", body["id"].as_str().unwrap());

    let (status, body) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&participant),
            Some(json!({ "name": "Smith, Jane", "college": "Stanford" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Smith, Jane");
    assert_eq!(body["college"], "Stanford");
    assert_eq!(body["detailsEdited"], true);
    assert_eq!(body["edit"], "ALREADY_EDITED");

    let (status, body) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&participant),
            Some(json!({ "name": "Someone Else", "college": "Caltech" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_edited");
}

#[tokio::test]
async fn test_only_registrant_may_edit() {
    let app = TestApp::new().await;
    let organizer = app.organizer("Robotics").await;
    let event_id = app.create_event(&organizer.token, "Robo Race", None).await;
    let (email, owner) = app.participant().await;
    let (_, intruder) = app.participant().await;
    let (_, body) = app.register(&owner, &event_id, &email).await;
    let uri = format!("/api/v1/registrations/{}", body["id"].as_str().unwrap());
    let edit = json!({ "name": "Mallory", "college": "Nowhere" });

    let (status, _) = app
        .call(Method::PATCH, &uri, Some(&intruder), Some(edit.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::PATCH, &uri, Some(&organizer.token), Some(edit))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The failed attempts did not consume the edit.
    let (status, _) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&owner),
            Some(json!({ "name": "Smith, Jane", "college": "MIT" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_registrations_visible_to_owner_and_admin_only() {
    let app = TestApp::new().await;
    let owner = app.organizer("Robotics").await;
    let other = app.organizer("Drama").await;
    let event_id = app.create_event(&owner.token, "Robo Race", Some(10)).await;
    let (email, participant) = app.participant().await;
    app.register(&participant, &event_id, &email).await;
    let uri = format!("/api/v1/events/{}/registrations", event_id);

    let (status, body) = app.call(Method::GET, &uri, Some(&owner.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["maxRegistrations"], 10);
    assert_eq!(body["eventTitle"], "Robo Race");

    let admin = app.admin_token().await;
    let (status, _) = app.call(Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    for token in [other.token, participant] {
        let (status, _) = app.call(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_export_csv() {
    let app = TestApp::new().await;
    let organizer = app.organizer("Robotics").await;
    let event_id = app.create_event(&organizer.token, "Tech Fest 2025", None).await;
    let (email, participant) = app.participant().await;
    app.register(&participant, &event_id, &email).await;

    let response = app
        .send(json_request(
            Method::GET,
            &format!("/api/v1/events/{}/registrations/export", event_id),
            Some(&organizer.token),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Tech_Fest_2025_registrations.csv\""
    );

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("Name,Email,College,ReferenceID,PaymentEvidence")
    );
    assert_eq!(
        lines.next().unwrap(),
        format!(
            "\"Smith, John\",\"{}\",\"MIT\",\"TXN-001\",\"receipt.png\"",
            email
        )
    );
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn test_export_forbidden_for_other_club() {
    let app = TestApp::new().await;
    let owner = app.organizer("Robotics").await;
    let other = app.organizer("Drama").await;
    let event_id = app.create_event(&owner.token, "Robo Race", None).await;

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/api/v1/events/{}/registrations/export", event_id),
            Some(&other.token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
