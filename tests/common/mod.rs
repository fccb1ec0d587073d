// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DateTime, Utc};
use run_tracker::config::Config;
use run_tracker::db::{Database, FirestoreDb};
use run_tracker::models::{User, UserKind};
use run_tracker::routes::create_router;
use run_tracker::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::default(), Database::in_memory()));
    (create_router(state.clone()), state)
}

/// Parse an RFC3339 timestamp in tests.
#[allow(dead_code)]
pub fn parse_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid RFC3339 timestamp")
        .with_timezone(&Utc)
}

/// Insert a user directly into storage.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, id: u64, kind: UserKind) -> User {
    let user = User {
        id,
        username: format!("user{}", id),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        kind,
        date_joined: Utc::now(),
    };
    state.db.upsert_user(&user).await.unwrap();
    user
}

/// Send a request and return the status plus the JSON body (`Null` if empty).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Create a run for `athlete_id` over HTTP and return its ID.
#[allow(dead_code)]
pub async fn create_run(app: &axum::Router, athlete_id: u64) -> u64 {
    let (status, json) = send(
        app,
        "POST",
        "/api/runs",
        Some(serde_json::json!({ "athlete": athlete_id, "comment": "test run" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create run failed: {}", json);
    json["id"].as_u64().unwrap()
}

/// Create and start a run, returning its ID.
#[allow(dead_code)]
pub async fn start_new_run(app: &axum::Router, athlete_id: u64) -> u64 {
    let run_id = create_run(app, athlete_id).await;
    let (status, json) = send(app, "POST", &format!("/api/runs/{}/start", run_id), None).await;
    assert_eq!(status, StatusCode::OK, "start failed: {}", json);
    run_id
}

/// Post one position sample.
#[allow(dead_code)]
pub async fn post_position(
    app: &axum::Router,
    run_id: u64,
    latitude: f64,
    longitude: f64,
    date_time: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "POST",
        "/api/positions",
        Some(serde_json::json!({
            "run": run_id,
            "latitude": latitude,
            "longitude": longitude,
            "date_time": date_time,
        })),
    )
    .await
}
