// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Position ingestion and run finalization over HTTP.

use axum::http::StatusCode;
use run_tracker::models::UserKind;

mod common;
use common::{post_position, send, start_new_run};

#[tokio::test]
async fn test_first_sample_has_zero_metrics() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    let run_id = start_new_run(&app, 1).await;

    let (status, json) =
        post_position(&app, run_id, 37.386_07, -122.083_96, "2024-06-01T07:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["run_id"], run_id);
    assert_eq!(json["speed"], 0.0);
    assert_eq!(json["distance"], 0.0);
    // Coordinates stored with 4 decimals
    assert_eq!(json["latitude"], 37.3861);
    assert_eq!(json["longitude"], -122.084);
}

#[tokio::test]
async fn test_segment_speed_and_cumulative_distance() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    let run_id = start_new_run(&app, 1).await;

    post_position(&app, run_id, 0.0, 0.0, "2024-06-01T07:00:00Z").await;
    let (_, second) = post_position(&app, run_id, 0.0, 0.01, "2024-06-01T07:01:00Z").await;
    let (_, third) = post_position(&app, run_id, 0.0, 0.02, "2024-06-01T07:02:00Z").await;

    // 0.01° of longitude on the equator is ~1113 m
    assert_eq!(second["speed"], 18.55);
    assert_eq!(second["distance"], 1.11);
    assert_eq!(third["speed"], 18.55);
    assert_eq!(third["distance"], 2.22);
}

#[tokio::test]
async fn test_out_of_order_sample_uses_time_predecessor() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    let run_id = start_new_run(&app, 1).await;

    post_position(&app, run_id, 0.0, 0.0, "2024-06-01T07:00:00Z").await;
    post_position(&app, run_id, 0.0, 0.02, "2024-06-01T07:02:00Z").await;
    let (status, late) = post_position(&app, run_id, 0.0, 0.01, "2024-06-01T07:01:00Z").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(late["speed"], 18.55);
    assert_eq!(late["distance"], 1.11);

    // Listing is in time order regardless of arrival order
    let (_, list) = send(&app, "GET", &format!("/api/positions?run={}", run_id), None).await;
    let times: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["date_time"].as_str().unwrap())
        .collect();
    assert_eq!(times.len(), 3);
    assert!(times[0] < times[1] && times[1] < times[2]);
}

#[tokio::test]
async fn test_invalid_samples_rejected() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    let run_id = start_new_run(&app, 1).await;

    let (status, json) = post_position(&app, run_id, 91.0, 0.0, "2024-06-01T07:00:00Z").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let (status, _) = post_position(&app, run_id, 0.0, -180.5, "2024-06-01T07:00:00Z").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_position(&app, run_id, 0.0, 0.0, "not a time").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(state.db.positions_for_run(run_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_summarizes_positions() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    let run_id = start_new_run(&app, 1).await;

    post_position(&app, run_id, 0.0, 0.0, "2024-06-01T07:00:00Z").await;
    post_position(&app, run_id, 0.0, 0.01, "2024-06-01T07:01:00Z").await;
    post_position(&app, run_id, 0.0, 0.02, "2024-06-01T07:02:00Z").await;

    let (status, json) = send(&app, "POST", &format!("/api/runs/{}/stop", run_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "finished");
    assert_eq!(json["run_time_seconds"], 120);
    assert_eq!(json["distance"], 2.22);
    // Mean of 0, 18.55, 18.55
    assert_eq!(json["speed"], 12.37);
}

#[tokio::test]
async fn test_positions_of_missing_run() {
    let (app, _state) = common::create_test_app();
    let (status, _) = send(&app, "GET", "/api/positions?run=12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_samples_keep_cumulative_distance_consistent() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    let run_id = start_new_run(&app, 1).await;
    post_position(&app, run_id, 0.0, 0.0, "2024-06-01T07:00:00Z").await;

    let base = common::parse_time("2024-06-01T07:00:00Z");
    let mut handles = Vec::new();
    for i in 1..=20i64 {
        let app = app.clone();
        let at = (base + chrono::Duration::seconds(60 * i)).to_rfc3339();
        handles.push(tokio::spawn(async move {
            post_position(&app, run_id, 0.0, 0.01 * i as f64, &at).await.0
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
    }

    let positions = state.db.positions_for_run(run_id).await.unwrap();
    assert_eq!(positions.len(), 21);

    // Whatever the arrival order, every sample sits on the chain of its
    // time predecessors: cumulative distance tracks the along-track distance
    // and never decreases in time order.
    for pair in positions.windows(2) {
        assert!(pair[1].distance >= pair[0].distance, "{:?}", pair);
    }
    for (i, p) in positions.iter().enumerate() {
        let expected = 1.113_195 * i as f64;
        assert!(
            (p.distance - expected).abs() <= 0.11,
            "sample {} distance {} expected ~{}",
            i,
            p.distance,
            expected
        );
    }
}

#[tokio::test]
async fn test_mistyped_body_is_validation_error() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    let run_id = start_new_run(&app, 1).await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/positions",
        Some(serde_json::json!({
            "run": run_id,
            "latitude": "north",
            "longitude": 0.0,
            "date_time": "2024-06-01T07:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["details"].as_str().is_some_and(|d| !d.is_empty()));

    // Missing fields too
    let (status, json) = send(
        &app,
        "POST",
        "/api/positions",
        Some(serde_json::json!({ "run": run_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let (status, json) = send(&app, "GET", "/api/positions?run=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    assert!(state.db.positions_for_run(run_id).await.unwrap().is_empty());
}
