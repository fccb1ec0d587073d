// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge badges, collectible items and user projections.

use axum::http::StatusCode;
use run_tracker::models::UserKind;

mod common;
use common::{post_position, send, start_new_run};

async fn finish_run(app: &axum::Router, run_id: u64) -> serde_json::Value {
    let (status, json) = send(app, "POST", &format!("/api/runs/{}/stop", run_id), None).await;
    assert_eq!(status, StatusCode::OK, "stop failed: {}", json);
    json
}

/// Run three samples along the equator covering 2.22 km in `total_secs`.
async fn fast_run(app: &axum::Router, athlete_id: u64, total_secs: i64) -> serde_json::Value {
    let run_id = start_new_run(app, athlete_id).await;
    let base = common::parse_time("2024-06-01T07:00:00Z");
    for (i, lon) in [0.0, 0.01, 0.02].into_iter().enumerate() {
        let at = base + chrono::Duration::seconds(total_secs * i as i64 / 2);
        let (status, _) = post_position(app, run_id, 0.0, lon, &at.to_rfc3339()).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    finish_run(app, run_id).await
}

async fn badge_names(app: &axum::Router, athlete_id: u64) -> Vec<String> {
    let (status, json) = send(
        app,
        "GET",
        &format!("/api/challenges?athlete={}", athlete_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json.as_array()
        .unwrap()
        .iter()
        .map(|c| c["full_name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_ten_runs_badge_awarded_once() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;

    for n in 1..=11 {
        let run_id = start_new_run(&app, 1).await;
        finish_run(&app, run_id).await;

        let badges = badge_names(&app, 1).await;
        if n < 10 {
            assert!(badges.is_empty(), "no badge after {} runs", n);
        } else {
            assert_eq!(badges, vec!["Make 10 runs".to_string()], "after {} runs", n);
        }
    }
}

#[tokio::test]
async fn test_two_km_in_ten_minutes() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    common::seed_user(&state, 2, UserKind::Athlete).await;

    let run = fast_run(&app, 1, 550).await;
    assert_eq!(run["run_time_seconds"], 550);
    assert_eq!(run["distance"], 2.22);
    assert_eq!(badge_names(&app, 1).await, vec!["2 km in 10 minutes"]);

    let run = fast_run(&app, 2, 650).await;
    assert_eq!(run["run_time_seconds"], 650);
    assert!(badge_names(&app, 2).await.is_empty());

    // A second qualifying run does not duplicate the badge
    fast_run(&app, 1, 500).await;
    assert_eq!(badge_names(&app, 1).await.len(), 1);
}

#[tokio::test]
async fn test_challenges_listed_per_athlete() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    common::seed_user(&state, 2, UserKind::Athlete).await;
    fast_run(&app, 1, 300).await;

    let (_, all) = send(&app, "GET", "/api/challenges", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["athlete_id"], 1);
    assert!(badge_names(&app, 2).await.is_empty());
}

// ─── Collectible Items ───────────────────────────────────────

fn item_json(uid: &str, latitude: f64, longitude: f64) -> serde_json::Value {
    serde_json::json!({
        "uid": uid,
        "name": "Golden Acorn",
        "latitude": latitude,
        "longitude": longitude,
        "picture": "https://example.com/acorn.png",
        "value": 10,
    })
}

#[tokio::test]
async fn test_create_item_rejects_duplicates_and_invalid() {
    let (app, _state) = common::create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/collectible_items",
        Some(item_json("acorn-1", 0.0, 0.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["uid"], "acorn-1");

    let (status, json) = send(
        &app,
        "POST",
        "/api/collectible_items",
        Some(item_json("acorn-1", 1.0, 1.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");

    let (status, _) = send(
        &app,
        "POST",
        "/api/collectible_items",
        Some(item_json("acorn-2", 95.0, 0.0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(&app, "GET", "/api/collectible_items", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_items_collected_within_range_once() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;
    send(
        &app,
        "POST",
        "/api/collectible_items",
        Some(item_json("acorn-1", 0.0, 0.0)),
    )
    .await;

    let run_id = start_new_run(&app, 1).await;

    // ~100.2 m away: out of range
    post_position(&app, run_id, 0.0, 0.0009, "2024-06-01T07:00:00Z").await;
    let (_, user) = send(&app, "GET", "/api/users/1", None).await;
    assert!(user["items"].as_array().unwrap().is_empty());

    // ~89 m away: collected
    post_position(&app, run_id, 0.0, 0.0008, "2024-06-01T07:00:30Z").await;
    post_position(&app, run_id, 0.0, 0.0001, "2024-06-01T07:01:00Z").await;

    let (status, user) = send(&app, "GET", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = user["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["uid"], "acorn-1");
}

// ─── Users ───────────────────────────────────────────────────

#[tokio::test]
async fn test_user_projections() {
    let (app, _state) = common::create_test_app();

    let (status, athlete) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({
            "username": "runner",
            "first_name": "Rue",
            "last_name": "Ner",
            "type": "athlete",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let athlete_id = athlete["id"].as_u64().unwrap();

    let (_, coach) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({ "username": "coach", "type": "coach" })),
    )
    .await;
    let coach_id = coach["id"].as_u64().unwrap();

    let run_id = start_new_run(&app, athlete_id).await;
    finish_run(&app, run_id).await;

    let (_, athletes) = send(&app, "GET", "/api/users?type=athlete", None).await;
    let athletes = athletes.as_array().unwrap();
    assert_eq!(athletes.len(), 1);
    assert_eq!(athletes[0]["runs_finished"], 1);
    assert_eq!(athletes[0]["type"], "athlete");

    let (_, detail) = send(&app, "GET", &format!("/api/users/{}", coach_id), None).await;
    assert_eq!(detail["type"], "coach");
    assert_eq!(detail["runs_finished"], 0);
    assert!(detail.get("items").is_none());

    let (status, _) = send(&app, "GET", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({ "username": "", "type": "athlete" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Two samples along the equator, an hour apart.
async fn long_run(app: &axum::Router, athlete_id: u64, degrees: f64) -> serde_json::Value {
    let run_id = start_new_run(app, athlete_id).await;
    post_position(app, run_id, 0.0, 0.0, "2024-06-01T07:00:00Z").await;
    post_position(app, run_id, 0.0, degrees, "2024-06-01T08:00:00Z").await;
    finish_run(app, run_id).await
}

#[tokio::test]
async fn test_fifty_kilometers_summed_across_runs() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;

    // 0.25 degrees of longitude on the equator is ~27.83 km
    let run = long_run(&app, 1, 0.25).await;
    assert_eq!(run["distance"], 27.83);
    assert!(badge_names(&app, 1).await.is_empty());

    long_run(&app, 1, 0.25).await;
    assert_eq!(badge_names(&app, 1).await, vec!["Run 50 kilometers"]);

    long_run(&app, 1, 0.25).await;
    assert_eq!(badge_names(&app, 1).await.len(), 1);
}

#[tokio::test]
async fn test_tenth_run_badge_survives_concurrent_finishes() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;

    for _ in 0..9 {
        let run_id = start_new_run(&app, 1).await;
        finish_run(&app, run_id).await;
    }

    // The tenth and eleventh land together; one of them must see exactly ten.
    let tenth = start_new_run(&app, 1).await;
    let eleventh = start_new_run(&app, 1).await;
    let handles: Vec<_> = [tenth, eleventh]
        .into_iter()
        .map(|run_id| {
            let app = app.clone();
            tokio::spawn(async move {
                send(&app, "POST", &format!("/api/runs/{}/stop", run_id), None)
                    .await
                    .0
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(badge_names(&app, 1).await, vec!["Make 10 runs"]);
}

// ─── Athlete Info ────────────────────────────────────────────

#[tokio::test]
async fn test_athlete_info_created_on_first_read() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;

    let (status, json) = send(&app, "GET", "/api/athlete_info/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user_id"], 1);
    assert!(json["weight"].is_null());
    assert!(json["goals"].is_null());

    let (status, _) = send(&app, "GET", "/api/athlete_info/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_athlete_info_weight_bounds() {
    let (app, state) = common::create_test_app();
    common::seed_user(&state, 1, UserKind::Athlete).await;

    for weight in [serde_json::json!(0), serde_json::json!(900), serde_json::json!(-5)] {
        let (status, json) = send(
            &app,
            "PUT",
            "/api/athlete_info/1",
            Some(serde_json::json!({ "weight": weight, "goals": "marathon" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "weight {}", weight);
        assert_eq!(json["error"], "validation_error");
    }

    let (status, _) = send(
        &app,
        "PUT",
        "/api/athlete_info/1",
        Some(serde_json::json!({ "goals": "marathon" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Rejected writes stored nothing
    let (_, json) = send(&app, "GET", "/api/athlete_info/1", None).await;
    assert!(json["weight"].is_null());

    let (status, json) = send(
        &app,
        "PUT",
        "/api/athlete_info/1",
        Some(serde_json::json!({ "weight": 70, "goals": "marathon" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["weight"], 70);

    let (status, json) = send(
        &app,
        "PUT",
        "/api/athlete_info/1",
        Some(serde_json::json!({ "weight": 899 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stored) = send(&app, "GET", "/api/athlete_info/1", None).await;
    assert_eq!(stored, json);
    assert_eq!(stored["weight"], 899);
    assert!(stored["goals"].is_null());

    let (status, _) = send(
        &app,
        "PUT",
        "/api/athlete_info/404",
        Some(serde_json::json!({ "weight": 70 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
