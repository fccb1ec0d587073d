// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use run_tracker::error::AppError;
use run_tracker::models::PositionSample;
use validator::Validate;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_client_errors_include_details() {
    let (status, json) = render(AppError::InvalidState("run is finished".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_state");
    assert_eq!(json["details"], "run is finished");

    let (status, json) = render(AppError::NotFound("Run 5 not found".to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    let (status, json) = render(AppError::Conflict("uid taken".to_string())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let (status, json) = render(AppError::Database("connection reset".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());

    let (status, json) = render(AppError::Internal(anyhow::anyhow!("boom"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "internal_error");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_validation_errors_convert() {
    let sample = PositionSample {
        latitude: 120.0,
        longitude: 0.0,
        date_time: chrono::Utc::now(),
    };
    let err: AppError = sample.validate().unwrap_err().into();
    assert!(matches!(err, AppError::Validation(_)));

    let (status, json) = render(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["details"].as_str().unwrap().contains("latitude"));
}
