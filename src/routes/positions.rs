// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Position ingestion and listing.

use crate::error::{AppError, Result};
use crate::models::{Position, PositionSample};
use crate::time_utils::parse_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/positions", get(list_positions).post(create_position))
}

#[derive(Deserialize)]
struct CreatePositionRequest {
    /// Run ID
    run: u64,
    latitude: f64,
    longitude: f64,
    /// RFC 3339 timestamp; offsets are converted to UTC
    date_time: String,
}

impl CreatePositionRequest {
    fn into_sample(self) -> Result<(u64, PositionSample)> {
        let date_time = parse_utc_rfc3339(&self.date_time).ok_or_else(|| {
            AppError::Validation(format!("Invalid date_time: {}", self.date_time))
        })?;
        Ok((
            self.run,
            PositionSample {
                latitude: self.latitude,
                longitude: self.longitude,
                date_time,
            },
        ))
    }
}

async fn create_position(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreatePositionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Position>)> {
    let Json(body) = payload?;
    let (run_id, sample) = body.into_sample()?;
    let position = state.run_service.record_position(run_id, sample).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

#[derive(Deserialize)]
struct PositionsQuery {
    run: u64,
}

async fn list_positions(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<PositionsQuery>, QueryRejection>,
) -> Result<Json<Vec<Position>>> {
    let Query(params) = query?;
    Ok(Json(state.run_service.positions(params.run).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_sample_converts_offset_to_utc() {
        let req = CreatePositionRequest {
            run: 9,
            latitude: 10.0,
            longitude: 20.0,
            date_time: "2024-03-01T12:00:00+02:00".to_string(),
        };
        let (run_id, sample) = req.into_sample().unwrap();
        assert_eq!(run_id, 9);
        assert_eq!(
            sample.date_time.to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
    }

    #[test]
    fn test_into_sample_rejects_bad_timestamp() {
        let req = CreatePositionRequest {
            run: 9,
            latitude: 10.0,
            longitude: 20.0,
            date_time: "yesterday".to_string(),
        };
        assert!(matches!(req.into_sample(), Err(AppError::Validation(_))));
    }
}
