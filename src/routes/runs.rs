// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run routes: CRUD plus the start/stop lifecycle actions.

use crate::db::RunFilter;
use crate::error::{AppError, Result};
use crate::models::{Run, RunStatus};
use crate::services::runs::{PageRequest, RunOrdering, RunQuery};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_PAGE_SIZE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/runs", get(list_runs).post(create_run))
        .route("/api/runs/{run_id}", get(get_run).delete(delete_run))
        .route("/api/runs/{run_id}/start", post(start_run))
        .route("/api/runs/{run_id}/stop", post(stop_run))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct CreateRunRequest {
    /// Owning athlete ID
    athlete: u64,
    #[serde(default)]
    #[validate(length(max = 10000))]
    comment: String,
}

async fn create_run(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateRunRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Run>)> {
    let Json(body) = payload?;
    body.validate()?;
    let run = state
        .run_service
        .create_run(body.athlete, body.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(run)))
}

// ─── List ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RunsQuery {
    /// Filter by athlete ID
    athlete: Option<u64>,
    /// Filter by status (init, in_progress, finished)
    status: Option<String>,
    /// `created_at` (default) or `-created_at`
    ordering: Option<String>,
    /// Pagination: page number (1-indexed); requires `size`
    page: Option<u32>,
    /// Pagination: items per page
    size: Option<u32>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunsResponse {
    /// Total runs matching the filters
    pub count: u32,
    pub results: Vec<Run>,
}

fn parse_runs_query(params: RunsQuery) -> Result<RunQuery> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<RunStatus>)
        .transpose()
        .map_err(AppError::Validation)?;

    let ordering = match params.ordering.as_deref() {
        None | Some("created_at") => RunOrdering::CreatedAtAsc,
        Some("-created_at") => RunOrdering::CreatedAtDesc,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Invalid 'ordering' parameter: {}",
                other
            )))
        }
    };

    let page = match (params.page, params.size) {
        (_, None) => None,
        (_, Some(0)) => {
            return Err(AppError::Validation(
                "Page size must be greater than 0".to_string(),
            ))
        }
        (Some(0), _) => {
            return Err(AppError::Validation(
                "Page must be greater than 0".to_string(),
            ))
        }
        (page, Some(size)) => Some(PageRequest {
            page: page.unwrap_or(1),
            size: size.min(MAX_PAGE_SIZE),
        }),
    };

    Ok(RunQuery {
        filter: RunFilter {
            athlete_id: params.athlete,
            status,
        },
        ordering,
        page,
    })
}

async fn list_runs(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<RunsQuery>, QueryRejection>,
) -> Result<Json<RunsResponse>> {
    let Query(params) = query?;
    let query = parse_runs_query(params)?;
    tracing::debug!(?query, "Listing runs");

    let page = state.run_service.list_runs(&query).await?;
    Ok(Json(RunsResponse {
        count: page.total as u32,
        results: page.runs,
    }))
}

// ─── Single Run ──────────────────────────────────────────────

async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<u64>,
) -> Result<Json<Run>> {
    Ok(Json(state.run_service.get_run(run_id).await?))
}

async fn delete_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<u64>,
) -> Result<StatusCode> {
    state.run_service.delete_run(run_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Lifecycle ───────────────────────────────────────────────

async fn start_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<u64>,
) -> Result<Json<Run>> {
    Ok(Json(state.run_service.start_run(run_id).await?))
}

async fn stop_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<u64>,
) -> Result<Json<Run>> {
    let outcome = state.run_service.stop_run(run_id).await?;
    if !outcome.badges.is_empty() {
        tracing::debug!(
            run_id,
            badges = ?outcome.badges,
            "Stop awarded challenges"
        );
    }
    Ok(Json(outcome.run))
}
