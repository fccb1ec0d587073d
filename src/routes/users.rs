// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User registration, role-dependent projections and athlete profiles.

use crate::db::{new_id, RunFilter};
use crate::error::{AppError, Result};
use crate::models::user::{detail_view, summary_view, UserDetail, UserSummary};
use crate::models::{AthleteInfo, RunStatus, User, UserKind};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{user_id}", get(get_user))
        .route(
            "/api/athlete_info/{user_id}",
            get(get_athlete_info).put(put_athlete_info),
        )
}

#[derive(Deserialize, Validate)]
struct CreateUserRequest {
    #[validate(length(min = 1, max = 150))]
    username: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    last_name: String,
    #[serde(rename = "type")]
    kind: UserKind,
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserSummary>)> {
    let Json(body) = payload?;
    body.validate()?;

    let user = User {
        id: new_id()?,
        username: body.username,
        first_name: body.first_name,
        last_name: body.last_name,
        kind: body.kind,
        date_joined: chrono::Utc::now(),
    };
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = user.id, kind = ?user.kind, "User registered");
    Ok((StatusCode::CREATED, Json(summary_view(&user, 0))))
}

#[derive(Deserialize)]
struct UsersQuery {
    #[serde(rename = "type")]
    kind: Option<UserKind>,
}

/// Finished-run counts keyed by athlete, from a single query.
async fn finished_run_counts(state: &AppState) -> Result<HashMap<u64, u32>> {
    let finished = state
        .db
        .list_runs(&RunFilter {
            athlete_id: None,
            status: Some(RunStatus::Finished),
        })
        .await?;

    let mut counts = HashMap::new();
    for run in finished {
        *counts.entry(run.athlete_id).or_insert(0) += 1;
    }
    Ok(counts)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<UsersQuery>, QueryRejection>,
) -> Result<Json<Vec<UserSummary>>> {
    let Query(params) = query?;
    let counts = finished_run_counts(&state).await?;
    let users = state
        .db
        .list_users()
        .await?
        .into_iter()
        .filter(|u| params.kind.is_none_or(|kind| u.kind == kind))
        .map(|u| summary_view(&u, counts.get(&u.id).copied().unwrap_or(0)))
        .collect();

    Ok(Json(users))
}

async fn require_user(state: &AppState, user_id: u64) -> Result<User> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<UserDetail>> {
    let user = require_user(&state, user_id).await?;

    let runs_finished = state
        .db
        .list_runs(&RunFilter {
            athlete_id: Some(user_id),
            status: Some(RunStatus::Finished),
        })
        .await?
        .len() as u32;

    let items = match user.kind {
        UserKind::Athlete => state
            .db
            .collections_for_athlete(user_id)
            .await?
            .into_iter()
            .map(|c| c.item)
            .collect(),
        UserKind::Coach => Vec::new(),
    };

    Ok(Json(detail_view(&user, runs_finished, items)))
}

// ─── Athlete Info ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct AthleteInfoRequest {
    /// Kilograms, strictly between 0 and 900
    #[validate(range(min = 1, max = 899))]
    weight: u32,
    #[serde(default)]
    goals: Option<String>,
}

async fn get_athlete_info(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<AthleteInfo>> {
    require_user(&state, user_id).await?;
    Ok(Json(state.db.get_or_create_athlete_info(user_id).await?))
}

async fn put_athlete_info(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
    payload: std::result::Result<Json<AthleteInfoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AthleteInfo>)> {
    require_user(&state, user_id).await?;
    let Json(body) = payload?;
    body.validate()?;

    let info = AthleteInfo {
        user_id,
        weight: Some(body.weight),
        goals: body.goals,
    };
    state.db.upsert_athlete_info(&info).await?;

    tracing::info!(user_id, weight = body.weight, "Athlete info updated");
    Ok((StatusCode::CREATED, Json(info)))
}
