// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use crate::error::Result;
use crate::models::Challenge;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/challenges", get(list_challenges))
}

#[derive(Deserialize)]
struct ChallengesQuery {
    athlete: Option<u64>,
}

/// List awarded badges, optionally for one athlete.
async fn list_challenges(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ChallengesQuery>, QueryRejection>,
) -> Result<Json<Vec<Challenge>>> {
    let Query(params) = query?;
    Ok(Json(state.db.list_challenges(params.athlete).await?))
}
