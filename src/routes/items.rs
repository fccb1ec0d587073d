// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collectible item catalog routes.

use crate::error::{AppError, Result};
use crate::models::CollectibleItem;
use crate::services::geodesic::round_to;
use crate::services::tracking::COORDINATE_DECIMALS;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/collectible_items", get(list_items).post(create_item))
}

async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<Vec<CollectibleItem>>> {
    Ok(Json(state.db.list_items().await?))
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CollectibleItem>, JsonRejection>,
) -> Result<(StatusCode, Json<CollectibleItem>)> {
    let Json(mut item) = payload?;
    item.validate()?;
    item.latitude = round_to(item.latitude, COORDINATE_DECIMALS);
    item.longitude = round_to(item.longitude, COORDINATE_DECIMALS);

    if !state.db.insert_item(&item).await? {
        return Err(AppError::Conflict(format!(
            "Item with uid '{}' already exists",
            item.uid
        )));
    }

    tracing::info!(uid = %item.uid, name = %item.name, "Collectible item created");
    Ok((StatusCode::CREATED, Json(item)))
}
