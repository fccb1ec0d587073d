// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collectible item catalog loading and proximity detection.

use crate::models::CollectibleItem;
use crate::services::geodesic::{distance_meters, round_to};
use crate::services::tracking::COORDINATE_DECIMALS;
use geojson::GeoJson;
use std::fs;
use std::path::Path;
use validator::Validate;

/// Athletes collect items within this many meters of a recorded position.
pub const COLLECT_RADIUS_METERS: f64 = 100.0;

/// Items within [`COLLECT_RADIUS_METERS`] of (`latitude`, `longitude`).
///
/// Linear scan over the catalog; fine for the small catalogs we ship.
pub fn items_in_range(
    items: &[CollectibleItem],
    latitude: f64,
    longitude: f64,
) -> Vec<&CollectibleItem> {
    items
        .iter()
        .filter(|item| {
            distance_meters((latitude, longitude), (item.latitude, item.longitude))
                <= COLLECT_RADIUS_METERS
        })
        .collect()
}

/// Parsed collectible items read from a GeoJSON FeatureCollection of Points.
#[derive(Default, Clone, Debug)]
pub struct ItemCatalog {
    items: Vec<CollectibleItem>,
}

impl ItemCatalog {
    /// Load items from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load items from a GeoJSON string.
    ///
    /// Each feature needs `name` and `uid` properties; `value` defaults to 0
    /// and `picture` to an empty string (which then fails URL validation, so
    /// such a feature is skipped).
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| CatalogError::ParseError(e.to_string()))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(CatalogError::ParseError(
                "expected a FeatureCollection".to_string(),
            ));
        };

        let mut items: Vec<CollectibleItem> = Vec::new();

        for feature in collection.features {
            let text = |key: &str| {
                feature
                    .property(key)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            let uid = text("uid");
            let name = text("name");
            let picture = text("picture");
            let value = feature
                .property("value")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);

            let Some(geometry) = feature.geometry.as_ref() else {
                tracing::warn!(uid = %uid, "Skipping item without geometry");
                continue;
            };
            let geojson::Value::Point(coords) = &geometry.value else {
                return Err(CatalogError::UnsupportedGeometry);
            };
            if coords.len() < 2 {
                return Err(CatalogError::UnsupportedGeometry);
            }

            let item = CollectibleItem {
                uid,
                name,
                latitude: round_to(coords[1], COORDINATE_DECIMALS),
                longitude: round_to(coords[0], COORDINATE_DECIMALS),
                picture,
                value,
            };

            if let Err(e) = item.validate() {
                tracing::warn!(uid = %item.uid, error = %e, "Skipping invalid item");
                continue;
            }
            if items.iter().any(|existing| existing.uid == item.uid) {
                tracing::warn!(uid = %item.uid, "Skipping duplicate item uid");
                continue;
            }

            items.push(item);
        }

        tracing::info!(count = items.len(), "Loaded collectible items");
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CollectibleItem] {
        &self.items
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Unsupported geometry type (expected Point)")]
    UnsupportedGeometry,
}
