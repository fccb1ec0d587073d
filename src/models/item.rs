// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Collectible items placed on the map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// A fixed point of interest that athletes collect by running near it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CollectibleItem {
    /// Unique identifier (also used as document ID)
    #[validate(length(min = 1, max = 100))]
    pub uid: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(url)]
    pub picture: String,
    pub value: i64,
}

/// Join record: an athlete has collected an item.
///
/// Keyed by (item uid, athlete) so the same pair is stored once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCollection {
    pub athlete_id: u64,
    /// Item snapshot at collection time
    pub item: CollectibleItem,
    pub collected_at: DateTime<Utc>,
}

impl ItemCollection {
    pub fn document_id(item_uid: &str, athlete_id: u64) -> String {
        format!("{}_{}", urlencoding::encode(item_uid), athlete_id)
    }
}
