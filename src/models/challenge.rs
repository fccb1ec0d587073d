// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Awarded challenge badges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A badge held by an athlete. At most one per (athlete_id, full_name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Challenge {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub athlete_id: u64,
    /// Badge name, e.g. "Make 10 runs"
    pub full_name: String,
    pub awarded_at: DateTime<Utc>,
}

impl Challenge {
    /// Storage key; the uniqueness constraint for awards.
    pub fn document_id(athlete_id: u64, full_name: &str) -> String {
        format!("{}_{}", athlete_id, urlencoding::encode(full_name))
    }
}
