// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GPS position samples recorded during a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Stored position sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Position {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Parent run
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub run_id: u64,
    /// Degrees, 4 decimal places
    pub latitude: f64,
    /// Degrees, 4 decimal places
    pub longitude: f64,
    pub date_time: DateTime<Utc>,
    /// Speed over the segment from the previous sample (m/s)
    pub speed: f64,
    /// Cumulative distance since the first sample (km)
    pub distance: f64,
}

/// A raw sample as submitted by the athlete's client.
#[derive(Debug, Clone, Validate)]
pub struct PositionSample {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub date_time: DateTime<Utc>,
}
