// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Position ingestion: per-segment speed and cumulative distance.
//!
//! Each new sample is placed by its own timestamp. Its metrics are computed
//! against the stored sample of the same run with the latest timestamp
//! strictly before it, regardless of the order samples arrived in.

use crate::error::{AppError, Result};
use crate::models::{Position, PositionSample};
use crate::services::geodesic::{distance_km, round_to};
use crate::time_utils::elapsed_seconds;
use chrono::{DateTime, Utc};
use validator::Validate;

/// Decimal places kept for stored coordinates.
pub const COORDINATE_DECIMALS: i32 = 4;
/// Decimal places kept for stored speed and distance.
pub const METRIC_DECIMALS: i32 = 2;

/// Derived values for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentMetrics {
    /// Meters per second over the segment from the predecessor
    pub speed: f64,
    /// Cumulative kilometers since the first sample
    pub distance: f64,
}

/// Validate a raw sample and round its coordinates for storage.
pub fn normalize_sample(sample: &PositionSample) -> Result<(f64, f64)> {
    if !sample.latitude.is_finite() || !sample.longitude.is_finite() {
        return Err(AppError::Validation(
            "latitude and longitude must be finite numbers".to_string(),
        ));
    }
    sample.validate()?;

    Ok((
        round_to(sample.latitude, COORDINATE_DECIMALS),
        round_to(sample.longitude, COORDINATE_DECIMALS),
    ))
}

/// The stored sample immediately preceding `at` in time.
pub fn find_predecessor(positions: &[Position], at: DateTime<Utc>) -> Option<&Position> {
    positions
        .iter()
        .filter(|p| p.date_time < at)
        .max_by_key(|p| p.date_time)
}

/// Compute speed and cumulative distance for a sample at (`latitude`, `longitude`, `at`).
pub fn segment_metrics(
    predecessor: Option<&Position>,
    latitude: f64,
    longitude: f64,
    at: DateTime<Utc>,
) -> SegmentMetrics {
    let Some(prev) = predecessor else {
        return SegmentMetrics {
            speed: 0.0,
            distance: 0.0,
        };
    };

    let segment_km = distance_km((prev.latitude, prev.longitude), (latitude, longitude));
    let elapsed = elapsed_seconds(prev.date_time, at);
    let speed = if elapsed > 0.0 {
        segment_km * 1000.0 / elapsed
    } else {
        0.0
    };

    SegmentMetrics {
        speed: round_to(speed, METRIC_DECIMALS),
        distance: round_to(prev.distance + segment_km, METRIC_DECIMALS),
    }
}

/// Build the position record for a new sample given the run's stored samples.
pub fn build_position(
    id: u64,
    run_id: u64,
    sample: &PositionSample,
    existing: &[Position],
) -> Result<Position> {
    let (latitude, longitude) = normalize_sample(sample)?;
    let predecessor = find_predecessor(existing, sample.date_time);
    let metrics = segment_metrics(predecessor, latitude, longitude, sample.date_time);

    Ok(Position {
        id,
        run_id,
        latitude,
        longitude,
        date_time: sample.date_time,
        speed: metrics.speed,
        distance: metrics.distance,
    })
}
