// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run finalization: aggregate stored position metrics into a run summary.
//!
//! Only reads the speed and cumulative distance computed at ingest time;
//! no geodesic is recomputed here.

use crate::models::{Position, RunSummary};
use crate::services::geodesic::round_to;
use crate::services::tracking::METRIC_DECIMALS;
use crate::time_utils::elapsed_seconds;

/// Summarize a run from its positions (any order).
///
/// Fewer than two samples, or no positive elapsed time between the first
/// and last sample, yields an all-zero summary.
pub fn summarize(positions: &[Position]) -> RunSummary {
    if positions.len() < 2 {
        return RunSummary::default();
    }

    let mut ordered: Vec<&Position> = positions.iter().collect();
    ordered.sort_by_key(|p| p.date_time);

    let (first, last) = match (ordered.first(), ordered.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return RunSummary::default(),
    };

    let elapsed = elapsed_seconds(first.date_time, last.date_time).floor();
    if elapsed <= 0.0 {
        return RunSummary::default();
    }

    let mean_speed = ordered.iter().map(|p| p.speed).sum::<f64>() / ordered.len() as f64;

    RunSummary {
        run_time_seconds: elapsed as u64,
        distance: round_to(last.distance, METRIC_DECIMALS),
        speed: if mean_speed.is_finite() {
            round_to(mean_speed, METRIC_DECIMALS)
        } else {
            0.0
        },
    }
}
