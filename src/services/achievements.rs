// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge badges awarded after a run is finished.

use crate::db::{Database, RunFilter};
use crate::error::Result;
use crate::models::{Challenge, Run, RunStatus};

/// Finished-run count that earns [`Badge::TenRuns`] (exact match).
const TEN_RUNS_COUNT: usize = 10;
/// Lifetime kilometers that earn [`Badge::FiftyKilometers`].
const FIFTY_KM_TOTAL: f64 = 50.0;
/// Minimum distance (km) and maximum time (s) for [`Badge::TwoKmInTenMinutes`].
const FAST_RUN_DISTANCE_KM: f64 = 2.0;
const FAST_RUN_MAX_SECONDS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    TenRuns,
    FiftyKilometers,
    TwoKmInTenMinutes,
}

impl Badge {
    pub fn full_name(&self) -> &'static str {
        match self {
            Badge::TenRuns => "Make 10 runs",
            Badge::FiftyKilometers => "Run 50 kilometers",
            Badge::TwoKmInTenMinutes => "2 km in 10 minutes",
        }
    }
}

/// Aggregate over an athlete's finished runs, including the one just finished.
#[derive(Debug, Clone, Copy, Default)]
pub struct AthleteHistory {
    pub finished_runs: usize,
    pub total_distance: f64,
}

impl AthleteHistory {
    pub fn from_runs(runs: &[Run]) -> Self {
        runs.iter()
            .filter(|r| r.status == RunStatus::Finished)
            .fold(Self::default(), |acc, r| Self {
                finished_runs: acc.finished_runs + 1,
                total_distance: acc.total_distance + r.distance,
            })
    }
}

/// Badges the athlete qualifies for after finishing `run`.
///
/// Already-held badges are not filtered out; awarding is idempotent.
pub fn earned_badges(history: &AthleteHistory, run: &Run) -> Vec<Badge> {
    let mut badges = Vec::new();

    // Fires only on the run that brings the count to ten.
    if history.finished_runs == TEN_RUNS_COUNT {
        badges.push(Badge::TenRuns);
    }

    if history.total_distance >= FIFTY_KM_TOTAL {
        badges.push(Badge::FiftyKilometers);
    }

    let fast = run.distance >= FAST_RUN_DISTANCE_KM
        && run
            .run_time_seconds
            .is_some_and(|secs| secs <= FAST_RUN_MAX_SECONDS);
    if fast {
        badges.push(Badge::TwoKmInTenMinutes);
    }

    badges
}

/// Evaluate and persist badges for a finished run.
///
/// Never fails: storage errors are logged and the affected badge is skipped,
/// since the run itself is already finished. Returns newly awarded badges.
pub async fn award_for_run(db: &Database, run: &Run) -> Vec<Badge> {
    let history = match load_history(db, run.athlete_id).await {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(
                run_id = run.id,
                athlete_id = run.athlete_id,
                error = %e,
                "Failed to load run history, skipping badge evaluation"
            );
            return Vec::new();
        }
    };

    let mut awarded = Vec::new();
    for badge in earned_badges(&history, run) {
        let challenge = Challenge {
            athlete_id: run.athlete_id,
            full_name: badge.full_name().to_string(),
            awarded_at: chrono::Utc::now(),
        };

        match db.award_challenge(&challenge).await {
            Ok(true) => {
                tracing::info!(
                    athlete_id = run.athlete_id,
                    run_id = run.id,
                    badge = badge.full_name(),
                    "Challenge awarded"
                );
                awarded.push(badge);
            }
            Ok(false) => {
                tracing::debug!(
                    athlete_id = run.athlete_id,
                    badge = badge.full_name(),
                    "Challenge already held (idempotent skip)"
                );
            }
            Err(e) => {
                tracing::warn!(
                    athlete_id = run.athlete_id,
                    badge = badge.full_name(),
                    error = %e,
                    "Failed to award challenge"
                );
            }
        }
    }

    awarded
}

async fn load_history(db: &Database, athlete_id: u64) -> Result<AthleteHistory> {
    let runs = db
        .list_runs(&RunFilter {
            athlete_id: Some(athlete_id),
            status: Some(RunStatus::Finished),
        })
        .await?;
    Ok(AthleteHistory::from_runs(&runs))
}
