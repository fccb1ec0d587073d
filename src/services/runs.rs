// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run service.
//!
//! Orchestrates the run pipeline:
//! 1. Create a run (`init`) and start it (`in_progress`)
//! 2. Ingest position samples, computing segment metrics against the
//!    time-ordered predecessor, then collect nearby items
//! 3. Stop the run: aggregate stored positions into a summary, persist it
//!    with a conditional status write, then evaluate challenge badges
//!
//! Every operation that reads-then-writes a run holds that run's lock, so
//! concurrent `stop` calls finalize once and position writes for a run
//! never interleave. Finalization additionally holds the athlete's lock
//! while badges are evaluated against their run history.

use crate::db::{new_id, Database, RunFilter};
use crate::error::{AppError, Result};
use crate::models::{
    ItemCollection, Position, PositionSample, Run, RunStatus, RunSummary, UserKind,
};
use crate::services::achievements::{self, Badge};
use crate::services::locks::KeyedLocks;
use crate::services::{collectibles, finalize, lifecycle, tracking};

/// Sort order for run listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunOrdering {
    #[default]
    CreatedAtAsc,
    CreatedAtDesc,
}

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

/// Explicit listing parameters for runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunQuery {
    pub filter: RunFilter,
    pub ordering: RunOrdering,
    /// `None` returns every matching run
    pub page: Option<PageRequest>,
}

/// One page of runs plus the total number of matches.
#[derive(Debug, Clone)]
pub struct RunPage {
    pub runs: Vec<Run>,
    pub total: usize,
}

/// Result of stopping a run.
#[derive(Debug, Clone)]
pub struct StopOutcome {
    pub run: Run,
    /// Badges newly awarded by this run
    pub badges: Vec<Badge>,
}

#[derive(Clone)]
pub struct RunService {
    db: Database,
    /// Serializes reads-then-writes of one run
    run_locks: KeyedLocks,
    /// Serializes finalization and badge evaluation across an athlete's runs
    athlete_locks: KeyedLocks,
}

impl RunService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            run_locks: KeyedLocks::new(),
            athlete_locks: KeyedLocks::new(),
        }
    }

    /// Runs with a lock currently held or awaited.
    pub fn locked_runs(&self) -> usize {
        self.run_locks.len()
    }

    // ─── Runs ────────────────────────────────────────────────────

    /// Create a run in the `init` state for an existing athlete.
    pub async fn create_run(&self, athlete_id: u64, comment: String) -> Result<Run> {
        let athlete = self
            .db
            .get_user(athlete_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Athlete {} not found", athlete_id)))?;

        if athlete.kind != UserKind::Athlete {
            return Err(AppError::Validation(format!(
                "User {} is a coach; runs belong to athletes",
                athlete_id
            )));
        }

        let run = Run::new(new_id()?, athlete_id, comment, chrono::Utc::now());
        self.db.insert_run(&run).await?;

        tracing::info!(run_id = run.id, athlete_id, "Run created");
        Ok(run)
    }

    pub async fn get_run(&self, run_id: u64) -> Result<Run> {
        self.db
            .get_run(run_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Run {} not found", run_id)))
    }

    pub async fn list_runs(&self, query: &RunQuery) -> Result<RunPage> {
        let mut runs = self.db.list_runs(&query.filter).await?;

        match query.ordering {
            RunOrdering::CreatedAtAsc => runs.sort_by_key(|r| (r.created_at, r.id)),
            RunOrdering::CreatedAtDesc => {
                runs.sort_by_key(|r| std::cmp::Reverse((r.created_at, r.id)))
            }
        }

        let total = runs.len();
        let runs = match query.page {
            Some(PageRequest { page, size }) => {
                let start = (page.max(1) as usize - 1).saturating_mul(size as usize);
                runs.into_iter().skip(start).take(size as usize).collect()
            }
            None => runs,
        };

        Ok(RunPage { runs, total })
    }

    /// Delete a run and its positions.
    pub async fn delete_run(&self, run_id: u64) -> Result<()> {
        let _guard = self.run_locks.lock(run_id).await;

        let deleted = self.db.delete_run(run_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Run {} not found", run_id)));
        }

        tracing::info!(run_id, deleted, "Run deleted");
        Ok(())
    }

    // ─── Lifecycle ───────────────────────────────────────────────

    /// `init` → `in_progress`.
    pub async fn start_run(&self, run_id: u64) -> Result<Run> {
        let _guard = self.run_locks.lock(run_id).await;

        let run = self.get_run(run_id).await?;
        let started = lifecycle::start(&run)?;

        if !self
            .db
            .update_run_if_status(&started, RunStatus::Init)
            .await?
        {
            return Err(AppError::InvalidState(format!(
                "run {} changed state concurrently",
                run_id
            )));
        }

        tracing::info!(run_id, athlete_id = run.athlete_id, "Run started");
        Ok(started)
    }

    /// `in_progress` → `finished`, then award badges.
    ///
    /// Badge evaluation cannot fail the stop; see [`achievements::award_for_run`].
    pub async fn stop_run(&self, run_id: u64) -> Result<StopOutcome> {
        let _guard = self.run_locks.lock(run_id).await;

        let run = self.get_run(run_id).await?;
        if run.status != RunStatus::InProgress {
            // Reject before touching positions.
            lifecycle::stop(&run, RunSummary::default())?;
        }

        let positions = self.db.positions_for_run(run_id).await?;
        let summary = finalize::summarize(&positions);
        let stopped = lifecycle::stop(&run, summary)?;

        // Badge rules read the athlete's finished-run history, so the status
        // write and evaluation must not interleave with another of their runs.
        let _athlete_guard = self.athlete_locks.lock(run.athlete_id).await;

        if !self
            .db
            .update_run_if_status(&stopped, RunStatus::InProgress)
            .await?
        {
            return Err(AppError::InvalidState(format!(
                "run {} changed state concurrently",
                run_id
            )));
        }

        tracing::info!(
            run_id,
            athlete_id = stopped.athlete_id,
            positions = positions.len(),
            distance_km = summary.distance,
            run_time_seconds = summary.run_time_seconds,
            speed = summary.speed,
            "Run finished"
        );

        let badges = achievements::award_for_run(&self.db, &stopped).await;

        Ok(StopOutcome {
            run: stopped,
            badges,
        })
    }

    // ─── Positions ───────────────────────────────────────────────

    /// Store a new sample for an in-progress run.
    ///
    /// Item collection failures are logged; the position is kept.
    pub async fn record_position(&self, run_id: u64, sample: PositionSample) -> Result<Position> {
        let _guard = self.run_locks.lock(run_id).await;

        let run = self.get_run(run_id).await?;
        lifecycle::ensure_accepts_positions(&run)?;

        let existing = self.db.positions_for_run(run_id).await?;
        let position = tracking::build_position(new_id()?, run_id, &sample, &existing)?;
        self.db.insert_position(&position).await?;

        tracing::debug!(
            run_id,
            position_id = position.id,
            speed = position.speed,
            distance_km = position.distance,
            "Position recorded"
        );

        self.collect_nearby_items(run.athlete_id, &position).await;
        Ok(position)
    }

    /// Positions of a run in time order.
    pub async fn positions(&self, run_id: u64) -> Result<Vec<Position>> {
        self.get_run(run_id).await?;
        self.db.positions_for_run(run_id).await
    }

    /// Mark every item within range of `position` as collected by the athlete.
    ///
    /// Returns the number of newly collected items.
    async fn collect_nearby_items(&self, athlete_id: u64, position: &Position) -> usize {
        let items = match self.db.list_items().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(athlete_id, error = %e, "Failed to load items for proximity check");
                return 0;
            }
        };

        let mut collected = 0;
        for item in collectibles::items_in_range(&items, position.latitude, position.longitude) {
            let record = ItemCollection {
                athlete_id,
                item: item.clone(),
                collected_at: position.date_time,
            };

            match self.db.add_collector(&record).await {
                Ok(true) => {
                    tracing::info!(athlete_id, uid = %item.uid, "Item collected");
                    collected += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(athlete_id, uid = %item.uid, error = %e, "Failed to record collection");
                }
            }
        }

        collected
    }
}
