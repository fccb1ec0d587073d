// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run lifecycle state machine.
//!
//! ```text
//! init ──start──▶ in_progress ──stop──▶ finished
//! ```
//!
//! These functions only compute the next state; persisting it (with a
//! conditional write on the prior status) is the caller's job.

use crate::error::{AppError, Result};
use crate::models::{Run, RunStatus, RunSummary};

/// Transition a run from `init` to `in_progress`.
pub fn start(run: &Run) -> Result<Run> {
    match run.status {
        RunStatus::Init => Ok(Run {
            status: RunStatus::InProgress,
            ..run.clone()
        }),
        other => Err(AppError::InvalidState(format!(
            "run {} cannot be started from status '{}'",
            run.id, other
        ))),
    }
}

/// Transition a run from `in_progress` to `finished`, recording its summary.
pub fn stop(run: &Run, summary: RunSummary) -> Result<Run> {
    match run.status {
        RunStatus::InProgress => Ok(Run {
            status: RunStatus::Finished,
            distance: summary.distance,
            run_time_seconds: Some(summary.run_time_seconds),
            speed: Some(summary.speed),
            ..run.clone()
        }),
        other => Err(AppError::InvalidState(format!(
            "run {} cannot be stopped from status '{}'",
            run.id, other
        ))),
    }
}

/// Positions may only be recorded while the run is in progress.
pub fn ensure_accepts_positions(run: &Run) -> Result<()> {
    if run.status == RunStatus::InProgress {
        Ok(())
    } else {
        Err(AppError::InvalidState(format!(
            "run must be in progress (run {} is '{}')",
            run.id, run.status
        )))
    }
}
