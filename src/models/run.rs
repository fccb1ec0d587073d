// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Run model: one tracked training session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RunStatus {
    Init,
    InProgress,
    Finished,
}

impl RunStatus {
    /// Storage/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Init => "init",
            RunStatus::InProgress => "in_progress",
            RunStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(RunStatus::Init),
            "in_progress" => Ok(RunStatus::InProgress),
            "finished" => Ok(RunStatus::Finished),
            other => Err(format!("unknown run status '{}'", other)),
        }
    }
}

/// Stored run record.
///
/// `distance`, `run_time_seconds` and `speed` are derived when the run is
/// stopped; they are never taken from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Run {
    /// Run ID (also used as document ID)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Owning athlete
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub athlete_id: u64,
    /// Free-text comment
    pub comment: String,
    /// When the run was created
    pub created_at: DateTime<Utc>,
    pub status: RunStatus,
    /// Total distance in kilometers
    #[serde(default)]
    pub distance: f64,
    /// Elapsed time between first and last sample, set on stop
    #[serde(default)]
    pub run_time_seconds: Option<u64>,
    /// Mean per-sample speed (m/s), set on stop
    #[serde(default)]
    pub speed: Option<f64>,
}

impl Run {
    /// A freshly created run in the `init` state.
    pub fn new(id: u64, athlete_id: u64, comment: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            athlete_id,
            comment,
            created_at,
            status: RunStatus::Init,
            distance: 0.0,
            run_time_seconds: None,
            speed: None,
        }
    }
}

/// Aggregate figures derived from a run's positions when it is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    pub run_time_seconds: u64,
    /// Kilometers
    pub distance: f64,
    /// Meters per second
    pub speed: f64,
}
