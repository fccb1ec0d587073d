// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User model and its API projections.

use crate::models::CollectibleItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Role of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum UserKind {
    Athlete,
    Coach,
}

/// User profile stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub date_joined: DateTime<Utc>,
}

/// Optional per-user profile, one document per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AthleteInfo {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: u64,
    /// Body weight in kilograms
    pub weight: Option<u32>,
    pub goals: Option<String>,
}

impl AthleteInfo {
    pub fn empty(user_id: u64) -> Self {
        Self {
            user_id,
            weight: None,
            goals: None,
        }
    }
}

// ─── Projections ─────────────────────────────────────────────

/// List view of a user.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub date_joined: DateTime<Utc>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub runs_finished: u32,
}

/// Detail view of an athlete, including collected items.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AthleteDetail {
    #[serde(flatten)]
    pub summary: UserSummary,
    pub items: Vec<CollectibleItem>,
}

/// Detail view of a coach.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CoachDetail {
    #[serde(flatten)]
    pub summary: UserSummary,
}

/// Role-dependent detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UserDetail {
    Athlete(AthleteDetail),
    Coach(CoachDetail),
}

pub fn summary_view(user: &User, runs_finished: u32) -> UserSummary {
    UserSummary {
        id: user.id,
        date_joined: user.date_joined,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        kind: user.kind,
        runs_finished,
    }
}

/// Pick the detail projection matching the user's role.
///
/// `items` is ignored for coaches.
pub fn detail_view(user: &User, runs_finished: u32, items: Vec<CollectibleItem>) -> UserDetail {
    let summary = summary_view(user, runs_finished);
    match user.kind {
        UserKind::Athlete => UserDetail::Athlete(AthleteDetail { summary, items }),
        UserKind::Coach => UserDetail::Coach(CoachDetail { summary }),
    }
}
