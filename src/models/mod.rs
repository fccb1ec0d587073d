// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod challenge;
pub mod item;
pub mod position;
pub mod run;
pub mod user;

pub use challenge::Challenge;
pub use item::{CollectibleItem, ItemCollection};
pub use position::{Position, PositionSample};
pub use run::{Run, RunStatus, RunSummary};
pub use user::{AthleteInfo, User, UserKind};
