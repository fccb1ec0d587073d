// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod achievements;
pub mod collectibles;
pub mod finalize;
pub mod geodesic;
pub mod lifecycle;
pub mod locks;
pub mod runs;
pub mod tracking;

pub use achievements::Badge;
pub use collectibles::ItemCatalog;
pub use runs::{RunService, StopOutcome};
