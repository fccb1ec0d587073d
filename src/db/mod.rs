// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Database`] fronts either Firestore or an in-process store with the same
//! semantics. Uniqueness is expressed through deterministic document IDs:
//! challenges by (athlete, badge name), items by uid, collections by
//! (item uid, athlete).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::{AppError, Result};
use crate::models::{
    AthleteInfo, Challenge, CollectibleItem, ItemCollection, Position, Run, RunStatus, User,
};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Athlete profiles (keyed by user ID)
    pub const ATHLETE_INFO: &str = "athlete_info";
    pub const RUNS: &str = "runs";
    pub const POSITIONS: &str = "positions";
    pub const CHALLENGES: &str = "challenges";
    pub const COLLECTIBLE_ITEMS: &str = "collectible_items";
    /// Item-athlete join collection (keyed by `{uid}_{athlete_id}`)
    pub const ITEM_COLLECTIONS: &str = "item_collections";
}

/// Equality filters for run queries. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFilter {
    pub athlete_id: Option<u64>,
    pub status: Option<RunStatus>,
}

impl RunFilter {
    pub fn matches(&self, run: &Run) -> bool {
        self.athlete_id.is_none_or(|id| run.athlete_id == id)
            && self.status.is_none_or(|status| run.status == status)
    }
}

/// Generate a new random document/entity ID.
///
/// IDs stay below 2^53 so JavaScript clients can represent them exactly.
pub fn new_id() -> Result<u64> {
    use ring::rand::{SecureRandom, SystemRandom};

    let mut bytes = [0u8; 8];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG unavailable")))?;

    Ok((u64::from_be_bytes(bytes) & ((1 << 53) - 1)).max(1))
}

/// Storage handle shared by services and route handlers.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// An empty in-process database (local development and tests).
    pub fn in_memory() -> Self {
        Database::Memory(MemoryDb::new())
    }

    // ─── Users ───────────────────────────────────────────────────

    pub async fn get_user(&self, id: u64) -> Result<Option<User>> {
        match self {
            Database::Firestore(db) => db.get_user(id).await,
            Database::Memory(db) => db.get_user(id),
        }
    }

    pub async fn upsert_user(&self, user: &User) -> Result<()> {
        match self {
            Database::Firestore(db) => db.upsert_user(user).await,
            Database::Memory(db) => db.upsert_user(user),
        }
    }

    /// All users, oldest first.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let mut users = match self {
            Database::Firestore(db) => db.list_users().await?,
            Database::Memory(db) => db.list_users()?,
        };
        users.sort_by_key(|u| (u.date_joined, u.id));
        Ok(users)
    }

    /// The user's profile, created empty on first access.
    pub async fn get_or_create_athlete_info(&self, user_id: u64) -> Result<AthleteInfo> {
        match self {
            Database::Firestore(db) => db.get_or_create_athlete_info(user_id).await,
            Database::Memory(db) => db.get_or_create_athlete_info(user_id),
        }
    }

    pub async fn upsert_athlete_info(&self, info: &AthleteInfo) -> Result<()> {
        match self {
            Database::Firestore(db) => db.upsert_athlete_info(info).await,
            Database::Memory(db) => db.upsert_athlete_info(info),
        }
    }

    // ─── Runs ────────────────────────────────────────────────────

    pub async fn get_run(&self, id: u64) -> Result<Option<Run>> {
        match self {
            Database::Firestore(db) => db.get_run(id).await,
            Database::Memory(db) => db.get_run(id),
        }
    }

    pub async fn insert_run(&self, run: &Run) -> Result<()> {
        match self {
            Database::Firestore(db) => db.set_run(run).await,
            Database::Memory(db) => db.set_run(run),
        }
    }

    /// Runs matching `filter`, in unspecified order.
    pub async fn list_runs(&self, filter: &RunFilter) -> Result<Vec<Run>> {
        match self {
            Database::Firestore(db) => db.list_runs(filter).await,
            Database::Memory(db) => db.list_runs(filter),
        }
    }

    /// Replace a stored run only if its current status is `expected`.
    ///
    /// Returns `false` (and writes nothing) when the run is missing or its
    /// status has already moved on.
    pub async fn update_run_if_status(&self, run: &Run, expected: RunStatus) -> Result<bool> {
        match self {
            Database::Firestore(db) => db.update_run_if_status(run, expected).await,
            Database::Memory(db) => db.update_run_if_status(run, expected),
        }
    }

    /// Delete a run and all of its positions. Returns documents deleted.
    pub async fn delete_run(&self, id: u64) -> Result<usize> {
        match self {
            Database::Firestore(db) => db.delete_run(id).await,
            Database::Memory(db) => db.delete_run(id),
        }
    }

    // ─── Positions ───────────────────────────────────────────────

    pub async fn insert_position(&self, position: &Position) -> Result<()> {
        match self {
            Database::Firestore(db) => db.insert_position(position).await,
            Database::Memory(db) => db.insert_position(position),
        }
    }

    /// Positions of a run ordered by timestamp (ties by ID).
    pub async fn positions_for_run(&self, run_id: u64) -> Result<Vec<Position>> {
        let mut positions = match self {
            Database::Firestore(db) => db.positions_for_run(run_id).await?,
            Database::Memory(db) => db.positions_for_run(run_id)?,
        };
        positions.sort_by_key(|p| (p.date_time, p.id));
        Ok(positions)
    }

    // ─── Challenges ──────────────────────────────────────────────

    /// Store a challenge unless the athlete already holds one with this name.
    ///
    /// Returns `true` if newly awarded.
    pub async fn award_challenge(&self, challenge: &Challenge) -> Result<bool> {
        match self {
            Database::Firestore(db) => db.award_challenge(challenge).await,
            Database::Memory(db) => db.award_challenge(challenge),
        }
    }

    /// Challenges, optionally for a single athlete, in award order.
    pub async fn list_challenges(&self, athlete_id: Option<u64>) -> Result<Vec<Challenge>> {
        let mut challenges = match self {
            Database::Firestore(db) => db.list_challenges(athlete_id).await?,
            Database::Memory(db) => db.list_challenges(athlete_id)?,
        };
        challenges.sort_by(|a, b| {
            (a.awarded_at, a.athlete_id, &a.full_name).cmp(&(
                b.awarded_at,
                b.athlete_id,
                &b.full_name,
            ))
        });
        Ok(challenges)
    }

    // ─── Collectible Items ───────────────────────────────────────

    /// Insert an item. Returns `false` if an item with the same uid exists.
    pub async fn insert_item(&self, item: &CollectibleItem) -> Result<bool> {
        match self {
            Database::Firestore(db) => db.insert_item(item).await,
            Database::Memory(db) => db.insert_item(item),
        }
    }

    /// Create or overwrite items by uid (catalog seeding).
    pub async fn upsert_items(&self, items: &[CollectibleItem]) -> Result<()> {
        match self {
            Database::Firestore(db) => db.upsert_items(items).await,
            Database::Memory(db) => db.upsert_items(items),
        }
    }

    /// All items ordered by uid.
    pub async fn list_items(&self) -> Result<Vec<CollectibleItem>> {
        let mut items = match self {
            Database::Firestore(db) => db.list_items().await?,
            Database::Memory(db) => db.list_items()?,
        };
        items.sort_by(|a, b| a.uid.cmp(&b.uid));
        Ok(items)
    }

    /// Record that an athlete collected an item. Returns `true` if new.
    pub async fn add_collector(&self, collection: &ItemCollection) -> Result<bool> {
        match self {
            Database::Firestore(db) => db.add_collector(collection).await,
            Database::Memory(db) => db.add_collector(collection),
        }
    }

    /// Items collected by an athlete, in collection order.
    pub async fn collections_for_athlete(&self, athlete_id: u64) -> Result<Vec<ItemCollection>> {
        let mut collected = match self {
            Database::Firestore(db) => db.collections_for_athlete(athlete_id).await?,
            Database::Memory(db) => db.collections_for_athlete(athlete_id)?,
        };
        collected.sort_by(|a, b| {
            (a.collected_at, &a.item.uid).cmp(&(b.collected_at, &b.item.uid))
        });
        Ok(collected)
    }
}
