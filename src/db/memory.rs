// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent maps.
//!
//! Used for local development and tests. Conditional writes use DashMap's
//! per-shard locking (`get_mut` / `entry`), so check-and-set is atomic.

use crate::db::RunFilter;
use crate::error::Result;
use crate::models::{
    AthleteInfo, Challenge, CollectibleItem, ItemCollection, Position, Run, RunStatus, User,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    users: DashMap<u64, User>,
    athlete_info: DashMap<u64, AthleteInfo>,
    runs: DashMap<u64, Run>,
    /// Positions grouped by run ID
    positions: DashMap<u64, Vec<Position>>,
    /// Keyed by [`Challenge::document_id`]
    challenges: DashMap<String, Challenge>,
    /// Keyed by uid
    items: DashMap<String, CollectibleItem>,
    /// Keyed by [`ItemCollection::document_id`]
    item_collections: DashMap<String, ItemCollection>,
}

/// In-memory database; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Users ───────────────────────────────────────────────────

    pub fn get_user(&self, id: u64) -> Result<Option<User>> {
        Ok(self.tables.users.get(&id).map(|u| u.clone()))
    }

    pub fn upsert_user(&self, user: &User) -> Result<()> {
        self.tables.users.insert(user.id, user.clone());
        Ok(())
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.users.iter().map(|u| u.clone()).collect())
    }

    pub fn get_or_create_athlete_info(&self, user_id: u64) -> Result<AthleteInfo> {
        Ok(self
            .tables
            .athlete_info
            .entry(user_id)
            .or_insert_with(|| AthleteInfo::empty(user_id))
            .clone())
    }

    pub fn upsert_athlete_info(&self, info: &AthleteInfo) -> Result<()> {
        self.tables.athlete_info.insert(info.user_id, info.clone());
        Ok(())
    }

    // ─── Runs ────────────────────────────────────────────────────

    pub fn get_run(&self, id: u64) -> Result<Option<Run>> {
        Ok(self.tables.runs.get(&id).map(|r| r.clone()))
    }

    pub fn set_run(&self, run: &Run) -> Result<()> {
        self.tables.runs.insert(run.id, run.clone());
        Ok(())
    }

    pub fn list_runs(&self, filter: &RunFilter) -> Result<Vec<Run>> {
        Ok(self
            .tables
            .runs
            .iter()
            .filter(|r| filter.matches(r.value()))
            .map(|r| r.clone())
            .collect())
    }

    pub fn update_run_if_status(&self, run: &Run, expected: RunStatus) -> Result<bool> {
        match self.tables.runs.get_mut(&run.id) {
            Some(mut stored) if stored.status == expected => {
                *stored = run.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn delete_run(&self, id: u64) -> Result<usize> {
        let positions = self
            .tables
            .positions
            .remove(&id)
            .map(|(_, positions)| positions.len())
            .unwrap_or(0);
        let run = usize::from(self.tables.runs.remove(&id).is_some());
        Ok(positions + run)
    }

    // ─── Positions ───────────────────────────────────────────────

    pub fn insert_position(&self, position: &Position) -> Result<()> {
        self.tables
            .positions
            .entry(position.run_id)
            .or_default()
            .push(position.clone());
        Ok(())
    }

    pub fn positions_for_run(&self, run_id: u64) -> Result<Vec<Position>> {
        Ok(self
            .tables
            .positions
            .get(&run_id)
            .map(|p| p.clone())
            .unwrap_or_default())
    }

    // ─── Challenges ──────────────────────────────────────────────

    pub fn award_challenge(&self, challenge: &Challenge) -> Result<bool> {
        let key = Challenge::document_id(challenge.athlete_id, &challenge.full_name);
        match self.tables.challenges.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(challenge.clone());
                Ok(true)
            }
        }
    }

    pub fn list_challenges(&self, athlete_id: Option<u64>) -> Result<Vec<Challenge>> {
        Ok(self
            .tables
            .challenges
            .iter()
            .filter(|c| athlete_id.is_none_or(|id| c.athlete_id == id))
            .map(|c| c.clone())
            .collect())
    }

    // ─── Collectible Items ───────────────────────────────────────

    pub fn insert_item(&self, item: &CollectibleItem) -> Result<bool> {
        match self.tables.items.entry(item.uid.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
                Ok(true)
            }
        }
    }

    pub fn upsert_items(&self, items: &[CollectibleItem]) -> Result<()> {
        for item in items {
            self.tables.items.insert(item.uid.clone(), item.clone());
        }
        Ok(())
    }

    pub fn list_items(&self) -> Result<Vec<CollectibleItem>> {
        Ok(self.tables.items.iter().map(|i| i.clone()).collect())
    }

    pub fn add_collector(&self, collection: &ItemCollection) -> Result<bool> {
        let key = ItemCollection::document_id(&collection.item.uid, collection.athlete_id);
        match self.tables.item_collections.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(collection.clone());
                Ok(true)
            }
        }
    }

    pub fn collections_for_athlete(&self, athlete_id: u64) -> Result<Vec<ItemCollection>> {
        Ok(self
            .tables
            .item_collections
            .iter()
            .filter(|c| c.athlete_id == athlete_id)
            .map(|c| c.clone())
            .collect())
    }
}
