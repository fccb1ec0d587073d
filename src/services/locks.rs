// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyed async mutexes.
//!
//! An entry exists only while some task holds or waits for its mutex; the
//! last guard to drop removes it, so the map stays bounded by concurrency
//! rather than by the number of keys ever seen.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = Arc<DashMap<u64, Arc<Mutex<()>>>>;

/// Per-key mutexes shared by all clones.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    table: LockTable,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: u64) -> KeyedGuard {
        let mutex = self
            .table
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        // Built before waiting so a cancelled waiter still cleans up.
        let mut lease = KeyedGuard {
            table: self.table.clone(),
            key,
            mutex: Some(mutex.clone()),
            guard: None,
        };
        lease.guard = Some(mutex.lock_owned().await);
        lease
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Exclusive access to one key; releases and prunes on drop.
pub struct KeyedGuard {
    table: LockTable,
    key: u64,
    mutex: Option<Arc<Mutex<()>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.mutex.take();
        // Only the table's own reference left: nobody holds or waits.
        self.table
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
