// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users and athlete profiles
//! - Runs and their positions
//! - Challenges (badges, keyed by athlete + name)
//! - Collectible items and the item-collections join collection

use crate::db::{collections, RunFilter};
use crate::error::AppError;
use crate::models::{
    AthleteInfo, Challenge, CollectibleItem, ItemCollection, Position, Run, RunStatus, User,
};
use futures_util::{stream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client; every operation returns an error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, id: u64) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.id.to_string())
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_or_create_athlete_info(&self, user_id: u64) -> Result<AthleteInfo, AppError> {
        let doc_id = user_id.to_string();
        if let Some(info) = self.get_athlete_info(&doc_id).await? {
            return Ok(info);
        }

        let empty = AthleteInfo::empty(user_id);
        if self
            .insert_if_absent(collections::ATHLETE_INFO, &doc_id, &empty)
            .await?
        {
            return Ok(empty);
        }

        // Lost a race with a concurrent writer; return what it stored.
        self.get_athlete_info(&doc_id)
            .await?
            .ok_or_else(|| AppError::Database(format!("Athlete info {} vanished", user_id)))
    }

    async fn get_athlete_info(&self, doc_id: &str) -> Result<Option<AthleteInfo>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ATHLETE_INFO)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_athlete_info(&self, info: &AthleteInfo) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ATHLETE_INFO)
            .document_id(info.user_id.to_string())
            .object(info)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Run Operations ──────────────────────────────────────────

    pub async fn get_run(&self, id: u64) -> Result<Option<Run>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RUNS)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_run(&self, run: &Run) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RUNS)
            .document_id(run.id.to_string())
            .object(run)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn list_runs(&self, filter: &RunFilter) -> Result<Vec<Run>, AppError> {
        let athlete_id = filter.athlete_id;
        let status = filter.status.map(|s| s.as_str());

        self.get_client()?
            .fluent()
            .select()
            .from(collections::RUNS)
            .filter(move |q| {
                q.for_all([
                    athlete_id.and_then(|id| q.field("athlete_id").eq(id)),
                    status.and_then(|s| q.field("status").eq(s)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Conditionally replace a run inside a transaction.
    ///
    /// Callers hold the per-run lock from `RunService`, which serializes
    /// transitions of the same run within this instance.
    pub async fn update_run_if_status(
        &self,
        run: &Run,
        expected: RunStatus,
    ) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let doc_id = run.id.to_string();

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<Run> = client
            .fluent()
            .select()
            .by_id_in(collections::RUNS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read run in transaction: {}", e)))?;

        match current {
            Some(current) if current.status == expected => {}
            _ => {
                let _ = transaction.rollback().await;
                return Ok(false);
            }
        }

        client
            .fluent()
            .update()
            .in_col(collections::RUNS)
            .document_id(&doc_id)
            .object(run)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add run to transaction: {}", e)))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(true)
    }

    /// Delete a run and cascade to its positions.
    pub async fn delete_run(&self, id: u64) -> Result<usize, AppError> {
        let positions = self.positions_for_run(id).await?;
        let count = positions.len();

        self.batch_delete(&positions, collections::POSITIONS, |p: &Position| {
            p.id.to_string()
        })
        .await?;
        tracing::debug!(run_id = id, count, "Deleted run positions");

        let existed = self.get_run(id).await?.is_some();
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::RUNS)
            .document_id(id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count + usize::from(existed))
    }

    // ─── Position Operations ─────────────────────────────────────

    pub async fn insert_position(&self, position: &Position) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::POSITIONS)
            .document_id(position.id.to_string())
            .object(position)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn positions_for_run(&self, run_id: u64) -> Result<Vec<Position>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::POSITIONS)
            .filter(move |q| q.field("run_id").eq(run_id))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Challenge Operations ────────────────────────────────────

    pub async fn award_challenge(&self, challenge: &Challenge) -> Result<bool, AppError> {
        let doc_id = Challenge::document_id(challenge.athlete_id, &challenge.full_name);
        self.insert_if_absent(collections::CHALLENGES, &doc_id, challenge)
            .await
    }

    pub async fn list_challenges(
        &self,
        athlete_id: Option<u64>,
    ) -> Result<Vec<Challenge>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHALLENGES)
            .filter(move |q| q.for_all([athlete_id.and_then(|id| q.field("athlete_id").eq(id))]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Collectible Item Operations ─────────────────────────────

    pub async fn insert_item(&self, item: &CollectibleItem) -> Result<bool, AppError> {
        let doc_id = urlencoding::encode(&item.uid).into_owned();
        self.insert_if_absent(collections::COLLECTIBLE_ITEMS, &doc_id, item)
            .await
    }

    /// Store multiple items.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn upsert_items(&self, items: &[CollectibleItem]) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(items.to_vec())
            .map(|item| async move {
                let doc_id = urlencoding::encode(&item.uid).into_owned();

                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::COLLECTIBLE_ITEMS)
                    .document_id(&doc_id)
                    .object(&item)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    pub async fn list_items(&self) -> Result<Vec<CollectibleItem>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COLLECTIBLE_ITEMS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn add_collector(&self, collection: &ItemCollection) -> Result<bool, AppError> {
        let doc_id = ItemCollection::document_id(&collection.item.uid, collection.athlete_id);
        self.insert_if_absent(collections::ITEM_COLLECTIONS, &doc_id, collection)
            .await
    }

    pub async fn collections_for_athlete(
        &self,
        athlete_id: u64,
    ) -> Result<Vec<ItemCollection>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ITEM_COLLECTIONS)
            .filter(move |q| q.field("athlete_id").eq(athlete_id))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Write `object` at `doc_id` unless a document already exists there.
    ///
    /// Uses a Firestore create, which the server rejects with
    /// `ALREADY_EXISTS` when the document is present, so of any number of
    /// concurrent writers of the same key exactly one gets `true`.
    async fn insert_if_absent<T>(
        &self,
        collection: &str,
        doc_id: &str,
        object: &T,
    ) -> Result<bool, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let created: Result<T, _> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(doc_id)
            .object(object)
            .execute()
            .await;

        match created {
            Ok(_) => Ok(true),
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                tracing::debug!(collection, doc_id, "Document already exists");
                Ok(false)
            }
            Err(e) => Err(AppError::Database(format!(
                "Failed to create {} document: {}",
                collection, e
            ))),
        }
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
