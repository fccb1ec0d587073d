// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run-Tracker API Server
//!
//! Records GPS runs, derives distance and speed from position samples,
//! awards challenge badges and tracks collectible items.

use run_tracker::{
    config::{Config, StorageBackend},
    db::{Database, FirestoreDb},
    services::ItemCatalog,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        storage = ?config.storage,
        "Starting Run-Tracker API"
    );

    let db = match config.storage {
        StorageBackend::Firestore => {
            Database::Firestore(FirestoreDb::new(&config.gcp_project_id).await?)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Database::in_memory()
        }
    };

    // Seed the collectible catalog
    if let Some(path) = config.collectibles_path.as_deref() {
        tracing::info!(path, "Loading collectible items");
        let catalog = ItemCatalog::load_from_file(path)?;
        db.upsert_items(catalog.items()).await?;
        tracing::info!(count = catalog.items().len(), "Collectible items seeded");
    }

    let state = Arc::new(AppState::new(config.clone(), db));
    let app = run_tracker::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("run_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
