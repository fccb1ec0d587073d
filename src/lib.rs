// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Run-Tracker: GPS run logging with challenges and collectible items
//!
//! This crate provides the backend API for recording runs, deriving
//! distance/speed/time from position samples, and awarding badges.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::RunService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub run_service: RunService,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let run_service = RunService::new(db.clone());
        Self {
            config,
            db,
            run_service,
        }
    }
}
