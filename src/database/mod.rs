// ABOUTME: Database handle, pool management, and schema migrations
// ABOUTME: Wraps a SQLite pool and fans out to per-domain operation modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! # Database Management
//!
//! `Database` wraps a `SqlitePool` and exposes the persistence
//! operations for users, the subscription graph, the ingredient catalog,
//! recipes, and the favorite/shopping-cart relations. Schema creation is
//! idempotent: every module contributes a `migrate_*` function run at
//! startup.
//!
//! Uniqueness invariants (email, username, the (name, unit) ingredient
//! pair, subscription edges, relation memberships) are enforced by
//! `UNIQUE` constraints; the storage layer is the sole synchronization
//! primitive for concurrent creates.

mod ingredients;
mod recipes;
mod relations;
pub mod subscriptions;
pub mod test_utils;
mod users;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// Database manager for all persisted state
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or
    /// schema migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        // In-memory databases exist per connection; a single-connection
        // pool keeps all operations on the same database instance.
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            5
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_subscriptions().await?;
        self.migrate_ingredients().await?;
        self.migrate_recipes().await?;
        self.migrate_relations().await?;
        Ok(())
    }
}
