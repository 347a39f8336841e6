// ABOUTME: Main library entry point for the Plateful recipe-sharing API
// ABOUTME: Provides user accounts, recipes, favorites, carts, and subscriptions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

#![deny(unsafe_code)]

//! # Plateful Server
//!
//! A recipe-sharing web backend: user accounts, recipe CRUD, an
//! ingredient catalog, favorites, shopping carts with consolidated
//! shopping-list aggregation, and follow-style subscriptions between
//! users.
//!
//! The core is a small graph of entities bound by composite-uniqueness
//! invariants: unique (name, unit) ingredient pairs, unique subscription
//! edges with no self-loops, and per-kind unique (user, recipe)
//! memberships for favorites and the shopping cart. Concurrent creates
//! of any uniquely-constrained row are arbitrated by the storage layer's
//! unique constraints and surfaced as `ALREADY_EXISTS`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use plateful::auth::AuthManager;
//! use plateful::config::ServerConfig;
//! use plateful::database::Database;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! let database = Database::new(&config.database_url).await?;
//! let auth = AuthManager::new(config.jwt_secret.clone(), config.jwt_expiry_hours);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod logging;
pub mod models;
pub mod routes;
