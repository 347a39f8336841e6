// ABOUTME: Test utilities for database operations
// ABOUTME: Provides an isolated in-memory database instance per test
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

use super::Database;
use crate::errors::AppResult;

/// Create a test database instance
///
/// Each call yields an isolated in-memory database with the full schema
/// applied.
///
/// # Errors
///
/// Returns an error if database initialization fails
pub async fn create_test_db() -> AppResult<Database> {
    Database::new("sqlite::memory:").await
}
