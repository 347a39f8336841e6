// ABOUTME: Ingredient catalog database operations
// ABOUTME: Unique (name, measurement_unit) pairs with race-safe find-or-create
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Database;
use crate::errors::{is_unique_violation, AppError, AppResult};
use crate::models::Ingredient;

fn row_to_ingredient(row: &SqliteRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    }
}

impl Database {
    /// Create the ingredients table
    pub(super) async fn migrate_ingredients(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                measurement_unit TEXT NOT NULL,
                UNIQUE (name, measurement_unit)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredients table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create ingredients index: {e}")))?;

        Ok(())
    }

    /// Return the ingredient with this (name, unit) pair, creating it if
    /// absent
    ///
    /// Two requests racing to create the identical pair cannot produce
    /// duplicates: the loser's insert hits the unique constraint and is
    /// resolved by a second lookup of the winner's row.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty name or unit, or a database
    /// error if a query fails
    pub async fn find_or_create_ingredient(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> AppResult<Ingredient> {
        if name.is_empty() || measurement_unit.is_empty() {
            return Err(AppError::validation(
                "Ingredient name and measurement unit must not be empty",
            ));
        }

        if let Some(existing) = self.get_ingredient_by_pair(name, measurement_unit).await? {
            return Ok(existing);
        }

        let insert = sqlx::query(
            "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2)",
        )
        .bind(name)
        .bind(measurement_unit)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(result) => Ok(Ingredient {
                id: result.last_insert_rowid(),
                name: name.to_owned(),
                measurement_unit: measurement_unit.to_owned(),
            }),
            Err(e) if is_unique_violation(&e) => self
                .get_ingredient_by_pair(name, measurement_unit)
                .await?
                .ok_or_else(|| {
                    AppError::database("Ingredient vanished after losing a create race")
                }),
            Err(e) => Err(AppError::database(format!(
                "Failed to create ingredient: {e}"
            ))),
        }
    }

    /// Fetch an ingredient by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_ingredient(&self, id: i64) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query("SELECT * FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to fetch ingredient: {e}")))?;

        Ok(row.as_ref().map(row_to_ingredient))
    }

    /// Fetch an ingredient by its unique (name, unit) pair
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_ingredient_by_pair(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query(
            "SELECT * FROM ingredients WHERE name = $1 AND measurement_unit = $2",
        )
        .bind(name)
        .bind(measurement_unit)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to fetch ingredient: {e}")))?;

        Ok(row.as_ref().map(row_to_ingredient))
    }

    /// List catalog ingredients ordered by name, optionally filtered by
    /// a case-insensitive name prefix
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_ingredients(&self, name_prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let rows = match name_prefix {
            Some(prefix) => {
                let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
                sqlx::query(
                    r"
                    SELECT * FROM ingredients
                    WHERE name LIKE $1 ESCAPE '\'
                    ORDER BY name ASC, measurement_unit ASC
                    ",
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM ingredients ORDER BY name ASC, measurement_unit ASC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list ingredients: {e}")))?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }
}
