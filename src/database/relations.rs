// ABOUTME: Favorite and shopping-cart membership operations plus shopping-list aggregation
// ABOUTME: One table with a kind discriminator implements both user-recipe relations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{is_unique_violation, AppError, AppResult};
use crate::models::{ShoppingListItem, UserRecipeKind};

impl Database {
    /// Create the user_recipe_relations table
    ///
    /// Favorites and the shopping cart share the table; the composite
    /// unique constraint keeps the membership flag per kind independent.
    pub(super) async fn migrate_relations(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_recipe_relations (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                kind TEXT NOT NULL CHECK (kind IN ('favorite', 'cart')),
                created_at TEXT NOT NULL,
                UNIQUE (user_id, recipe_id, kind)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create user_recipe_relations table: {e}"))
        })?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_relations_user_kind
            ON user_recipe_relations(user_id, kind)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create relations index: {e}")))?;

        Ok(())
    }

    /// Add a recipe to a user's favorites or shopping cart
    ///
    /// The relation is a boolean membership flag: ABSENT -> add -> PRESENT.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the recipe does not exist
    /// - `AlreadyExists` when the pair is already PRESENT (the unique
    ///   constraint arbitrates concurrent adds)
    pub async fn add_user_recipe(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        kind: UserRecipeKind,
    ) -> AppResult<()> {
        if self.get_recipe(recipe_id).await?.is_none() {
            return Err(AppError::not_found(format!("Recipe {recipe_id}")));
        }

        sqlx::query(
            r"
            INSERT INTO user_recipe_relations (user_id, recipe_id, kind, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .bind(kind.as_str())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists(format!("Recipe is already in {}", kind.describe()))
            } else {
                AppError::database(format!("Failed to add recipe to {}: {e}", kind.describe()))
            }
        })?;

        Ok(())
    }

    /// Remove a recipe from a user's favorites or shopping cart
    ///
    /// PRESENT -> remove -> ABSENT.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the pair is already ABSENT
    pub async fn remove_user_recipe(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        kind: UserRecipeKind,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM user_recipe_relations
            WHERE user_id = $1 AND recipe_id = $2 AND kind = $3
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!(
                "Failed to remove recipe from {}: {e}",
                kind.describe()
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Recipe in {}",
                kind.describe()
            )));
        }
        Ok(())
    }

    /// Check whether a (user, recipe) pair is PRESENT for the given kind
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn has_user_recipe(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        kind: UserRecipeKind,
    ) -> AppResult<bool> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) as count FROM user_recipe_relations
            WHERE user_id = $1 AND recipe_id = $2 AND kind = $3
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check membership: {e}")))?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    /// Build a user's consolidated shopping list
    ///
    /// Sums the ingredient amounts of every recipe in the user's cart,
    /// grouped by (ingredient, measurement unit) rather than by recipe,
    /// ordered by ingredient name with the unit as a stable secondary
    /// key. An empty cart yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn shopping_list(&self, user_id: Uuid) -> AppResult<Vec<ShoppingListItem>> {
        let rows = sqlx::query(
            r"
            SELECT i.name, i.measurement_unit, SUM(ri.amount) as total_amount
            FROM user_recipe_relations r
            JOIN recipe_ingredients ri ON ri.recipe_id = r.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE r.user_id = $1 AND r.kind = 'cart'
            GROUP BY i.id, i.name, i.measurement_unit
            ORDER BY i.name ASC, i.measurement_unit ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to aggregate shopping list: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| ShoppingListItem {
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                total_amount: row.get("total_amount"),
            })
            .collect())
    }
}
