// ABOUTME: Recipe database operations including the quantified ingredient list
// ABOUTME: Recipe CRUD with newest-first ordering and owned recipe_ingredients rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, IngredientAmount, Recipe, MIN_AMOUNT, MIN_COOKING_TIME};

/// One ingredient line of a recipe, joined with its catalog entry
#[derive(Debug, Clone)]
pub struct RecipeIngredientEntry {
    /// Catalog ingredient
    pub ingredient: Ingredient,
    /// Quantity in the ingredient's measurement unit
    pub amount: i64,
}

fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    let id: String = row.get("id");
    let author_id: String = row.get("author_id");
    let created_at: String = row.get("created_at");

    Ok(Recipe {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Corrupt recipe id: {e}")))?,
        author_id: Uuid::parse_str(&author_id)
            .map_err(|e| AppError::database(format!("Corrupt recipe author id: {e}")))?,
        name: row.get("name"),
        image: row.get("image"),
        text: row.get("text"),
        cooking_time: row.get("cooking_time"),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::database(format!("Corrupt recipe timestamp: {e}")))?
            .with_timezone(&Utc),
    })
}

/// Validate recipe fields and the quantified ingredient list
///
/// The serialization layer has already type-checked the input; these
/// checks keep the invariants enforced even if it did not.
fn validate_recipe_input(cooking_time: i64, ingredients: &[IngredientAmount]) -> AppResult<()> {
    if cooking_time < MIN_COOKING_TIME {
        return Err(AppError::validation(format!(
            "Cooking time must be at least {MIN_COOKING_TIME} minute"
        )));
    }
    if ingredients.is_empty() {
        return Err(AppError::validation(
            "A recipe needs at least one ingredient",
        ));
    }
    for item in ingredients {
        if item.amount < MIN_AMOUNT {
            return Err(AppError::validation(format!(
                "Ingredient amount must be at least {MIN_AMOUNT}"
            )));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for item in ingredients {
        if !seen.insert(item.id) {
            return Err(AppError::validation(format!(
                "Ingredient {} is listed more than once",
                item.id
            )));
        }
    }
    Ok(())
}

impl Database {
    /// Create the recipes and recipe_ingredients tables
    pub(super) async fn migrate_recipes(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                image TEXT NOT NULL,
                text TEXT NOT NULL,
                cooking_time INTEGER NOT NULL CHECK (cooking_time >= 1),
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipes table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                amount INTEGER NOT NULL CHECK (amount >= 1),
                UNIQUE (recipe_id, ingredient_id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create recipe_ingredients table: {e}"))
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipes index: {e}")))?;

        Ok(())
    }

    /// Insert a recipe together with its quantified ingredient list
    ///
    /// # Errors
    ///
    /// - `ValidationError` for cooking time or amount below the minimum,
    ///   an empty or duplicated ingredient list
    /// - `NotFound` when a referenced ingredient id is not in the catalog
    pub async fn create_recipe(
        &self,
        recipe: &Recipe,
        ingredients: &[IngredientAmount],
    ) -> AppResult<Uuid> {
        validate_recipe_input(recipe.cooking_time, ingredients)?;
        self.check_ingredients_exist(ingredients).await?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to start transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO recipes (id, author_id, name, image, text, cooking_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(recipe.id.to_string())
        .bind(recipe.author_id.to_string())
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(recipe.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        for item in ingredients {
            sqlx::query(
                r"
                INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(recipe.id.to_string())
            .bind(item.id)
            .bind(item.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to add recipe ingredient: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe: {e}")))?;

        Ok(recipe.id)
    }

    /// Update a recipe's descriptive fields and replace its ingredient
    /// list atomically
    ///
    /// `created_at` and the author are immutable and left untouched.
    ///
    /// # Errors
    ///
    /// Same validation errors as [`Database::create_recipe`], plus
    /// `NotFound` when the recipe does not exist
    pub async fn update_recipe(
        &self,
        recipe_id: Uuid,
        name: &str,
        image: &str,
        text: &str,
        cooking_time: i64,
        ingredients: &[IngredientAmount],
    ) -> AppResult<()> {
        validate_recipe_input(cooking_time, ingredients)?;
        self.check_ingredients_exist(ingredients).await?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to start transaction: {e}")))?;

        let result = sqlx::query(
            r"
            UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4
            WHERE id = $5
            ",
        )
        .bind(name)
        .bind(image)
        .bind(text)
        .bind(cooking_time)
        .bind(recipe_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Recipe {recipe_id}")));
        }

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear recipe ingredients: {e}")))?;

        for item in ingredients {
            sqlx::query(
                r"
                INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(recipe_id.to_string())
            .bind(item.id)
            .bind(item.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to add recipe ingredient: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe update: {e}")))?;

        Ok(())
    }

    /// Delete a recipe; its ingredient rows and favorite/cart memberships
    /// cascade
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the recipe does not exist
    pub async fn delete_recipe(&self, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Recipe {recipe_id}")));
        }
        Ok(())
    }

    /// Fetch a recipe by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_recipe(&self, recipe_id: Uuid) -> AppResult<Option<Recipe>> {
        let row = sqlx::query("SELECT * FROM recipes WHERE id = $1")
            .bind(recipe_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to fetch recipe: {e}")))?;

        row.as_ref().map(row_to_recipe).transpose()
    }

    /// List recipes newest-first, optionally restricted to one author
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_recipes(&self, author_id: Option<Uuid>) -> AppResult<Vec<Recipe>> {
        let rows = match author_id {
            Some(author) => {
                sqlx::query(
                    "SELECT * FROM recipes WHERE author_id = $1 ORDER BY created_at DESC",
                )
                .bind(author.to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM recipes ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        rows.iter().map(row_to_recipe).collect()
    }

    /// List an author's newest recipes, truncated to `limit` when given
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_recipes_by_author(
        &self,
        author_id: Uuid,
        limit: Option<i64>,
    ) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM recipes WHERE author_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(author_id.to_string())
        // SQLite treats a negative LIMIT as unlimited
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list author recipes: {e}")))?;

        rows.iter().map(row_to_recipe).collect()
    }

    /// Count an author's recipes
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_recipes_by_author(&self, author_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM recipes WHERE author_id = $1")
            .bind(author_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count recipes: {e}")))?;

        Ok(row.get("count"))
    }

    /// Fetch a recipe's ingredient lines joined with their catalog entries
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_recipe_ingredients(
        &self,
        recipe_id: Uuid,
    ) -> AppResult<Vec<RecipeIngredientEntry>> {
        let rows = sqlx::query(
            r"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY i.name ASC
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to fetch recipe ingredients: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| RecipeIngredientEntry {
                ingredient: Ingredient {
                    id: row.get("id"),
                    name: row.get("name"),
                    measurement_unit: row.get("measurement_unit"),
                },
                amount: row.get("amount"),
            })
            .collect())
    }

    async fn check_ingredients_exist(&self, ingredients: &[IngredientAmount]) -> AppResult<()> {
        for item in ingredients {
            if self.get_ingredient(item.id).await?.is_none() {
                return Err(AppError::not_found(format!("Ingredient {}", item.id)));
            }
        }
        Ok(())
    }
}
