// ABOUTME: Subscription graph database operations
// ABOUTME: Directed follow edges between users with no self-loops or duplicates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{is_unique_violation, AppError, AppResult};
use crate::models::{Recipe, User};

/// A followed author together with their recipes, as returned by
/// [`Database::list_subscriptions`]
#[derive(Debug, Clone)]
pub struct SubscribedAuthor {
    /// The followed author's account
    pub author: User,
    /// Total number of recipes the author has published
    pub recipes_count: i64,
    /// The author's newest recipes, truncated to the caller's limit
    pub recipes: Vec<Recipe>,
}

impl Database {
    /// Create the subscriptions table
    ///
    /// The self-subscription ban is enforced here as a CHECK constraint
    /// in addition to the application-layer check in [`Database::subscribe`].
    pub(super) async fn migrate_subscriptions(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS subscriptions (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, author_id),
                CHECK (user_id <> author_id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create subscriptions table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_subscriptions_user ON subscriptions(user_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create subscriptions index: {e}")))?;

        Ok(())
    }

    /// Insert a follow edge from `user_id` to `author_id`
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` when a user subscribes to themselves
    /// - `NotFound` when the target author does not exist
    /// - `AlreadyExists` when the edge is already present (the unique
    ///   constraint arbitrates concurrent subscribe requests)
    pub async fn subscribe(&self, user_id: Uuid, author_id: Uuid) -> AppResult<()> {
        if user_id == author_id {
            return Err(AppError::invalid_operation(
                "You cannot subscribe to yourself",
            ));
        }

        if self.get_user_by_id(author_id).await?.is_none() {
            return Err(AppError::not_found(format!("User {author_id}")));
        }

        sqlx::query(
            r"
            INSERT INTO subscriptions (user_id, author_id, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user_id.to_string())
        .bind(author_id.to_string())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("You are already subscribed to this author")
            } else {
                AppError::database(format!("Failed to create subscription: {e}"))
            }
        })?;

        Ok(())
    }

    /// Remove the follow edge from `user_id` to `author_id`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the edge does not exist
    pub async fn unsubscribe(&self, user_id: Uuid, author_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2",
        )
        .bind(user_id.to_string())
        .bind(author_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete subscription: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Subscription"));
        }
        Ok(())
    }

    /// Check whether `user_id` follows `author_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn is_subscribed(&self, user_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM subscriptions WHERE user_id = $1 AND author_id = $2",
        )
        .bind(user_id.to_string())
        .bind(author_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check subscription: {e}")))?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    /// List the authors `user_id` follows, each annotated with their
    /// recipe count and up to `recipes_limit` of their newest recipes
    ///
    /// With no limit every recipe of the author is included.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn list_subscriptions(
        &self,
        user_id: Uuid,
        recipes_limit: Option<i64>,
    ) -> AppResult<Vec<SubscribedAuthor>> {
        let rows = sqlx::query(
            r"
            SELECT u.id FROM subscriptions s
            JOIN users u ON u.id = s.author_id
            WHERE s.user_id = $1
            ORDER BY u.username ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list subscriptions: {e}")))?;

        let mut authors = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let author_id = Uuid::parse_str(&id)
                .map_err(|e| AppError::database(format!("Corrupt author id: {e}")))?;

            let author = self
                .get_user_by_id(author_id)
                .await?
                .ok_or_else(|| AppError::database("Subscription references a missing author"))?;
            let recipes_count = self.count_recipes_by_author(author_id).await?;
            let recipes = self
                .list_recipes_by_author(author_id, recipes_limit)
                .await?;

            authors.push(SubscribedAuthor {
                author,
                recipes_count,
                recipes,
            });
        }

        Ok(authors)
    }
}
