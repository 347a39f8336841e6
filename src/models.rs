// ABOUTME: Core domain models for users, recipes, ingredients, and their relations
// ABOUTME: Defines the entities and validation rules shared by routes and database layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! # Domain Models
//!
//! Entities for the recipe-sharing domain: user accounts, the ingredient
//! catalog, recipes with quantified ingredient lists, the subscription
//! graph, and the favorite/shopping-cart relations.
//!
//! Validation rules live next to the types so both the request layer and
//! the database layer enforce them (the storage schema carries matching
//! CHECK and UNIQUE constraints).

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::errors::AppError;

/// Minimum cooking time in minutes
pub const MIN_COOKING_TIME: i64 = 1;
/// Minimum ingredient amount within a recipe
pub const MIN_AMOUNT: i64 = 1;
/// Minimum password length for registration and password change
pub const MIN_PASSWORD_LEN: usize = 8;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Pattern is a compile-time literal
    #[allow(clippy::unwrap_used)]
    PATTERN.get_or_init(|| Regex::new(r"^[\w.@+-]+$").unwrap())
}

/// Validate a username against the allowed character set
///
/// # Errors
///
/// Returns a validation error if the username is empty, too long, or
/// contains characters outside letters, digits, and `@ . + - _`
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.len() > 150 {
        return Err(AppError::validation(
            "Username must be between 1 and 150 characters",
        ));
    }
    if !username_pattern().is_match(username) {
        return Err(AppError::validation(
            "Username may only contain letters, digits, and @/./+/-/_",
        ));
    }
    Ok(())
}

/// Validate an email address shape
///
/// Full RFC validation is the serialization layer's job; the core keeps a
/// minimal structural check.
///
/// # Errors
///
/// Returns a validation error for empty, oversized, or @-less values
pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() || email.len() > 254 || !email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(())
}

/// Validate a plaintext password before hashing
///
/// # Errors
///
/// Returns a validation error if the password is shorter than
/// [`MIN_PASSWORD_LEN`]
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address, globally unique, used for login
    pub email: String,
    /// Username, globally unique, pattern `[\w.@+-]+`
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Opaque reference to an uploaded avatar image, if any
    pub avatar: Option<String>,
    /// Bcrypt hash of the account password
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id and creation timestamp
    #[must_use]
    pub fn new(
        email: String,
        username: String,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            first_name,
            last_name,
            avatar: None,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Catalog entry: an ingredient with its measurement unit
///
/// The (name, `measurement_unit`) pair is globally unique; "Sugar"/"g" and
/// "Sugar"/"kg" are distinct catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Catalog identifier
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Measurement unit the amount is expressed in
    pub measurement_unit: String,
}

/// A recipe authored by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier
    pub id: Uuid,
    /// Author owning this recipe
    pub author_id: Uuid,
    /// Recipe title
    pub name: String,
    /// Opaque reference to the recipe image
    pub image: String,
    /// Recipe body text
    pub text: String,
    /// Cooking time in minutes, at least [`MIN_COOKING_TIME`]
    pub cooking_time: i64,
    /// Creation timestamp, immutable after creation
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a new recipe with a fresh id and creation timestamp
    #[must_use]
    pub fn new(
        author_id: Uuid,
        name: String,
        image: String,
        text: String,
        cooking_time: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            name,
            image,
            text,
            cooking_time,
            created_at: Utc::now(),
        }
    }
}

/// Quantified ingredient reference supplied when creating or updating a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Catalog ingredient id
    pub id: i64,
    /// Quantity, at least [`MIN_AMOUNT`]
    pub amount: i64,
}

/// Discriminator for the two user-recipe relations
///
/// Favorites and the shopping cart share one shape: a boolean membership
/// flag per (user, recipe) pair with an independent uniqueness constraint
/// per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRecipeKind {
    /// Bookmarked recipes
    Favorite,
    /// Recipes queued for shopping-list aggregation
    Cart,
}

impl UserRecipeKind {
    /// Database discriminator value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Cart => "cart",
        }
    }

    /// Human-readable relation name for error messages
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::Cart => "shopping cart",
        }
    }
}

impl FromStr for UserRecipeKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favorite" => Ok(Self::Favorite),
            "cart" => Ok(Self::Cart),
            other => Err(AppError::validation(format!(
                "Unknown user-recipe relation kind: {other}"
            ))),
        }
    }
}

impl fmt::Display for UserRecipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One consolidated line of a user's shopping list
///
/// Produced by grouping the ingredient rows of every recipe in the cart
/// by (ingredient, `measurement_unit`) and summing the amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Sum of amounts across all cart recipes using this ingredient
    pub total_amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_pattern() {
        assert!(validate_username("chef.julia_01").is_ok());
        assert!(validate_username("user@example+tag-x").is_ok());
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_relation_kind_round_trip() {
        for kind in [UserRecipeKind::Favorite, UserRecipeKind::Cart] {
            assert_eq!(kind.as_str().parse::<UserRecipeKind>().unwrap(), kind);
        }
        assert!("banana".parse::<UserRecipeKind>().is_err());
    }
}
