// ABOUTME: Route handlers for recipes, favorites, shopping cart, and the shopping list
// ABOUTME: Recipe CRUD with author-only mutation and the grouped ingredient aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! Recipe routes
//!
//! Recipe CRUD plus the two user-recipe relations (favorites, shopping
//! cart) and the consolidated shopping-list download. Reads are
//! anonymous; all mutations require a bearer token and recipe updates
//! are restricted to the author.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::users::RecipeShortResponse;
use super::{authenticate, authenticate_optional, ServerResources};
use crate::errors::AppError;
use crate::models::{IngredientAmount, Recipe, ShoppingListItem, UserRecipeKind};

// ============================================================================
// Request / Response Types
// ============================================================================

/// Author block embedded in recipe responses
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeAuthorResponse {
    /// Author account id
    pub id: String,
    /// Author username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Avatar reference, if set
    pub avatar: Option<String>,
}

/// One quantified ingredient line of a recipe response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeIngredientResponse {
    /// Catalog ingredient id
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Quantity in the ingredient's unit
    pub amount: i64,
}

/// Full recipe response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    /// Recipe id
    pub id: String,
    /// Recipe author
    pub author: RecipeAuthorResponse,
    /// Recipe title
    pub name: String,
    /// Image reference
    pub image: String,
    /// Recipe body text
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Quantified ingredient list
    pub ingredients: Vec<RecipeIngredientResponse>,
    /// Whether the caller has favorited this recipe
    pub is_favorited: bool,
    /// Whether the recipe is in the caller's shopping cart
    pub is_in_shopping_cart: bool,
    /// Creation timestamp, RFC 3339
    pub created_at: String,
}

/// Response for listing recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct ListRecipesResponse {
    /// Recipes, newest first
    pub recipes: Vec<RecipeResponse>,
    /// Total count
    pub total: usize,
}

/// Request body for creating or updating a recipe
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    /// Recipe title
    pub name: String,
    /// Image reference from the file storage collaborator
    pub image: String,
    /// Recipe body text
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Quantified ingredient list
    pub ingredients: Vec<IngredientAmount>,
}

/// Query parameters for the recipe listing
#[derive(Debug, Deserialize, Default)]
pub struct RecipesQuery {
    /// Restrict to one author
    pub author: Option<String>,
}

// ============================================================================
// Routes
// ============================================================================

/// Recipe routes handler
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/recipes", get(Self::handle_list))
            .route("/api/recipes", post(Self::handle_create))
            .route(
                "/api/recipes/download_shopping_cart",
                get(Self::handle_download_shopping_cart),
            )
            .route("/api/recipes/:id", get(Self::handle_get))
            .route("/api/recipes/:id", patch(Self::handle_update))
            .route("/api/recipes/:id", delete(Self::handle_delete))
            .route("/api/recipes/:id/favorite", post(Self::handle_add_favorite))
            .route(
                "/api/recipes/:id/favorite",
                delete(Self::handle_remove_favorite),
            )
            .route(
                "/api/recipes/:id/shopping_cart",
                post(Self::handle_add_to_cart),
            )
            .route(
                "/api/recipes/:id/shopping_cart",
                delete(Self::handle_remove_from_cart),
            )
            .with_state(resources)
    }

    fn parse_recipe_id(id: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(id).map_err(|_| AppError::validation("Invalid recipe id format"))
    }

    /// Assemble the full recipe response with author, ingredient lines,
    /// and the caller's relation annotations
    async fn build_response(
        resources: &Arc<ServerResources>,
        recipe: Recipe,
        viewer: Option<Uuid>,
    ) -> Result<RecipeResponse, AppError> {
        let author = resources
            .database
            .get_user_by_id(recipe.author_id)
            .await?
            .ok_or_else(|| AppError::database("Recipe references a missing author"))?;

        let ingredients = resources
            .database
            .get_recipe_ingredients(recipe.id)
            .await?
            .into_iter()
            .map(|entry| RecipeIngredientResponse {
                id: entry.ingredient.id,
                name: entry.ingredient.name,
                measurement_unit: entry.ingredient.measurement_unit,
                amount: entry.amount,
            })
            .collect();

        let (is_favorited, is_in_shopping_cart) = match viewer {
            Some(user_id) => (
                resources
                    .database
                    .has_user_recipe(user_id, recipe.id, UserRecipeKind::Favorite)
                    .await?,
                resources
                    .database
                    .has_user_recipe(user_id, recipe.id, UserRecipeKind::Cart)
                    .await?,
            ),
            None => (false, false),
        };

        Ok(RecipeResponse {
            id: recipe.id.to_string(),
            author: RecipeAuthorResponse {
                id: author.id.to_string(),
                username: author.username,
                first_name: author.first_name,
                last_name: author.last_name,
                avatar: author.avatar,
            },
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
            created_at: recipe.created_at.to_rfc3339(),
        })
    }

    /// Handle GET /api/recipes - List recipes newest-first
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<RecipesQuery>,
    ) -> Result<Response, AppError> {
        let viewer = authenticate_optional(&headers, &resources)?.map(|auth| auth.user_id);

        let author_filter = query
            .author
            .as_deref()
            .map(|id| {
                Uuid::parse_str(id).map_err(|_| AppError::validation("Invalid author id format"))
            })
            .transpose()?;

        let recipes = resources.database.list_recipes(author_filter).await?;

        let mut out = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            out.push(Self::build_response(&resources, recipe, viewer).await?);
        }

        let response = ListRecipesResponse {
            total: out.len(),
            recipes: out,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/recipes - Create a recipe
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<RecipeRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        if body.name.is_empty() || body.image.is_empty() {
            return Err(AppError::validation(
                "Recipe name and image must not be empty",
            ));
        }

        let recipe = Recipe::new(
            auth.user_id,
            body.name,
            body.image,
            body.text,
            body.cooking_time,
        );
        resources
            .database
            .create_recipe(&recipe, &body.ingredients)
            .await?;
        tracing::info!(recipe_id = %recipe.id, author_id = %auth.user_id, "created recipe");

        let response = Self::build_response(&resources, recipe, Some(auth.user_id)).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/recipes/:id - Recipe detail
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let viewer = authenticate_optional(&headers, &resources)?.map(|auth| auth.user_id);
        let recipe_id = Self::parse_recipe_id(&id)?;

        let recipe = resources
            .database
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))?;

        let response = Self::build_response(&resources, recipe, viewer).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PATCH /api/recipes/:id - Update a recipe (author only)
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<RecipeRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let recipe_id = Self::parse_recipe_id(&id)?;

        let recipe = resources
            .database
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))?;
        if recipe.author_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the author may modify a recipe",
            ));
        }

        if body.name.is_empty() || body.image.is_empty() {
            return Err(AppError::validation(
                "Recipe name and image must not be empty",
            ));
        }

        resources
            .database
            .update_recipe(
                recipe_id,
                &body.name,
                &body.image,
                &body.text,
                body.cooking_time,
                &body.ingredients,
            )
            .await?;

        let updated = resources
            .database
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))?;
        let response = Self::build_response(&resources, updated, Some(auth.user_id)).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/recipes/:id - Delete a recipe (author only)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let recipe_id = Self::parse_recipe_id(&id)?;

        let recipe = resources
            .database
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))?;
        if recipe.author_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the author may delete a recipe",
            ));
        }

        resources.database.delete_recipe(recipe_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Shared handler body for the favorite/cart add endpoints
    async fn add_relation(
        resources: &Arc<ServerResources>,
        headers: &HeaderMap,
        id: &str,
        kind: UserRecipeKind,
    ) -> Result<Response, AppError> {
        let auth = authenticate(headers, resources)?;
        let recipe_id = Self::parse_recipe_id(id)?;

        resources
            .database
            .add_user_recipe(auth.user_id, recipe_id, kind)
            .await?;

        // Present for sure after the insert
        let recipe = resources
            .database
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))?;

        Ok((StatusCode::CREATED, Json(RecipeShortResponse::from(recipe))).into_response())
    }

    /// Shared handler body for the favorite/cart remove endpoints
    async fn remove_relation(
        resources: &Arc<ServerResources>,
        headers: &HeaderMap,
        id: &str,
        kind: UserRecipeKind,
    ) -> Result<Response, AppError> {
        let auth = authenticate(headers, resources)?;
        let recipe_id = Self::parse_recipe_id(id)?;

        resources
            .database
            .remove_user_recipe(auth.user_id, recipe_id, kind)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/recipes/:id/favorite
    async fn handle_add_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::add_relation(&resources, &headers, &id, UserRecipeKind::Favorite).await
    }

    /// Handle DELETE /api/recipes/:id/favorite
    async fn handle_remove_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::remove_relation(&resources, &headers, &id, UserRecipeKind::Favorite).await
    }

    /// Handle POST /api/recipes/:id/shopping_cart
    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::add_relation(&resources, &headers, &id, UserRecipeKind::Cart).await
    }

    /// Handle DELETE /api/recipes/:id/shopping_cart
    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::remove_relation(&resources, &headers, &id, UserRecipeKind::Cart).await
    }

    /// Handle GET /api/recipes/download_shopping_cart - Consolidated list
    ///
    /// Plain-text download: one line per (ingredient, unit) group with
    /// the summed amount, ordered by ingredient name.
    async fn handle_download_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let items = resources.database.shopping_list(auth.user_id).await?;
        let body = render_shopping_list(&items);

        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"shopping_list.txt\"",
                ),
            ],
            body,
        )
            .into_response())
    }
}

/// Render the aggregated shopping list as plain text
fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    let mut out = String::from("Shopping list\n\n");
    for item in items {
        out.push_str(&format!(
            "{} ({}): {}\n",
            item.name, item.measurement_unit, item.total_amount
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shopping_list() {
        let items = vec![
            ShoppingListItem {
                name: "Flour".into(),
                measurement_unit: "g".into(),
                total_amount: 500,
            },
            ShoppingListItem {
                name: "Sugar".into(),
                measurement_unit: "g".into(),
                total_amount: 150,
            },
        ];
        let text = render_shopping_list(&items);
        assert!(text.contains("Flour (g): 500"));
        assert!(text.contains("Sugar (g): 150"));
    }

    #[test]
    fn test_render_empty_cart() {
        let text = render_shopping_list(&[]);
        assert!(text.starts_with("Shopping list"));
        assert!(!text.contains(':'));
    }
}
