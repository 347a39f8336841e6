// ABOUTME: Route handlers for the ingredient catalog
// ABOUTME: Listing with name-prefix search and race-safe find-or-create
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! Ingredient catalog routes
//!
//! The catalog is reference data: reads are anonymous, creation requires
//! authentication and is idempotent per (name, unit) pair.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{authenticate, ServerResources};
use crate::errors::AppError;
use crate::models::Ingredient;

/// Catalog entry response
#[derive(Debug, Serialize, Deserialize)]
pub struct IngredientResponse {
    /// Catalog id
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Request to find or create a catalog entry
#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
}

/// Query parameters for the catalog listing
#[derive(Debug, Deserialize, Default)]
pub struct IngredientsQuery {
    /// Name prefix filter
    pub name: Option<String>,
}

/// Ingredient routes handler
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create all ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/ingredients", get(Self::handle_list))
            .route("/api/ingredients", post(Self::handle_create))
            .route("/api/ingredients/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/ingredients - List the catalog
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<IngredientsQuery>,
    ) -> Result<Response, AppError> {
        let ingredients = resources
            .database
            .list_ingredients(query.name.as_deref())
            .await?;

        let response: Vec<IngredientResponse> =
            ingredients.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/ingredients/:id - Single catalog entry
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let ingredient = resources
            .database
            .get_ingredient(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;

        Ok((StatusCode::OK, Json(IngredientResponse::from(ingredient))).into_response())
    }

    /// Handle POST /api/ingredients - Find or create a (name, unit) pair
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateIngredientRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;

        let ingredient = resources
            .database
            .find_or_create_ingredient(&body.name, &body.measurement_unit)
            .await?;

        Ok((StatusCode::CREATED, Json(IngredientResponse::from(ingredient))).into_response())
    }
}
