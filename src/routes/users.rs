// ABOUTME: Route handlers for user profiles, avatars, and the subscription graph
// ABOUTME: Covers user listing, is_subscribed annotation, and follow/unfollow actions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! User routes
//!
//! Profile endpoints and the follow graph. Read endpoints serve
//! anonymous callers; `is_subscribed` is false for them.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::{authenticate, authenticate_optional, ServerResources};
use crate::database::subscriptions::SubscribedAuthor;
use crate::errors::AppError;
use crate::models::{Recipe, User};

// ============================================================================
// Response Types
// ============================================================================

/// Public view of a user account
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// Account id
    pub id: String,
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Avatar reference, if set
    pub avatar: Option<String>,
    /// Whether the calling user follows this account
    pub is_subscribed: bool,
}

impl UserResponse {
    fn from_user(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: user.avatar,
            is_subscribed,
        }
    }
}

/// Abbreviated recipe used inside subscription listings
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeShortResponse {
    /// Recipe id
    pub id: String,
    /// Recipe title
    pub name: String,
    /// Image reference
    pub image: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
}

impl From<Recipe> for RecipeShortResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id.to_string(),
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A followed author with their recipe count and newest recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribedAuthorResponse {
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
    /// The author's newest recipes, truncated to `recipes_limit`
    pub recipes: Vec<RecipeShortResponse>,
    /// Total number of recipes the author has published
    pub recipes_count: i64,
}

impl From<SubscribedAuthor> for SubscribedAuthorResponse {
    fn from(entry: SubscribedAuthor) -> Self {
        Self {
            id: entry.author.id.to_string(),
            username: entry.author.username,
            first_name: entry.author.first_name,
            last_name: entry.author.last_name,
            avatar: entry.author.avatar,
            recipes: entry.recipes.into_iter().map(Into::into).collect(),
            recipes_count: entry.recipes_count,
        }
    }
}

/// Response for listing users
#[derive(Debug, Serialize, Deserialize)]
pub struct ListUsersResponse {
    /// All accounts, ordered by username
    pub users: Vec<UserResponse>,
    /// Total count
    pub total: usize,
}

/// Response for listing subscriptions
#[derive(Debug, Serialize, Deserialize)]
pub struct ListSubscriptionsResponse {
    /// Followed authors
    pub subscriptions: Vec<SubscribedAuthorResponse>,
    /// Total count
    pub total: usize,
}

/// Request to set the caller's avatar
#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    /// Opaque reference returned by the file storage collaborator
    pub avatar: String,
}

/// Query parameters for the subscriptions listing
#[derive(Debug, Deserialize, Default)]
pub struct SubscriptionsQuery {
    /// Maximum recipes to include per author; absent means all
    pub recipes_limit: Option<i64>,
}

// ============================================================================
// Routes
// ============================================================================

/// User routes handler
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", get(Self::handle_list_users))
            .route("/api/users/me", get(Self::handle_current_user))
            .route("/api/users/me/avatar", put(Self::handle_set_avatar))
            .route("/api/users/me/avatar", delete(Self::handle_delete_avatar))
            .route(
                "/api/users/subscriptions",
                get(Self::handle_list_subscriptions),
            )
            .route("/api/users/:id", get(Self::handle_get_user))
            .route("/api/users/:id/subscribe", post(Self::handle_subscribe))
            .route("/api/users/:id/subscribe", delete(Self::handle_unsubscribe))
            .with_state(resources)
    }

    fn parse_user_id(id: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(id).map_err(|_| AppError::validation("Invalid user id format"))
    }

    /// Handle GET /api/users - List all accounts
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let viewer = authenticate_optional(&headers, &resources)?;
        let users = resources.database.list_users().await?;

        let mut out = Vec::with_capacity(users.len());
        for user in users {
            let is_subscribed = match viewer {
                Some(auth) if auth.user_id != user.id => {
                    resources
                        .database
                        .is_subscribed(auth.user_id, user.id)
                        .await?
                }
                _ => false,
            };
            out.push(UserResponse::from_user(user, is_subscribed));
        }

        let response = ListUsersResponse {
            total: out.len(),
            users: out,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/users/me - The calling user's profile
    async fn handle_current_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let user = resources
            .database
            .get_user_by_id(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok((StatusCode::OK, Json(UserResponse::from_user(user, false))).into_response())
    }

    /// Handle GET /api/users/:id - Profile with is_subscribed annotation
    async fn handle_get_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let viewer = authenticate_optional(&headers, &resources)?;
        let user_id = Self::parse_user_id(&id)?;

        let user = resources
            .database
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id}")))?;

        let is_subscribed = match viewer {
            Some(auth) if auth.user_id != user.id => {
                resources
                    .database
                    .is_subscribed(auth.user_id, user.id)
                    .await?
            }
            _ => false,
        };

        Ok((
            StatusCode::OK,
            Json(UserResponse::from_user(user, is_subscribed)),
        )
            .into_response())
    }

    /// Handle PUT /api/users/me/avatar - Store an avatar reference
    async fn handle_set_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<AvatarRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        if body.avatar.is_empty() {
            return Err(AppError::validation("Avatar reference must not be empty"));
        }

        resources
            .database
            .update_avatar(auth.user_id, Some(&body.avatar))
            .await?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "avatar": body.avatar })),
        )
            .into_response())
    }

    /// Handle DELETE /api/users/me/avatar - Clear the avatar reference
    async fn handle_delete_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        resources.database.update_avatar(auth.user_id, None).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/users/:id/subscribe - Follow an author
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let author_id = Self::parse_user_id(&id)?;

        resources.database.subscribe(auth.user_id, author_id).await?;
        tracing::info!(user_id = %auth.user_id, author_id = %author_id, "subscribed");

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({ "detail": "Subscribed" })),
        )
            .into_response())
    }

    /// Handle DELETE /api/users/:id/subscribe - Unfollow an author
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let author_id = Self::parse_user_id(&id)?;

        resources
            .database
            .unsubscribe(auth.user_id, author_id)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/users/subscriptions - Followed authors with recipes
    async fn handle_list_subscriptions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<SubscriptionsQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        if let Some(limit) = query.recipes_limit {
            if limit < 0 {
                return Err(AppError::validation("recipes_limit must not be negative"));
            }
        }

        let subscriptions = resources
            .database
            .list_subscriptions(auth.user_id, query.recipes_limit)
            .await?;

        let response = ListSubscriptionsResponse {
            total: subscriptions.len(),
            subscriptions: subscriptions.into_iter().map(Into::into).collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
