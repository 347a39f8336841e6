// ABOUTME: HTTP route assembly and shared request authentication
// ABOUTME: Builds the axum router and holds shared server resources

//! # HTTP Routes
//!
//! Per-domain route modules following one pattern: a `*Routes` struct
//! with a `routes(resources)` constructor returning an axum `Router`,
//! thin handlers that authenticate the caller, delegate to the database
//! layer, and serialize the result.

pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod users;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthManager, AuthResult};
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::AppError;

/// Shared state for all request handlers
pub struct ServerResources {
    /// Persistence layer
    pub database: Database,
    /// Session token and password management
    pub auth: AuthManager,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Bundle the shared server state
    #[must_use]
    pub fn new(database: Database, auth: AuthManager, config: ServerConfig) -> Self {
        Self {
            database,
            auth,
            config,
        }
    }
}

/// Build the complete API router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .route("/api/health", get(handle_health))
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(users::UserRoutes::routes(resources.clone()))
        .merge(ingredients::IngredientRoutes::routes(resources.clone()))
        .merge(recipes::RecipeRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Handle GET /api/health - liveness probe
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
        .into_response()
}

/// Extract and authenticate the caller from the authorization header
///
/// # Errors
///
/// Returns `AuthRequired` when the header is absent and `AuthInvalid`
/// when the bearer token does not validate
pub(crate) fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> Result<AuthResult, AppError> {
    let auth_value = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    resources.auth.authenticate(auth_value)
}

/// Authenticate the caller if an authorization header is present
///
/// Read-only endpoints serve anonymous callers; annotations such as
/// `is_subscribed` and `is_favorited` are false for them.
///
/// # Errors
///
/// Returns `AuthInvalid` when a header is present but does not validate
pub(crate) fn authenticate_optional(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> Result<Option<AuthResult>, AppError> {
    match headers.get("authorization").and_then(|h| h.to_str().ok()) {
        Some(auth_value) => resources.auth.authenticate(auth_value).map(Some),
        None => Ok(None),
    }
}
