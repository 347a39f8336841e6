// ABOUTME: Route handlers for account registration, login, and password change
// ABOUTME: Thin handlers that validate input and delegate to auth and database layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! Authentication routes
//!
//! Registration, login, and password change. Login is by email; the
//! response carries a bearer token used by every mutating endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{authenticate, ServerResources};
use crate::errors::AppError;
use crate::models::{validate_email, validate_password, validate_username, User};

/// User registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email address, globally unique
    pub email: String,
    /// Username, globally unique
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Plaintext password, hashed before storage
    pub password: String,
}

/// User registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// New account id
    pub user_id: String,
    /// Confirmation message
    pub message: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// User info for login response
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// Account id
    pub user_id: String,
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
}

/// User login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub jwt_token: String,
    /// Token expiry, RFC 3339
    pub expires_at: String,
    /// The authenticated account
    pub user: UserInfo,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    /// Current password, verified before the change
    pub current_password: String,
    /// Replacement password
    pub new_password: String,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/set_password", post(Self::handle_set_password))
            .with_state(resources)
    }

    /// Handle POST /api/auth/register - Create a new account
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        validate_email(&body.email)?;
        validate_username(&body.username)?;
        validate_password(&body.password)?;
        if body.first_name.is_empty() || body.last_name.is_empty() {
            return Err(AppError::validation(
                "First name and last name must not be empty",
            ));
        }

        let password_hash = resources.auth.hash_password(&body.password)?;
        let user = User::new(
            body.email,
            body.username,
            body.first_name,
            body.last_name,
            password_hash,
        );

        let user_id = resources.database.create_user(&user).await?;
        tracing::info!(user_id = %user_id, "registered new user");

        let response = RegisterResponse {
            user_id: user_id.to_string(),
            message: "Account created".to_owned(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/auth/login - Obtain a session token
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .get_user_by_email(&body.email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        if !resources
            .auth
            .verify_password(&body.password, &user.password_hash)?
        {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let jwt_token = resources.auth.generate_token(&user)?;
        let expires_at = Utc::now() + Duration::hours(resources.config.jwt_expiry_hours);

        let response = LoginResponse {
            jwt_token,
            expires_at: expires_at.to_rfc3339(),
            user: UserInfo {
                user_id: user.id.to_string(),
                email: user.email,
                username: user.username,
            },
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/auth/set_password - Change the caller's password
    async fn handle_set_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SetPasswordRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;

        let user = resources
            .database
            .get_user_by_id(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if !resources
            .auth
            .verify_password(&body.current_password, &user.password_hash)?
        {
            return Err(AppError::auth_invalid("Current password is incorrect"));
        }
        validate_password(&body.new_password)?;

        let new_hash = resources.auth.hash_password(&body.new_password)?;
        resources
            .database
            .update_password_hash(auth.user_id, &new_hash)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
