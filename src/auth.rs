// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Handles login token generation, validation, and bcrypt password checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! # Authentication and Session Management
//!
//! Password hashing uses bcrypt; sessions are HS256 JWT bearer tokens
//! carrying the user id. Password-hashing internals and the identity
//! provider contract are the boundary described in the external
//! interfaces: the core only calls `hash_password`/`verify_password`
//! and `generate_token`/`validate_token`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::User;

const BCRYPT_COST: u32 = 12;

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authentication result carrying the caller's identity
#[derive(Debug, Clone, Copy)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
}

/// Authentication manager for `JWT` tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    secret: String,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: String, token_expiry_hours: i64) -> Self {
        Self {
            secret,
            token_expiry_hours,
        }
    }

    /// Hash a plaintext password with bcrypt
    ///
    /// # Errors
    ///
    /// Returns an error if bcrypt hashing fails
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Verify a plaintext password against a stored hash
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        bcrypt::verify(password, hash)
            .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
    }

    /// Generate a `JWT` session token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))
    }

    /// Validate a `JWT` session token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` if the signature is wrong, the token has
    /// expired, or the token is malformed
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::auth_invalid(format!("Invalid session token: {e}")))
    }

    /// Validate a bearer token and resolve the calling user's identity
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for malformed headers, bad tokens, or a
    /// non-UUID subject claim
    pub fn authenticate(&self, authorization: &str) -> AppResult<AuthResult> {
        let token = authorization
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))?;

        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a valid user id"))?;

        Ok(AuthResult { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "julia@example.com".into(),
            "julia".into(),
            "Julia".into(),
            "Child".into(),
            "hash".into(),
        )
    }

    #[test]
    fn test_token_round_trip() {
        let manager = AuthManager::new("test-secret".into(), 24);
        let user = test_user();

        let token = manager.generate_token(&user).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = AuthManager::new("test-secret".into(), 24);
        let other = AuthManager::new("other-secret".into(), 24);
        let token = manager.generate_token(&test_user()).unwrap();

        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_authenticate_requires_bearer_scheme() {
        let manager = AuthManager::new("test-secret".into(), 24);
        let token = manager.generate_token(&test_user()).unwrap();

        assert!(manager.authenticate(&format!("Bearer {token}")).is_ok());
        assert!(manager.authenticate(&token).is_err());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let manager = AuthManager::new("test-secret".into(), 24);
        let hash = manager.hash_password("correct horse battery").unwrap();

        assert!(manager.verify_password("correct horse battery", &hash).unwrap());
        assert!(!manager.verify_password("wrong password", &hash).unwrap());
    }
}
