// ABOUTME: Environment-driven server configuration
// ABOUTME: Loads ports, database URL, and JWT settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! # Server Configuration
//!
//! Environment-only configuration: every knob is an environment variable
//! with a development-friendly default. `ServerConfig::from_env()` is
//! called once at startup and the resulting value is shared through
//! `ServerResources`.

use anyhow::{Context, Result};
use rand::RngCore;
use std::env;

/// Runtime configuration for the Plateful server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// sqlx connection URL, e.g. `sqlite:plateful.db`
    pub database_url: String,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Session token lifetime in hours
    pub jwt_expiry_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// `JWT_SECRET` falls back to a random per-process secret so a
    /// development server starts without any setup; sessions then do not
    /// survive a restart.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable fails to parse
    pub fn from_env() -> Result<Self> {
        let http_port = env_or("HTTP_PORT", "8081")
            .parse::<u16>()
            .context("HTTP_PORT must be a valid port number")?;

        let database_url = env_or("DATABASE_URL", "sqlite:data/plateful.db");

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, generating ephemeral secret");
                generate_secret()
            }
        };

        let jwt_expiry_hours = env_or("JWT_EXPIRY_HOURS", "24")
            .parse::<i64>()
            .context("JWT_EXPIRY_HOURS must be a number of hours")?;

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            jwt_expiry_hours,
        })
    }

    /// Human-readable configuration summary for startup logging
    ///
    /// Secrets are never included.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Plateful Server Configuration:\n\
             - HTTP Port: {}\n\
             - Database: {}\n\
             - Session Lifetime: {}h",
            self.http_port, self.database_url, self.jwt_expiry_hours
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_excludes_secret() {
        let config = ServerConfig {
            http_port: 8081,
            database_url: "sqlite::memory:".into(),
            jwt_secret: "super-secret-value".into(),
            jwt_expiry_hours: 24,
        };
        let summary = config.summary();
        assert!(summary.contains("8081"));
        assert!(!summary.contains("super-secret-value"));
    }

    #[test]
    fn test_generated_secret_length() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
    }
}
