// ABOUTME: Server binary for the Plateful recipe-sharing API
// ABOUTME: Loads configuration, initializes the database, and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Plateful

//! # Plateful API Server Binary
//!
//! Starts the recipe-sharing API with user authentication and SQLite
//! storage.

use anyhow::Result;
use clap::Parser;
use plateful::auth::AuthManager;
use plateful::config::ServerConfig;
use plateful::database::Database;
use plateful::logging;
use plateful::routes::{self, ServerResources};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "plateful-server")]
#[command(about = "Plateful - recipe sharing API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!("Starting Plateful API server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    info!("Database initialized: {}", config.database_url);

    let auth = AuthManager::new(config.jwt_secret.clone(), config.jwt_expiry_hours);
    let resources = Arc::new(ServerResources::new(database, auth, config.clone()));

    let app = routes::router(resources);
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {e}");
    }
}
