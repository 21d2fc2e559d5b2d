// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use petra::{auth::BootstrapOutcome, create_router, AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("PETRA_CONFIG") {
        Ok(path) => AppConfig::load_with_path(path)?,
        Err(_) => AppConfig::load()?,
    };

    let default_level = config
        .monitoring
        .log_level
        .clone()
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Starting Petra backend...");
    tracing::debug!("Configuration loaded: {:?}", config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::from_config(config)?;

    match app_state.try_bootstrap_admin() {
        Some(BootstrapOutcome::Created(user)) => {
            tracing::info!(username = %user.username, "Bootstrapped admin user")
        }
        Some(BootstrapOutcome::UsersExist) => tracing::info!("User directory already populated"),
        Some(BootstrapOutcome::MissingPassword) => {
            tracing::warn!("Admin bootstrap skipped: no admin password configured")
        }
        None => {}
    }

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
