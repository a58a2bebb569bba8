//! # TaskForge API Server
//!
//! This is the main API server for TaskForge, a project management backend
//! with role-based access control and an AI project assistant.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - JWT authentication (register, login)
//! - Projects, tasks, and comments with a single role policy
//! - On-the-fly project metrics
//! - An assist endpoint backed by Groq chat completions
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskforge-api
//! ```

use std::sync::Arc;

use taskforge_api::{
    ai::GroqClient,
    app::{build_router, AppState},
    config::Config,
};
use taskforge_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskForge API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool and run migrations
    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    // Completion backend for the assist endpoint
    if config.ai.groq_api_key.is_none() {
        tracing::warn!("GROQ_API_KEY not set; assist requests will fail until configured");
    }
    let ai = GroqClient::new(config.ai.groq_api_key.clone(), config.ai.model.clone())?;

    // Build Axum application
    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config, Arc::new(ai));
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!("Failed to listen for SIGTERM: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
