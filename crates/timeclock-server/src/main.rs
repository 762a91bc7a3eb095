//! Time clock HTTP server.
//!
//! Run with: cargo run -p timeclock-server
//!
//! Configuration is read from the environment (and an optional `.env` file).

mod config;

use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use timeclock_assistant::{Assistant, OpenAiChat};
use timeclock_core::{DEFAULT_USER_ID, SystemClock, traits::ChatProvider};
use timeclock_session::{TimeClock, storage::MemoryStorage};
use timeclock_transport::http::{ApiState, create_api_router};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let report = config.validate();
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    if report.has_warnings() {
        tracing::info!("Configuration status: {} warnings", report.warnings.len());
    }

    let app = build_app(&config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    tracing::info!(environment = %config.environment, "Environment");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wire storage, clock and assistant into the router.
fn build_app(config: &Config) -> Router {
    tracing::info!("Using in-memory storage");
    let time_clock = TimeClock::new(MemoryStorage::new(), Arc::new(SystemClock), DEFAULT_USER_ID);

    let provider = config.openai_api_key.as_ref().map(|key| {
        Arc::new(
            OpenAiChat::new(key.clone())
                .with_base_url(config.openai_base_url.clone())
                .with_model(config.openai_model.clone()),
        ) as Arc<dyn ChatProvider>
    });

    let mut app = create_api_router(ApiState::new(time_clock, Assistant::new(provider)));

    if let Some(dir) = config.served_static_dir() {
        tracing::info!("Serving static files from {}", dir.display());
        app = app.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        );
    }

    app.layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
