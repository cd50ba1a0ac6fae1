//! Auth Service
//!
//! Password hashing and JWT issuance behind a small HTTP API.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling and routing
//! - Services: Registration, login and token workflows
//! - Auth: Password hasher and token authority
//! - Repositories: User storage behind a trait

use anyhow::Result;
use auth_service_backend::{
    config, metrics, routes, services::UserService, state::AppState,
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        bcrypt_cost = config.security.bcrypt_cost,
        "Starting {}",
        config.service.name
    );

    if config::AppConfig::is_production() {
        if let Err(e) = config.validate_production() {
            error!("Configuration error: {}", e);
            return Err(e);
        }
    }

    let mut state = AppState::new(config.clone())?;

    match metrics::install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Failed to install metrics recorder: {}. /metrics will be disabled.", e),
    }

    if let Some(bootstrap) = &config.bootstrap {
        UserService::ensure_bootstrap_user(state.users(), state.passwords(), bootstrap)
            .await
            .map_err(|e| anyhow::anyhow!("Bootstrap user setup failed: {}", e))?;
    }

    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "auth_service_backend=info,tower_http=info".into()
        } else {
            "auth_service_backend=debug,tower_http=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
