//! Burrow server — maze exploration over HTTP with a plugin engine.
//!
//! Entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use burrow_api::{AppState, build_router};
use burrow_core::config::AppConfig;
use burrow_core::error::AppError;
use burrow_plugin::{PluginCatalog, resolve};
use burrow_session::spawn_sweeper;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("BURROW_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Burrow v{}", env!("CARGO_PKG_VERSION"));

    // Discover plugins and resolve the active set.
    let catalog = PluginCatalog::discover(
        &config.plugins,
        &[
            plugin_static::builtin(),
            plugin_trail::builtin(),
            plugin_minimap::builtin(),
        ],
    );
    let registry = resolve(catalog.descriptors());
    tracing::info!(
        discovered = catalog.descriptors().len(),
        active = registry.len(),
        plugins = ?registry.names(),
        "plugin resolution complete"
    );

    // Routes are bound for every discovered plugin, active or not.
    let plugin_routes = catalog.routes().cloned().collect();

    let sweep_interval = Duration::from_secs(config.session.sweep_interval_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(config, registry);
    let sessions = Arc::clone(&state.sessions);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_handle = spawn_sweeper(sessions, sweep_interval, shutdown_rx);

    let app = build_router(state, plugin_routes);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Burrow server listening on {addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    let _ = tokio::time::timeout(Duration::from_secs(10), sweeper_handle).await;

    tracing::info!("Burrow server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
