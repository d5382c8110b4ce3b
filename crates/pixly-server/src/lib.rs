//! pixly-server: the web layer of the pixly image catalog.
//!
//! Server-rendered HTML pages over the catalog database, an object store
//! for image bytes and the edit pipeline (tone, border, size). Client
//! errors are reported to the browser through flash messages rather than
//! error pages.

pub mod context;
pub mod editor;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod pages;
pub mod router;
pub mod routes;
pub mod storage;

use std::net::SocketAddr;

use pixly_core::config::Config;
use tokio::signal;

use crate::context::AppContext;

pub use router::build_router;

/// Open the database and object store described by `config`.
pub fn build_context(config: Config) -> pixly_core::Result<AppContext> {
    let db = pixly_db::pool::init_from_url(&config.database.url)?;
    tracing::info!("Database ready at {}", config.database.url);

    let store = storage::build_store(&config.storage);
    tracing::info!(
        "Object store: {:?} (served under {})",
        config.storage.backend,
        config.storage.public_base_url
    );

    Ok(AppContext::new(db, config, store))
}

/// Start the pixly server and run until a shutdown signal arrives.
pub async fn start(config: Config) -> pixly_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| pixly_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = build_context(config)?;
    let app = build_router(ctx);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| pixly_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
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
