//! mg-server: HTTP API for mediagrab.
//!
//! This crate ties the core types and the extraction toolchain into a running
//! server. It provides:
//!
//! - Axum router with the download page, health check, and download API
//! - A bounded pool limiting concurrent extractions
//! - JSON error responses derived from [`mg_core::Error`]
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod pool;
pub mod router;
pub mod routes;

use std::net::SocketAddr;

use mg_core::config::Config;
use tokio::signal;

use crate::context::AppContext;

/// Start the mediagrab server and run until a shutdown signal arrives.
pub async fn start(config: Config) -> mg_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| mg_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config);

    for info in ctx.tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}; downloads will fail until it is installed", info.name);
        }
    }

    tracing::info!(
        "Extraction pool: {} slot(s), timeout {:?}",
        ctx.pool.capacity(),
        ctx.extraction_timeout()
    );

    let app = router::build_router(ctx);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| mg_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

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
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
