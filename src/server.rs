//! History Service startup.
//!
//! Provides [`serve`], which wires the in-memory history storage and the
//! simulated detector into the axum router and runs it until Ctrl-C.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::GuardConfig;
use crate::history::routes::{self, AppState};
use crate::history::MemHistoryStorage;
use crate::scan::RandomDetector;

/// Shared setup for the HTTP service.
pub fn build_state(config: &GuardConfig) -> AppState {
    AppState {
        storage: Arc::new(MemHistoryStorage::new()),
        detector: Arc::new(RandomDetector::new(config.detection_probability())),
    }
}

/// Start the History Service over HTTP.
pub async fn serve(config: GuardConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting history service");

    let router = routes::router(build_state(&config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "history service listening at http://{bind_addr}/scan-history");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down history service");
        })
        .await?;

    Ok(())
}
