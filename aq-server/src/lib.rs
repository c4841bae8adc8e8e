//! HTTP service for air quality readings.
//!
//! The interesting part is [`service::AirQualityService`], which tries the
//! live pollutant source for each request and falls back to the bundled
//! sample dataset when it fails or has nothing usable. The rest is routing,
//! bearer identity and profile plumbing around it.

pub mod auth;
pub mod config;
pub mod http;
pub mod recommendations;
pub mod service;
pub mod state;

pub use auth::{IdentityService, PrefixTokenIdentity};
pub use config::ServerConfig;
pub use http::build_router;
pub use service::{AirQualityService, DataSource};
pub use state::AppState;

use anyhow::Context;
use tokio::net::TcpListener;

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                log::warn!("cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Bind `state.config.bind` and serve until SIGINT or SIGTERM.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind = state.config.bind.clone();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind failed: {}", bind))?;
    log::info!(
        "aq-server listening on {} (source={})",
        listener.local_addr()?,
        state.service.source_id()
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;
    log::info!("aq-server stopped");
    Ok(())
}
