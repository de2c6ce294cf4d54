use std::sync::Arc;
use anyhow::Context;

use ratio_proxy::api::{create_router, ApiState};
use ratio_proxy::config::AppConfig;
use ratio_proxy::observability::metrics::register_metrics;
use ratio_proxy::observability::tracing::init_tracing;
use ratio_proxy::{DEFAULT_PROFILE, PROFILE_ENV_VAR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let profile = std::env::var(PROFILE_ENV_VAR).unwrap_or_else(|_| DEFAULT_PROFILE.to_string());
    let config = AppConfig::load(&profile).context("loading configuration")?;

    init_tracing(&config.log);
    register_metrics().context("registering metrics")?;

    let state = Arc::new(ApiState::from_config(&config).context("building service state")?);
    let app = create_router(state, &config.server.static_dir);

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;

    tracing::info!("Ratio proxy listening on http://{} (profile {})", address, profile);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping");
}
