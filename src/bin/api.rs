use anyhow::{Context, Result};
use newslens::{
    analysis::Analyzer, app_state::AppState, config::Config,
    middleware::rate_limit::RateLimit, routes, telemetry,
};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    telemetry::init_tracing(config.log_format());

    let analyzer = Analyzer::from_config(&config)?;
    let state = AppState::new(analyzer);
    let rate_limit = RateLimit::new(
        config.rate_limit_max_requests(),
        config.rate_limit_window_secs(),
    );
    let app = routes::router(state, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr()))?;
    info!(addr = config.bind_addr(), "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
