//! folio-server - Folio backend server
//!
//! JSON API over the repository aggregation core.

use folio_core::{Aggregator, GitHubClient, TtlCache};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("folio_server=info".parse()?)
                .add_directive("folio_core=info".parse()?),
        )
        .init();

    info!("folio-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = config::Config::load()?;
    match config.config_path {
        Some(ref path) => info!("Config loaded from {:?}", path),
        None => info!("No config file found, using defaults"),
    }
    if config.github.bearer_token().is_none() {
        info!("GITHUB_TOKEN not set, upstream requests are anonymous");
    }

    let client = GitHubClient::new(config.github.clone())?;
    let cache = Arc::new(TtlCache::new());
    let sweeper = cache.spawn_sweeper(config.sweep_interval());
    let aggregator = Aggregator::new(Arc::new(client), cache);

    let bind = config.server.bind.clone();
    let state = Arc::new(AppState::new(config, aggregator));
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
