use std::sync::Arc;

use periscope::api::{self, AppState};
use periscope::config::Config;
use periscope::relay::RelayService;
use periscope::search::build_strategy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    // Fails fast on a misconfigured deployment (e.g. api strategy without
    // credentials) instead of erroring on first request.
    let config = Config::from_env()?;
    tracing::info!(strategy = ?config.strategy, "starting with configured search strategy");

    let state = Arc::new(AppState {
        strategy: build_strategy(&config),
        relay: RelayService::new(),
        relay_enabled: config.relay_enabled,
    });

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
