use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::relay::RelayService;
use crate::search::SearchStrategy;

pub mod handlers;
pub mod models;

/// Shared per-process state: the one configured strategy plus the relay.
pub struct AppState {
    pub strategy: Arc<dyn SearchStrategy>,
    pub relay: RelayService,
    pub relay_enabled: bool,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes
        .route("/search", get(handlers::search_handler))
        .route("/proxy", get(handlers::proxy_handler))
        .with_state(state)
        // Static file serving for the UI
        .nest_service("/", ServeDir::new("static"))
        .layer(cors)
}
