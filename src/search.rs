use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StrategyKind};
use crate::data_models::SearchResult;
use crate::error::GatewayError;
use crate::google_search::GoogleSearchStrategy;
use crate::scrape_search::ScrapeSearchStrategy;

/// The search-acquisition contract. One outbound call per invocation; the
/// full mapped sequence or a classified error, never a partial list.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GatewayError>;
}

/// Construct the single strategy this deployment is configured for.
pub fn build_strategy(config: &Config) -> Arc<dyn SearchStrategy> {
    match config.strategy {
        StrategyKind::Api => Arc::new(GoogleSearchStrategy::new(
            config.google_api_key.clone(),
            config.search_engine_id.clone(),
        )),
        StrategyKind::Scrape => Arc::new(ScrapeSearchStrategy::new()),
    }
}
