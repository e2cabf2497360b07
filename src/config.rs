use anyhow::{Result, bail};
use dotenvy::dotenv;
use std::env;

/// Which search strategy a deployment runs. Strategies are mutually
/// exclusive per deployment; there is no per-request fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Api,
    Scrape,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub strategy: StrategyKind,
    pub google_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub relay_enabled: bool,
}

impl Config {
    /// Load configuration from the environment (and .env if present) and
    /// validate it, so a misconfigured deployment fails at startup instead
    /// of on first request.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();

        let strategy = match get_env_or_default("SEARCH_STRATEGY", "api").as_str() {
            "api" => StrategyKind::Api,
            "scrape" => StrategyKind::Scrape,
            other => bail!("invalid SEARCH_STRATEGY '{other}', expected 'api' or 'scrape'"),
        };

        let config = Config {
            port: get_env_or_default("PORT", "3000").parse()?,
            strategy,
            google_api_key: get_env_opt("GOOGLE_API_KEY"),
            search_engine_id: get_env_opt("CUSTOM_SEARCH_ENGINE_ID"),
            relay_enabled: get_env_or_default("RELAY_ENABLED", "true").parse()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.strategy == StrategyKind::Api
            && (self.google_api_key.is_none() || self.search_engine_id.is_none())
        {
            bail!(
                "SEARCH_STRATEGY=api requires GOOGLE_API_KEY and CUSTOM_SEARCH_ENGINE_ID to be set"
            );
        }
        Ok(())
    }
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_strategy_requires_credentials() {
        let config = Config {
            port: 3000,
            strategy: StrategyKind::Api,
            google_api_key: Some("key".to_string()),
            search_engine_id: None,
            relay_enabled: true,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scrape_strategy_needs_no_credentials() {
        let config = Config {
            port: 3000,
            strategy: StrategyKind::Scrape,
            google_api_key: None,
            search_engine_id: None,
            relay_enabled: false,
        };
        assert!(config.validate().is_ok());
    }
}
