pub mod api;
pub mod config;
pub mod data_models;
pub mod error;
pub mod google_search;
pub mod relay;
pub mod scrape_search;
pub mod search;
