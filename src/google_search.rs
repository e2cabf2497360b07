use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::data_models::SearchResult;
use crate::error::GatewayError;
use crate::search::SearchStrategy;

const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Search strategy backed by the Google Custom Search JSON API.
pub struct GoogleSearchStrategy {
    client: Client,
    api_key: Option<String>,
    search_engine_id: Option<String>,
    endpoint: String,
}

impl GoogleSearchStrategy {
    pub fn new(api_key: Option<String>, search_engine_id: Option<String>) -> GoogleSearchStrategy {
        Self::with_endpoint(api_key, search_engine_id, GOOGLE_SEARCH_ENDPOINT)
    }

    /// Point the strategy at a different endpoint. Used by tests to stand in
    /// a local upstream double.
    pub fn with_endpoint(
        api_key: Option<String>,
        search_engine_id: Option<String>,
        endpoint: impl Into<String>,
    ) -> GoogleSearchStrategy {
        GoogleSearchStrategy {
            client: Client::new(),
            api_key,
            search_engine_id,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SearchStrategy for GoogleSearchStrategy {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GatewayError> {
        // Guard before any network call so a misconfigured deployment never
        // leaks a request upstream.
        let (Some(api_key), Some(search_engine_id)) = (&self.api_key, &self.search_engine_id)
        else {
            return Err(GatewayError::Configuration(
                "GOOGLE_API_KEY or CUSTOM_SEARCH_ENGINE_ID not set".to_string(),
            ));
        };

        let response = self
            .client
            .get(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("key", api_key.as_str()),
                ("cx", search_engine_id.as_str()),
                ("q", query),
            ])
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                status: Some(status.as_u16()),
                message: format!("search API returned {status}: {body}"),
            });
        }

        let payload: CseResponse = response.json().await.map_err(GatewayError::from_transport)?;

        let results = payload
            .items
            .into_iter()
            .map(|item| {
                let image_url = resolve_image(item.pagemap.as_ref());
                SearchResult::new(item.title, item.link, item.snippet, image_url)
            })
            .collect();
        Ok(results)
    }
}

/// First a structured image entry, then the page's og:image metadata,
/// else no image.
fn resolve_image(pagemap: Option<&PageMap>) -> Option<String> {
    let pagemap = pagemap?;
    if let Some(src) = pagemap
        .cse_image
        .first()
        .and_then(|image| image.src.clone())
    {
        return Some(src);
    }
    pagemap
        .metatags
        .first()
        .and_then(|tags| tags.get("og:image").cloned())
}

#[derive(Deserialize, Debug, Default)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Deserialize, Debug)]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    pagemap: Option<PageMap>,
}

#[derive(Deserialize, Debug)]
struct PageMap {
    #[serde(default)]
    cse_image: Vec<CseImage>,
    #[serde(default)]
    metatags: Vec<HashMap<String, String>>,
}

#[derive(Deserialize, Debug)]
struct CseImage {
    src: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_prefers_cse_image() {
        let pagemap: PageMap = serde_json::from_value(serde_json::json!({
            "cse_image": [{"src": "https://example.com/a.png"}],
            "metatags": [{"og:image": "https://example.com/og.png"}]
        }))
        .unwrap();
        assert_eq!(
            resolve_image(Some(&pagemap)),
            Some("https://example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_image_falls_back_to_og_image() {
        let pagemap: PageMap = serde_json::from_value(serde_json::json!({
            "metatags": [{"og:image": "https://example.com/og.png"}]
        }))
        .unwrap();
        assert_eq!(
            resolve_image(Some(&pagemap)),
            Some("https://example.com/og.png".to_string())
        );
    }

    #[test]
    fn test_image_absent_when_no_metadata() {
        let pagemap: PageMap = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(resolve_image(Some(&pagemap)), None);
        assert_eq!(resolve_image(None), None);
    }
}
