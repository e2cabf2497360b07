use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::data_models::SearchResult;
use crate::error::GatewayError;
use crate::search::SearchStrategy;

const SCRAPE_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const LOCALE: &str = "us-en";
const MAX_RESULTS: usize = 20;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Markers that distinguish a block/challenge page from a genuinely empty
/// result set. Best-effort, not exhaustive.
const BLOCK_MARKERS: &[&str] = &["anomaly-modal", "challenge-form", "unusual traffic"];

// The selector set is coupled to the upstream page's current markup and is
// expected to silently degrade when that markup changes. All of it lives
// here so a structure change touches only this module.
static RESULT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(".result").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h2.result__title").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result__a").unwrap());
static SNIPPET_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["a.result__snippet", ".result__snippet"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// Search strategy that scrapes a search-engine results page. Best-effort:
/// subject to blocking and silent markup drift.
pub struct ScrapeSearchStrategy {
    client: Client,
    endpoint: String,
    timeout: Duration,
    /// Health signal: consecutive requests that extracted zero results.
    consecutive_empty: AtomicUsize,
}

impl ScrapeSearchStrategy {
    pub fn new() -> ScrapeSearchStrategy {
        Self::with_endpoint(SCRAPE_ENDPOINT, REQUEST_TIMEOUT)
    }

    /// Custom endpoint and timeout, for tests against an upstream double.
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> ScrapeSearchStrategy {
        ScrapeSearchStrategy {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
            consecutive_empty: AtomicUsize::new(0),
        }
    }

    fn classify_status(status: reqwest::StatusCode, body: &str) -> GatewayError {
        match status.as_u16() {
            429 | 503 => GatewayError::Blocked(format!("upstream answered {status}")),
            code => GatewayError::Upstream {
                status: Some(code),
                message: format!("search page returned {status}: {body}"),
            },
        }
    }
}

impl Default for ScrapeSearchStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchStrategy for ScrapeSearchStrategy {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GatewayError> {
        let url = format!(
            "{}?q={}&kl={}",
            self.endpoint,
            urlencoding::encode(query),
            LOCALE
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .header("User-Agent", USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(GatewayError::from_transport)?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }

        let results = parse_results(&body);

        if results.is_empty() {
            if let Some(marker) = BLOCK_MARKERS.iter().find(|m| body.contains(*m)) {
                return Err(GatewayError::Blocked(format!(
                    "challenge marker '{marker}' found in response"
                )));
            }
            // Ambiguous: a true empty result set and silent markup drift look
            // the same. Valid response either way; warn for operability.
            let streak = self.consecutive_empty.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(
                query,
                consecutive_empty = streak,
                "scrape extracted zero results"
            );
        } else {
            self.consecutive_empty.store(0, Ordering::Relaxed);
        }

        Ok(results)
    }
}

fn parse_results(html: &str) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for container in document.select(&RESULT_SELECTOR) {
        if results.len() >= MAX_RESULTS {
            break;
        }

        let title = container
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let link = container
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(unwrap_redirect)
            .unwrap_or_default();

        // title and link are jointly required; snippet degrades to the
        // placeholder inside SearchResult::new.
        if title.is_empty() || link.is_empty() {
            continue;
        }

        let snippet = SNIPPET_SELECTORS
            .iter()
            .filter_map(|selector| container.select(selector).next())
            .map(|s| s.text().collect::<String>().trim().to_string())
            .find(|s| !s.is_empty())
            .unwrap_or_default();

        results.push(SearchResult::new(title, link, snippet, None));
    }

    results
}

/// Unwrap a redirect-wrapper link (`//duckduckgo.com/l/?uddg=<encoded>`) to
/// its embedded target. Anything else passes through, with a scheme added
/// to protocol-relative links.
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let Ok(url) = Url::parse(&absolute) else {
        return absolute;
    };

    if url.path().starts_with("/l/") {
        if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
            return target.into_owned();
        }
    }
    absolute
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_redirect_extracts_uddg_target() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage%3Fa%3D1&rut=abc123";
        assert_eq!(unwrap_redirect(href), "https://example.com/page?a=1");
    }

    #[test]
    fn test_unwrap_redirect_passes_plain_links_through() {
        assert_eq!(
            unwrap_redirect("https://example.com/page"),
            "https://example.com/page"
        );
        // Protocol-relative non-wrapper link gets a scheme.
        assert_eq!(
            unwrap_redirect("//example.com/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_unwrap_redirect_keeps_wrapper_without_uddg() {
        let href = "https://duckduckgo.com/l/?other=1";
        assert_eq!(unwrap_redirect(href), href);
    }

    #[test]
    fn test_parse_skips_entries_without_title_or_link() {
        let html = r#"
            <div class="result">
              <h2 class="result__title"><a class="result__a" href="https://a.example/">Alpha</a></h2>
              <a class="result__snippet">First snippet</a>
            </div>
            <div class="result">
              <h2 class="result__title">No anchor here</h2>
            </div>
            <div class="result">
              <a class="result__a" href="https://c.example/">anchor but no heading</a>
            </div>
        "#;
        let results = parse_results(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Alpha");
        assert_eq!(results[0].link, "https://a.example/");
        assert_eq!(results[0].snippet, "First snippet");
    }

    #[test]
    fn test_parse_substitutes_snippet_placeholder() {
        let html = r#"
            <div class="result">
              <h2 class="result__title"><a class="result__a" href="https://a.example/">Alpha</a></h2>
            </div>
        "#;
        let results = parse_results(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].snippet, crate::data_models::SNIPPET_PLACEHOLDER);
    }
}
